use crate::{
    codec::{KeyCodec, ValueCodec},
    config::Limits,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    range::{Iter, RangeValues, Ranger, raw_bounds},
    schema::{CollectionInfo, Prefix, SchemaBuilder},
    store::{Direction, KvStore, prefix_end},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{
    io::{Read, Write},
    marker::PhantomData,
};
use tracing::trace;

///
/// GenesisEntry
///
/// One `{"key", "value"}` record of a genesis export.
///

#[derive(Debug, Deserialize, Serialize)]
struct GenesisEntry {
    key: JsonValue,
    value: JsonValue,
}

///
/// Map
///
/// Typed key/value collection stored under `prefix ++ encode(key)`.
///

#[derive(Clone, Debug)]
pub struct Map<K, VC> {
    name: String,
    prefix: Prefix,
    value_codec: VC,
    limits: Limits,
    _key: PhantomData<fn() -> K>,
}

///
/// EncodedEntry
///
/// Full store key and encoded value that already passed the map's limits.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedEntry {
    raw_key: Vec<u8>,
    raw_value: Vec<u8>,
}

impl<K, VC> Map<K, VC>
where
    K: KeyCodec,
    VC: ValueCodec,
{
    /// Create and register a map.
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        value_codec: VC,
    ) -> Self {
        let map = Self {
            name: name.into(),
            prefix: prefix.into(),
            value_codec,
            limits: builder.limits(),
            _key: PhantomData,
        };

        builder.register(CollectionInfo {
            name: map.name.clone(),
            prefix: map.prefix.clone(),
            key_type: K::key_type(),
            value_type: map.value_codec.value_type(),
        });

        map
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    #[must_use]
    pub const fn value_codec(&self) -> &VC {
        &self.value_codec
    }

    pub fn set<S: KvStore>(
        &self,
        store: &mut S,
        key: &K,
        value: &VC::Value,
    ) -> Result<(), InternalError> {
        let entry = self.encode_checked(key, value)?;

        self.write_encoded(store, &entry)
    }

    /// Encode an entry and apply both size limits without touching the
    /// store. Callers with their own writes to order run this first.
    pub fn encode_checked(
        &self,
        key: &K,
        value: &VC::Value,
    ) -> Result<EncodedEntry, InternalError> {
        let raw_key = self.raw_key(key)?;
        let raw_value = self.value_codec.encode(value)?;
        if raw_value.len() > self.limits.max_value_bytes {
            return Err(InternalError::collection_unsupported(format!(
                "collection '{}': value of {} bytes exceeds limit {}",
                self.name,
                raw_value.len(),
                self.limits.max_value_bytes
            )));
        }

        Ok(EncodedEntry { raw_key, raw_value })
    }

    /// Write an entry produced by this map's `encode_checked`.
    pub fn write_encoded<S: KvStore>(
        &self,
        store: &mut S,
        entry: &EncodedEntry,
    ) -> Result<(), InternalError> {
        store.set(&entry.raw_key, &entry.raw_value)?;
        sink::record(MetricsEvent::Write {
            collection: &self.name,
        });

        Ok(())
    }

    /// Fetch the value for `key`; a missing key is a `NotFound` error.
    pub fn get<S: KvStore>(&self, store: &S, key: &K) -> Result<VC::Value, InternalError> {
        self.try_get(store, key)?
            .ok_or_else(|| InternalError::not_found(&self.name, key.stringify()))
    }

    pub fn try_get<S: KvStore>(
        &self,
        store: &S,
        key: &K,
    ) -> Result<Option<VC::Value>, InternalError> {
        let raw_key = self.raw_key(key)?;
        sink::record(MetricsEvent::Read {
            collection: &self.name,
        });

        match store.get(&raw_key)? {
            Some(raw_value) => Ok(Some(self.value_codec.decode(&raw_value)?)),
            None => Ok(None),
        }
    }

    pub fn has<S: KvStore>(&self, store: &S, key: &K) -> Result<bool, InternalError> {
        let raw_key = self.raw_key(key)?;
        sink::record(MetricsEvent::Read {
            collection: &self.name,
        });

        Ok(store.has(&raw_key)?)
    }

    /// Delete `key`. Removing a missing key is a no-op.
    pub fn remove<S: KvStore>(&self, store: &mut S, key: &K) -> Result<(), InternalError> {
        let raw_key = self.raw_key(key)?;
        store.delete(&raw_key)?;
        sink::record(MetricsEvent::Delete {
            collection: &self.name,
        });

        Ok(())
    }

    /// Iterate the entries selected by `range`.
    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<K>,
    ) -> Result<Iter<'a, K, VC>, InternalError> {
        let values = range.range_values()?;
        let bounds = raw_bounds(&self.prefix, &values)?;

        self.open(store, &bounds.start, bounds.end.as_deref(), values.direction)
    }

    /// Iterate every entry in ascending key order.
    pub fn iter<'a, S: KvStore>(
        &'a self,
        store: &'a S,
    ) -> Result<Iter<'a, K, VC>, InternalError> {
        self.iterate(store, RangeValues::full())
    }

    /// Iterate with raw encoded-key bounds, relative to the collection
    /// prefix. Start is inclusive, end exclusive.
    pub fn iterate_raw<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        direction: Direction,
    ) -> Result<Iter<'a, K, VC>, InternalError> {
        let start = start.map_or_else(|| self.prefix.to_vec(), |start| self.prefix.key(start));
        let end = match end {
            Some(end) => Some(self.prefix.key(end)),
            None => prefix_end(&self.prefix),
        };

        if let Some(end) = &end
            && start > *end
        {
            return Err(InternalError::invalid_iterator(format!(
                "collection '{}': raw range start is greater than end",
                self.name
            )));
        }

        self.open(store, &start, end.as_deref(), direction)
    }

    /// Visit entries in range order until `f` returns `Ok(true)` or an error.
    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<K>, mut f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K, VC::Value) -> Result<bool, E>,
    {
        for entry in self.iterate(store, range)? {
            let (key, value) = entry?;
            if f(key, value)? {
                break;
            }
        }

        Ok(())
    }

    /// Delete every entry selected by `range`, returning how many were removed.
    pub fn clear<S: KvStore>(
        &self,
        store: &mut S,
        range: impl Ranger<K>,
    ) -> Result<usize, InternalError> {
        let values = range.range_values()?;
        let bounds = raw_bounds(&self.prefix, &values)?;

        // Keys are collected first; the cursor borrows the store.
        let raw_keys: Vec<Vec<u8>> = store
            .range(
                Some(bounds.start.as_slice()),
                bounds.end.as_deref(),
                values.direction,
            )?
            .map(|(raw_key, _)| raw_key)
            .collect();

        for raw_key in &raw_keys {
            store.delete(raw_key)?;
            sink::record(MetricsEvent::Delete {
                collection: &self.name,
            });
        }
        trace!(collection = %self.name, removed = raw_keys.len(), "cleared range");

        Ok(raw_keys.len())
    }

    /// Write every entry as a JSON array of `{"key", "value"}` objects.
    pub fn export_genesis<S: KvStore, W: Write>(
        &self,
        store: &S,
        writer: W,
    ) -> Result<usize, InternalError> {
        let mut entries = Vec::new();
        for entry in self.iter(store)? {
            let (key, value) = entry?;
            entries.push(GenesisEntry {
                key: key.encode_json()?,
                value: self.value_codec.encode_json(&value)?,
            });
        }

        serde_json::to_writer(writer, &entries).map_err(|err| {
            InternalError::collection_encoding(format!(
                "collection '{}': genesis export failed: {err}",
                self.name
            ))
        })?;

        Ok(entries.len())
    }

    /// Read a genesis export and write every entry, returning the count.
    pub fn import_genesis<S: KvStore, R: Read>(
        &self,
        store: &mut S,
        reader: R,
    ) -> Result<usize, InternalError> {
        let entries: Vec<GenesisEntry> = serde_json::from_reader(reader).map_err(|err| {
            InternalError::collection_encoding(format!(
                "collection '{}': genesis import failed: {err}",
                self.name
            ))
        })?;

        for entry in &entries {
            let key = K::decode_json(&entry.key)?;
            let value = self.value_codec.decode_json(&entry.value)?;
            self.set(store, &key, &value)?;
        }

        Ok(entries.len())
    }

    // Encode `prefix ++ key`, enforcing the key size limit.
    fn raw_key(&self, key: &K) -> Result<Vec<u8>, InternalError> {
        let mut raw_key = Vec::with_capacity(self.prefix.len() + key.size());
        raw_key.extend_from_slice(&self.prefix);
        key.encode(&mut raw_key)?;

        if raw_key.len() > self.limits.max_key_bytes {
            return Err(InternalError::collection_unsupported(format!(
                "collection '{}': key of {} bytes exceeds limit {}",
                self.name,
                raw_key.len(),
                self.limits.max_key_bytes
            )));
        }

        Ok(raw_key)
    }

    fn open<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        start: &[u8],
        end: Option<&[u8]>,
        direction: Direction,
    ) -> Result<Iter<'a, K, VC>, InternalError> {
        let cursor = store.range(Some(start), end, direction)?;
        sink::record(MetricsEvent::Scan {
            collection: &self.name,
        });

        Ok(Iter::new(cursor, self.prefix.len(), &self.value_codec))
    }
}
