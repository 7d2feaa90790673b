use crate::{
    codec::{KeyCodec, NoValue, UncheckedNoValue, ValueCodec},
    collections::Map,
    error::InternalError,
    range::{RangeValues, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// KeySet
///
/// Ordered set of keys. Members are stored with an empty value.
///
/// `new_unchecked` builds a set that tolerates legacy non-empty
/// placeholder values on read; every `set` rewrites the value as empty.
///

#[derive(Clone, Debug)]
pub struct KeySet<K, VC = NoValue> {
    map: Map<K, VC>,
}

impl<K: KeyCodec> KeySet<K, NoValue> {
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            map: Map::new(builder, prefix, name, NoValue),
        }
    }
}

impl<K: KeyCodec> KeySet<K, UncheckedNoValue> {
    pub fn new_unchecked(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            map: Map::new(builder, prefix, name, UncheckedNoValue),
        }
    }
}

impl<K, VC> KeySet<K, VC>
where
    K: KeyCodec,
    VC: ValueCodec<Value = ()>,
{
    #[must_use]
    pub fn name(&self) -> &str {
        self.map.name()
    }

    #[must_use]
    pub const fn prefix(&self) -> &Prefix {
        self.map.prefix()
    }

    pub fn set<S: KvStore>(&self, store: &mut S, key: &K) -> Result<(), InternalError> {
        self.map.set(store, key, &())
    }

    pub fn has<S: KvStore>(&self, store: &S, key: &K) -> Result<bool, InternalError> {
        self.map.has(store, key)
    }

    pub fn remove<S: KvStore>(&self, store: &mut S, key: &K) -> Result<(), InternalError> {
        self.map.remove(store, key)
    }

    /// Iterate members in range order. Stored values are validated by the
    /// set's value codec as they are read.
    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<K>,
    ) -> Result<impl Iterator<Item = Result<K, InternalError>> + 'a, InternalError> {
        let entries = self.map.iterate(store, range)?;

        Ok(entries.map(|entry| entry.map(|(key, ())| key)))
    }

    pub fn iter<'a, S: KvStore>(
        &'a self,
        store: &'a S,
    ) -> Result<impl Iterator<Item = Result<K, InternalError>> + 'a, InternalError> {
        self.iterate(store, RangeValues::full())
    }

    /// Visit members until `f` returns `Ok(true)` or an error.
    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<K>, mut f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K) -> Result<bool, E>,
    {
        self.map.walk(store, range, |key, ()| f(key))
    }

    pub fn clear<S: KvStore>(
        &self,
        store: &mut S,
        range: impl Ranger<K>,
    ) -> Result<usize, InternalError> {
        self.map.clear(store, range)
    }
}
