use crate::{
    codec::{KeyAsValue, KeyCodec, encode_key},
    collections::Map,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, RefsFn, record_delta},
    obs::sink::{self, MetricsEvent},
    range::{Iter, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use std::collections::BTreeSet;
use tracing::debug;

///
/// GenericUniqueIndex
///
/// Index where one value yields zero or more `(referencing, referenced)`
/// pairs and every referencing key may be held by at most one value.
/// Stored as `referencing -> referenced`.
///
/// A referencing key counts as held by the primary key being written when
/// its previous value produced it. Conflicts are detected before any
/// reference is removed or written.
///

pub struct GenericUniqueIndex<RK, PK, RefK, V> {
    refs: Map<RK, KeyAsValue<RefK>>,
    get_refs: RefsFn<PK, V, RK, RefK>,
}

impl<RK, PK, RefK, V> GenericUniqueIndex<RK, PK, RefK, V>
where
    RK: KeyCodec,
    PK: KeyCodec,
    RefK: KeyCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        get_refs: impl Fn(&PK, &V) -> Result<Vec<(RK, RefK)>, InternalError> + 'static,
    ) -> Self {
        Self {
            refs: Map::new(builder, prefix, name, KeyAsValue::new()),
            get_refs: Box::new(get_refs),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.refs.name()
    }

    /// Referenced key held under `rk`; `NotFound` when absent.
    pub fn match_exact<S: KvStore>(&self, store: &S, rk: &RK) -> Result<RefK, InternalError> {
        self.refs.get(store, rk)
    }

    pub fn has<S: KvStore>(&self, store: &S, rk: &RK) -> Result<bool, InternalError> {
        self.refs.has(store, rk)
    }

    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<RK>,
    ) -> Result<Iter<'a, RK, KeyAsValue<RefK>>, InternalError> {
        self.refs.iterate(store, range)
    }

    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<RK>, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(RK, RefK) -> Result<bool, E>,
    {
        self.refs.walk(store, range, f)
    }

    // Reject new referencing keys that repeat, or that are held by another
    // primary key. `held` are the encodings produced by the previous value.
    fn check_unique<S: KvStore>(
        &self,
        store: &S,
        new_refs: &[(RK, RefK)],
        held: &BTreeSet<Vec<u8>>,
    ) -> Result<(), InternalError> {
        let mut seen = BTreeSet::new();

        for (rk, _) in new_refs {
            let encoded = encode_key(rk)?;
            let taken = if seen.contains(&encoded) {
                true
            } else {
                !held.contains(&encoded) && self.refs.has(store, rk)?
            };

            if taken {
                sink::record(MetricsEvent::UniqueViolation {
                    index: self.refs.name(),
                });
                debug!(index = %self.refs.name(), key = %rk.stringify(), "unique index conflict");

                return Err(InternalError::index_conflict(self.refs.name(), rk.stringify()));
            }
            seen.insert(encoded);
        }

        Ok(())
    }
}

impl<S, RK, PK, RefK, V> Index<S, PK, V> for GenericUniqueIndex<RK, PK, RefK, V>
where
    S: KvStore,
    RK: KeyCodec,
    PK: KeyCodec,
    RefK: KeyCodec,
{
    fn name(&self) -> &str {
        self.refs.name()
    }

    fn reference(
        &self,
        store: &mut S,
        pk: &PK,
        value: &V,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        let old_refs = match old.get(store)? {
            Some(old) => (self.get_refs)(pk, old)?,
            None => Vec::new(),
        };
        let held = old_refs
            .iter()
            .map(|(rk, _)| encode_key(rk))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let new_refs = (self.get_refs)(pk, value)?;
        self.check_unique(store, &new_refs, &held)?;

        for (rk, _) in &old_refs {
            self.refs.remove(store, rk)?;
        }
        for (rk, ref_key) in &new_refs {
            self.refs.set(store, rk, ref_key)?;
        }
        record_delta(self.refs.name(), new_refs.len(), old_refs.len());

        Ok(())
    }

    fn unreference(
        &self,
        store: &mut S,
        pk: &PK,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        let Some(old) = old.get(store)? else {
            return Ok(());
        };

        let old_refs = (self.get_refs)(pk, old)?;
        for (rk, _) in &old_refs {
            self.refs.remove(store, rk)?;
        }
        record_delta(self.refs.name(), 0, old_refs.len());

        Ok(())
    }
}
