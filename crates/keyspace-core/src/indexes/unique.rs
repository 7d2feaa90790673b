use crate::{
    codec::{KeyAsValue, KeyCodec, encode_key},
    collections::Map,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, RefKeyFn, record_delta},
    obs::sink::{self, MetricsEvent},
    range::{Iter, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use tracing::debug;

///
/// Unique
///
/// One-to-one index from a reference key to the primary key that owns it.
///
/// Uniqueness is checked before anything is written: a conflicting
/// `reference` fails with `ErrorClass::Conflict` and leaves both the old
/// reference and the primary map untouched.
///

pub struct Unique<RK, PK, V> {
    refs: Map<RK, KeyAsValue<PK>>,
    ref_key: RefKeyFn<PK, V, RK>,
}

impl<RK, PK, V> Unique<RK, PK, V>
where
    RK: KeyCodec,
    PK: KeyCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        ref_key: impl Fn(&PK, &V) -> Result<RK, InternalError> + 'static,
    ) -> Self {
        Self {
            refs: Map::new(builder, prefix, name, KeyAsValue::new()),
            ref_key: Box::new(ref_key),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.refs.name()
    }

    /// Primary key owning `rk`; `NotFound` when nothing references it.
    pub fn match_exact<S: KvStore>(&self, store: &S, rk: &RK) -> Result<PK, InternalError> {
        self.refs.get(store, rk)
    }

    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<RK>,
    ) -> Result<Iter<'a, RK, KeyAsValue<PK>>, InternalError> {
        self.refs.iterate(store, range)
    }

    pub fn walk<S, E, F>(&self, store: &S, range: impl Ranger<RK>, f: F) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(RK, PK) -> Result<bool, E>,
    {
        self.refs.walk(store, range, f)
    }

    fn check_owner<S: KvStore>(&self, store: &S, rk: &RK, pk: &PK) -> Result<(), InternalError> {
        let Some(owner) = self.refs.try_get(store, rk)? else {
            return Ok(());
        };
        if encode_key(&owner)? == encode_key(pk)? {
            return Ok(());
        }

        sink::record(MetricsEvent::UniqueViolation {
            index: self.refs.name(),
        });
        debug!(
            index = %self.refs.name(),
            key = %rk.stringify(),
            owner = %owner.stringify(),
            "unique index conflict"
        );

        Err(InternalError::index_conflict(self.refs.name(), rk.stringify()))
    }
}

impl<S, RK, PK, V> Index<S, PK, V> for Unique<RK, PK, V>
where
    S: KvStore,
    RK: KeyCodec,
    PK: KeyCodec,
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
        let new_rk = (self.ref_key)(pk, value)?;
        self.check_owner(store, &new_rk, pk)?;

        let mut removes = 0;
        if let Some(old) = old.get(store)? {
            let old_rk = (self.ref_key)(pk, old)?;
            self.refs.remove(store, &old_rk)?;
            removes = 1;
        }

        self.refs.set(store, &new_rk, pk)?;
        record_delta(self.refs.name(), 1, removes);

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

        let old_rk = (self.ref_key)(pk, old)?;
        self.refs.remove(store, &old_rk)?;
        record_delta(self.refs.name(), 0, 1);

        Ok(())
    }
}
