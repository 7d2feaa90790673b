use crate::{
    codec::KeyCodec,
    collections::KeySet,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, RefKeyFn, record_delta, split},
    key::{Pair, PairRange},
    range::Ranger,
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// Multi
///
/// Non-unique index. References are stored as `(reference, primary)` pairs,
/// so all primary keys of one reference key are adjacent and ascending.
///

pub struct Multi<RK, PK, V> {
    refs: KeySet<Pair<RK, PK>>,
    ref_key: RefKeyFn<PK, V, RK>,
}

impl<RK, PK, V> Multi<RK, PK, V>
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
            refs: KeySet::new(builder, prefix, name),
            ref_key: Box::new(ref_key),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.refs.name()
    }

    pub(super) const fn refs(&self) -> &KeySet<Pair<RK, PK>> {
        &self.refs
    }

    /// Primary keys referenced by `rk`, ascending.
    pub fn match_exact<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        rk: RK,
    ) -> Result<impl Iterator<Item = Result<PK, InternalError>> + 'a, InternalError> {
        let refs = self.refs.iterate(store, PairRange::prefixed(rk))?;

        Ok(refs.map(|entry| entry.and_then(split).map(|(_, pk)| pk)))
    }

    /// Raw `(reference, primary)` pairs selected by `range`.
    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<Pair<RK, PK>>,
    ) -> Result<impl Iterator<Item = Result<Pair<RK, PK>, InternalError>> + 'a, InternalError>
    {
        self.refs.iterate(store, range)
    }

    pub fn walk<S, E, F>(
        &self,
        store: &S,
        range: impl Ranger<Pair<RK, PK>>,
        mut f: F,
    ) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(RK, PK) -> Result<bool, E>,
    {
        self.refs.walk(store, range, |pair| {
            let (rk, pk) = split(pair)?;
            f(rk, pk)
        })
    }

    pub fn has<S: KvStore>(&self, store: &S, rk: &RK, pk: &PK) -> Result<bool, InternalError> {
        self.refs.has(store, &Pair::new(rk.clone(), pk.clone()))
    }
}

impl<S, RK, PK, V> Index<S, PK, V> for Multi<RK, PK, V>
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
        let mut removes = 0;
        if let Some(old) = old.get(store)? {
            let old_rk = (self.ref_key)(pk, old)?;
            self.refs.remove(store, &Pair::new(old_rk, pk.clone()))?;
            removes = 1;
        }

        let new_rk = (self.ref_key)(pk, value)?;
        self.refs.set(store, &Pair::new(new_rk, pk.clone()))?;
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
        self.refs.remove(store, &Pair::new(old_rk, pk.clone()))?;
        record_delta(self.refs.name(), 0, 1);

        Ok(())
    }
}
