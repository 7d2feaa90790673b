use crate::{
    codec::{KeyAsValue, KeyCodec},
    collections::Map,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, RefsFn, record_delta, split},
    key::{Pair, PairRange},
    range::{Iter, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// GenericMultiIndex
///
/// Index where one value yields zero or more `(referencing, referenced)`
/// pairs, for example one entry per element of a list field. Entries are
/// stored as `(referencing, primary) -> referenced`.
///

pub struct GenericMultiIndex<RK, PK, RefK, V> {
    refs: Map<Pair<RK, PK>, KeyAsValue<RefK>>,
    get_refs: RefsFn<PK, V, RK, RefK>,
}

impl<RK, PK, RefK, V> GenericMultiIndex<RK, PK, RefK, V>
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

    pub fn has<S: KvStore>(&self, store: &S, rk: &RK, pk: &PK) -> Result<bool, InternalError> {
        self.refs.has(store, &Pair::new(rk.clone(), pk.clone()))
    }

    /// Referenced key stored for `(rk, pk)`, if the reference exists.
    pub fn try_get<S: KvStore>(
        &self,
        store: &S,
        rk: &RK,
        pk: &PK,
    ) -> Result<Option<RefK>, InternalError> {
        self.refs.try_get(store, &Pair::new(rk.clone(), pk.clone()))
    }

    /// `(primary, referenced)` pairs for one referencing key, ascending by
    /// primary key.
    pub fn match_exact<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        rk: RK,
    ) -> Result<impl Iterator<Item = Result<(PK, RefK), InternalError>> + 'a, InternalError> {
        let refs = self.refs.iterate(store, PairRange::prefixed(rk))?;

        Ok(refs.map(|entry| -> Result<(PK, RefK), InternalError> {
            let (pair, ref_key) = entry?;
            let (_, pk) = split(pair)?;

            Ok((pk, ref_key))
        }))
    }

    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<Pair<RK, PK>>,
    ) -> Result<Iter<'a, Pair<RK, PK>, KeyAsValue<RefK>>, InternalError> {
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
        F: FnMut(RK, PK, RefK) -> Result<bool, E>,
    {
        self.refs.walk(store, range, |pair, ref_key| {
            let (rk, pk) = split(pair)?;
            f(rk, pk, ref_key)
        })
    }

    fn remove_refs<S: KvStore>(
        &self,
        store: &mut S,
        pk: &PK,
        old: &V,
    ) -> Result<usize, InternalError> {
        let old_refs = (self.get_refs)(pk, old)?;
        for (rk, _) in &old_refs {
            self.refs.remove(store, &Pair::new(rk.clone(), pk.clone()))?;
        }

        Ok(old_refs.len())
    }
}

impl<S, RK, PK, RefK, V> Index<S, PK, V> for GenericMultiIndex<RK, PK, RefK, V>
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
        let removes = match old.get(store)? {
            Some(old) => self.remove_refs(store, pk, old)?,
            None => 0,
        };

        let new_refs = (self.get_refs)(pk, value)?;
        for (rk, ref_key) in &new_refs {
            self.refs.set(store, &Pair::new(rk.clone(), pk.clone()), ref_key)?;
        }
        record_delta(self.refs.name(), new_refs.len(), removes);

        Ok(())
    }

    fn unreference(
        &self,
        store: &mut S,
        pk: &PK,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        let removes = match old.get(store)? {
            Some(old) => self.remove_refs(store, pk, old)?,
            None => 0,
        };
        record_delta(self.refs.name(), 0, removes);

        Ok(())
    }
}
