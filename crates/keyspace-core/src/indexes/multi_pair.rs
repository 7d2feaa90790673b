use crate::{
    codec::KeyCodec,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, Multi, split},
    key::Pair,
    range::{Range, Ranger},
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// MultiPair
///
/// `Multi` index for `Pair<K1, K2>` primary keys. References are stored as
/// `(reference, (k1, k2))`, so one reference key can also be narrowed to a
/// single first part.
///

pub struct MultiPair<RK, K1, K2, V> {
    inner: Multi<RK, Pair<K1, K2>, V>,
}

impl<RK, K1, K2, V> MultiPair<RK, K1, K2, V>
where
    RK: KeyCodec,
    K1: KeyCodec,
    K2: KeyCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        ref_key: impl Fn(&Pair<K1, K2>, &V) -> Result<RK, InternalError> + 'static,
    ) -> Self {
        Self {
            inner: Multi::new(builder, prefix, name, ref_key),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Primary pairs referenced by `rk`, ascending.
    pub fn match_exact<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        rk: RK,
    ) -> Result<impl Iterator<Item = Result<Pair<K1, K2>, InternalError>> + 'a, InternalError>
    {
        self.inner.match_exact(store, rk)
    }

    /// Primary pairs referenced by `rk` whose first part is `k1`.
    pub fn match_first<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        rk: RK,
        k1: K1,
    ) -> Result<impl Iterator<Item = Result<Pair<K1, K2>, InternalError>> + 'a, InternalError>
    {
        let prefix = Pair::new(rk, Pair::prefix(k1));
        let refs = self.inner.refs().iterate(store, Range::new().prefix(prefix))?;

        Ok(refs.map(|entry| entry.and_then(split).map(|(_, pk)| pk)))
    }

    pub fn has<S: KvStore>(
        &self,
        store: &S,
        rk: &RK,
        pk: &Pair<K1, K2>,
    ) -> Result<bool, InternalError> {
        self.inner.has(store, rk, pk)
    }

    pub fn walk<S, E, F>(
        &self,
        store: &S,
        range: impl Ranger<Pair<RK, Pair<K1, K2>>>,
        f: F,
    ) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(RK, Pair<K1, K2>) -> Result<bool, E>,
    {
        self.inner.walk(store, range, f)
    }
}

impl<S, RK, K1, K2, V> Index<S, Pair<K1, K2>, V> for MultiPair<RK, K1, K2, V>
where
    S: KvStore,
    RK: KeyCodec,
    K1: KeyCodec,
    K2: KeyCodec,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn reference(
        &self,
        store: &mut S,
        pk: &Pair<K1, K2>,
        value: &V,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        self.inner.reference(store, pk, value, old)
    }

    fn unreference(
        &self,
        store: &mut S,
        pk: &Pair<K1, K2>,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        self.inner.unreference(store, pk, old)
    }
}
