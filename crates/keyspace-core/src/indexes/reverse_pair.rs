use crate::{
    codec::KeyCodec,
    collections::KeySet,
    error::InternalError,
    indexed_map::LazyValue,
    indexes::{Index, record_delta, split},
    key::{Pair, PairRange},
    range::Ranger,
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use std::marker::PhantomData;

///
/// ReversePair
///
/// Index over `Pair<K1, K2>` primary keys by their second part, stored as
/// `Pair<K2, K1>`. The reference depends only on the primary key, so the
/// stored value is never read.
///

pub struct ReversePair<K1, K2, V> {
    refs: KeySet<Pair<K2, K1>>,
    _value: PhantomData<fn(&V)>,
}

impl<K1, K2, V> ReversePair<K1, K2, V>
where
    K1: KeyCodec,
    K2: KeyCodec,
{
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            refs: KeySet::new(builder, prefix, name),
            _value: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.refs.name()
    }

    /// Every primary pair whose second part is `k2`, ascending by first part.
    pub fn match_exact<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        k2: K2,
    ) -> Result<impl Iterator<Item = Result<Pair<K1, K2>, InternalError>> + 'a, InternalError>
    {
        self.iterate(store, PairRange::prefixed(k2))
    }

    /// Primary pairs selected by a range over the reversed `(k2, k1)` keys.
    pub fn iterate<'a, S: KvStore>(
        &'a self,
        store: &'a S,
        range: impl Ranger<Pair<K2, K1>>,
    ) -> Result<impl Iterator<Item = Result<Pair<K1, K2>, InternalError>> + 'a, InternalError>
    {
        let refs = self.refs.iterate(store, range)?;

        Ok(refs.map(|entry| {
            entry
                .and_then(split)
                .map(|(k2, k1)| Pair::new(k1, k2))
        }))
    }

    pub fn walk<S, E, F>(
        &self,
        store: &S,
        range: impl Ranger<Pair<K2, K1>>,
        mut f: F,
    ) -> Result<(), E>
    where
        S: KvStore,
        E: From<InternalError>,
        F: FnMut(K1, K2) -> Result<bool, E>,
    {
        self.refs.walk(store, range, |pair| {
            let (k2, k1) = split(pair)?;
            f(k1, k2)
        })
    }

    fn reversed(pk: &Pair<K1, K2>) -> Result<Pair<K2, K1>, InternalError> {
        let (k1, k2) = split(pk.clone())?;

        Ok(Pair::new(k2, k1))
    }
}

impl<S, K1, K2, V> Index<S, Pair<K1, K2>, V> for ReversePair<K1, K2, V>
where
    S: KvStore,
    K1: KeyCodec,
    K2: KeyCodec,
{
    fn name(&self) -> &str {
        self.refs.name()
    }

    fn reference(
        &self,
        store: &mut S,
        pk: &Pair<K1, K2>,
        _: &V,
        _: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        self.refs.set(store, &Self::reversed(pk)?)?;
        record_delta(self.refs.name(), 1, 0);

        Ok(())
    }

    fn unreference(
        &self,
        store: &mut S,
        pk: &Pair<K1, K2>,
        _: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError> {
        self.refs.remove(store, &Self::reversed(pk)?)?;
        record_delta(self.refs.name(), 0, 1);

        Ok(())
    }
}
