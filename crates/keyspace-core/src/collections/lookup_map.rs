use crate::{
    codec::{KeyCodec, ValueCodec},
    collections::Map,
    error::InternalError,
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// LookupMap
///
/// Point-access map with no iteration surface, for key spaces that are
/// only ever read by exact key.
///

#[derive(Clone, Debug)]
pub struct LookupMap<K, VC> {
    map: Map<K, VC>,
}

impl<K: KeyCodec, VC: ValueCodec> LookupMap<K, VC> {
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
        value_codec: VC,
    ) -> Self {
        Self {
            map: Map::new(builder, prefix, name, value_codec),
        }
    }

    pub fn set<S: KvStore>(
        &self,
        store: &mut S,
        key: &K,
        value: &VC::Value,
    ) -> Result<(), InternalError> {
        self.map.set(store, key, value)
    }

    pub fn get<S: KvStore>(&self, store: &S, key: &K) -> Result<VC::Value, InternalError> {
        self.map.get(store, key)
    }

    pub fn try_get<S: KvStore>(
        &self,
        store: &S,
        key: &K,
    ) -> Result<Option<VC::Value>, InternalError> {
        self.map.try_get(store, key)
    }

    pub fn has<S: KvStore>(&self, store: &S, key: &K) -> Result<bool, InternalError> {
        self.map.has(store, key)
    }

    pub fn remove<S: KvStore>(&self, store: &mut S, key: &K) -> Result<(), InternalError> {
        self.map.remove(store, key)
    }
}
