use crate::{
    codec::{NoKey, ValueCodec},
    collections::Map,
    error::InternalError,
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};
use std::io::{Read, Write};

///
/// Item
///
/// Single value stored directly under the collection prefix.
///

#[derive(Clone, Debug)]
pub struct Item<VC> {
    map: Map<NoKey, VC>,
}

impl<VC: ValueCodec> Item<VC> {
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

    #[must_use]
    pub fn name(&self) -> &str {
        self.map.name()
    }

    /// Read the value; unset is a `NotFound` error.
    pub fn get<S: KvStore>(&self, store: &S) -> Result<VC::Value, InternalError> {
        self.map.get(store, &NoKey)
    }

    pub fn try_get<S: KvStore>(&self, store: &S) -> Result<Option<VC::Value>, InternalError> {
        self.map.try_get(store, &NoKey)
    }

    pub fn set<S: KvStore>(&self, store: &mut S, value: &VC::Value) -> Result<(), InternalError> {
        self.map.set(store, &NoKey, value)
    }

    pub fn has<S: KvStore>(&self, store: &S) -> Result<bool, InternalError> {
        self.map.has(store, &NoKey)
    }

    pub fn remove<S: KvStore>(&self, store: &mut S) -> Result<(), InternalError> {
        self.map.remove(store, &NoKey)
    }

    pub fn export_genesis<S: KvStore, W: Write>(
        &self,
        store: &S,
        writer: W,
    ) -> Result<usize, InternalError> {
        self.map.export_genesis(store, writer)
    }

    pub fn import_genesis<S: KvStore, R: Read>(
        &self,
        store: &mut S,
        reader: R,
    ) -> Result<usize, InternalError> {
        self.map.import_genesis(store, reader)
    }
}
