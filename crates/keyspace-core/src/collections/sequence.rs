use crate::{
    codec::KeyAsValue,
    collections::Item,
    error::InternalError,
    schema::{Prefix, SchemaBuilder},
    store::KvStore,
};

///
/// Sequence
///
/// Monotonic `u64` counter. An unset sequence reads as zero.
///

#[derive(Clone, Debug)]
pub struct Sequence {
    item: Item<KeyAsValue<u64>>,
}

impl Sequence {
    pub fn new(
        builder: &mut SchemaBuilder,
        prefix: impl Into<Prefix>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            item: Item::new(builder, prefix, name, KeyAsValue::new()),
        }
    }

    /// Current value without advancing.
    pub fn peek<S: KvStore>(&self, store: &S) -> Result<u64, InternalError> {
        Ok(self.item.try_get(store)?.unwrap_or(0))
    }

    /// Return the current value and store its successor.
    pub fn next<S: KvStore>(&self, store: &mut S) -> Result<u64, InternalError> {
        let current = self.peek(store)?;
        let next = current.checked_add(1).ok_or_else(|| {
            InternalError::collection_unsupported(format!(
                "sequence '{}' overflowed",
                self.item.name()
            ))
        })?;
        self.item.set(store, &next)?;

        Ok(current)
    }

    /// Overwrite the current value.
    pub fn set<S: KvStore>(&self, store: &mut S, value: u64) -> Result<(), InternalError> {
        self.item.set(store, &value)
    }
}
