use crate::store::{Direction, KvStore, RawCursor, StoreError};
use derive_more::Deref;
use std::{collections::BTreeMap, ops::Bound};

///
/// MemoryStore
///
/// In-memory ordered byte store. Used by tests and by embedders that do
/// not need durability; it has no transactions.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct MemoryStore(BTreeMap<Vec<u8>, Vec<u8>>);

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sum of bytes used by all stored keys and values.
    #[must_use]
    pub fn memory_bytes(&self) -> u64 {
        self.0
            .iter()
            .map(|(key, value)| (key.len() + value.len()) as u64)
            .sum()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.0.get(key).cloned())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.0.contains_key(key))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.0.insert(key.to_vec(), value.to_vec());

        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.0.remove(key);

        Ok(())
    }

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        direction: Direction,
    ) -> Result<RawCursor<'a>, StoreError> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(StoreError::InvalidRange {
                start: start.to_vec(),
                end: end.to_vec(),
            });
        }

        let lower = start.map_or(Bound::Unbounded, Bound::Included);
        let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
        let entries = self
            .0
            .range::<[u8], _>((lower, upper))
            .map(|(key, value)| (key.clone(), value.clone()));

        let cursor: RawCursor<'a> = match direction {
            Direction::Asc => Box::new(entries),
            Direction::Desc => Box::new(entries.rev()),
        };

        Ok(cursor)
    }
}

///
/// TESTS
///
