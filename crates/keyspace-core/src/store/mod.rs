//! Module: store
//! Responsibility: the raw byte key-value boundary every collection sits on.
//! Does not own: typed encoding, namespacing, or range lowering.
//! Boundary: collections call `KvStore`; callers supply the implementation.

mod direction;
mod memory;
mod prefix;

pub use direction::Direction;
pub use memory::MemoryStore;
pub use prefix::{next_key, prefix_end};

use thiserror::Error as ThisError;

/// Owned raw `(key, value)` pair yielded by a store cursor.
pub type RawEntry = (Vec<u8>, Vec<u8>);

/// Boxed store cursor. Dropping it releases the store borrow.
pub type RawCursor<'a> = Box<dyn Iterator<Item = RawEntry> + 'a>;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("invalid store range: start {start:02x?} is greater than end {end:02x?}")]
    InvalidRange { start: Vec<u8>, end: Vec<u8> },

    #[error("store backend error: {0}")]
    Backend(String),
}

///
/// KvStore
///
/// Ordered byte key-value store.
///
/// Range iteration is start-inclusive and end-exclusive; `None` leaves the
/// corresponding side unbounded. Writes take `&mut self`, so no write can
/// interleave with a live cursor.
///

pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        direction: Direction,
    ) -> Result<RawCursor<'a>, StoreError>;
}
