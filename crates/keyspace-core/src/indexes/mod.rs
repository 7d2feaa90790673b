//! Module: indexes
//! Responsibility: secondary indexes kept in sync with a primary map.
//! Does not own: the primary map itself or the order in which indexes run.
//! Boundary: `IndexedMap` drives every index through the `Index` trait;
//! each index persists its references in its own registered collection.
//!
//! Index shapes:
//! - `Multi`: many primary keys per reference key.
//! - `Unique`: at most one primary key per reference key.
//! - `GenericMultiIndex` / `GenericUniqueIndex`: zero or more references per
//!   value, each carrying a referenced key.
//! - `ReversePair`: lookup of `Pair` primary keys by their second part.
//! - `MultiPair`: `Multi` over `Pair` primary keys.

mod generic_multi;
mod generic_unique;
mod multi;
mod multi_pair;
mod reverse_pair;
mod unique;


pub use generic_multi::GenericMultiIndex;
pub use generic_unique::GenericUniqueIndex;
pub use multi::Multi;
pub use multi_pair::MultiPair;
pub use reverse_pair::ReversePair;
pub use unique::Unique;

use crate::{
    codec::KeyCodec,
    error::InternalError,
    indexed_map::LazyValue,
    key::Pair,
    obs::sink::{self, MetricsEvent},
};

/// Derives the single reference key of a value.
pub type RefKeyFn<PK, V, RK> = Box<dyn Fn(&PK, &V) -> Result<RK, InternalError>>;

/// Derives every `(referencing, referenced)` pair of a value.
pub type RefsFn<PK, V, RK, RefK> = Box<dyn Fn(&PK, &V) -> Result<Vec<(RK, RefK)>, InternalError>>;

///
/// Index
///
/// One secondary index over primary keys `PK` and values `V` in store `S`.
///
/// `reference` runs before the primary write with the new value; `old`
/// lazily yields the value currently stored under `pk`, if any.
/// `unreference` runs before the primary delete.
///

pub trait Index<S, PK, V> {
    fn name(&self) -> &str;

    fn reference(
        &self,
        store: &mut S,
        pk: &PK,
        value: &V,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError>;

    fn unreference(
        &self,
        store: &mut S,
        pk: &PK,
        old: &mut LazyValue<'_, S, V>,
    ) -> Result<(), InternalError>;
}

// Split a composite index key; both parts must be present.
pub(crate) fn split<A: KeyCodec, B: KeyCodec>(pair: Pair<A, B>) -> Result<(A, B), InternalError> {
    pair.into_parts()
        .map_err(|err| InternalError::index_encoding(format!("incomplete index key: {err}")))
}

pub(crate) fn record_delta(index: &str, inserts: usize, removes: usize) {
    if inserts == 0 && removes == 0 {
        return;
    }

    sink::record(MetricsEvent::IndexDelta {
        index,
        inserts: u64::try_from(inserts).unwrap_or(u64::MAX),
        removes: u64::try_from(removes).unwrap_or(u64::MAX),
    });
}
