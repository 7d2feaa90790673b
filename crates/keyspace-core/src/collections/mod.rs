//! Module: collections
//! Responsibility: typed collection primitives over a `KvStore`.
//! Does not own: range lowering, key encodings, or index maintenance.
//! Boundary: every collection is a namespaced view built on `Map`.

mod item;
mod keyset;
mod lookup_map;
mod map;
mod sequence;
mod vector;

#[cfg(test)]
mod tests;

pub use item::Item;
pub use keyset::KeySet;
pub use lookup_map::LookupMap;
pub use map::{EncodedEntry, Map};
pub use sequence::Sequence;
pub use vector::Vector;
