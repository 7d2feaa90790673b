//! Core of keyspace: order-preserving key codecs, typed collections over a
//! raw byte store, secondary indexes, and the ergonomics exported via the
//! `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod avl;
pub mod codec;
pub mod collections;
pub mod config;
pub mod error;
pub mod indexed_map;
pub mod indexes;
pub mod key;
pub mod obs;
pub mod range;
pub mod schema;
pub mod serialize;
pub mod store;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Hard ceiling on a single encoded value.
///
/// CBOR decoding refuses larger payloads outright, and configured write
/// limits may only tighten it.
pub const MAX_VALUE_BYTES: usize = 4 * 1024 * 1024;

///
/// Prelude
///
/// Collection vocabulary plus the store seam. Codec internals, metrics
/// plumbing and serializer helpers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        avl::TreeMap,
        codec::{Cbor, Json, KeyAsValue, KeyCodec, NoKey, NoValue, UncheckedNoValue, ValueCodec},
        collections::{Item, KeySet, LookupMap, Map, Sequence, Vector},
        config::Config,
        error::InternalError,
        indexed_map::{IndexedMap, Indexes, LazyValue},
        indexes::{
            GenericMultiIndex, GenericUniqueIndex, Index, Multi, MultiPair, ReversePair, Unique,
        },
        key::{Pair, PairRange, Quad, QuadRange, Triple, TripleRange},
        range::{Range, RangeValues, Ranger},
        schema::{Prefix, Schema, SchemaBuilder},
        store::{Direction, KvStore, MemoryStore},
    };
}
