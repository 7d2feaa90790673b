//! ## Crate layout
//! - `core`: codecs, composite keys, collections, indexes, the AVL tree map,
//!   the schema registry, configuration, and observability.
//!
//! Stores are supplied by the caller through `KvStore`; `MemoryStore` is the
//! in-process implementation used by tests and tooling.
//!
//! The `prelude` module mirrors the surface most callers need.

pub use keyspace_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    MAX_VALUE_BYTES,
    error::{ErrorClass, ErrorOrigin, InternalError as Error},
    obs::{metrics_report, metrics_reset_all, with_metrics_sink},
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
}
