//! Shared fixtures for unit tests.

use crate::{
    config::{Config, DEFAULT_MAX_KEY_BYTES, Limits},
    schema::SchemaBuilder,
    store::MemoryStore,
};
use serde::{Deserialize, Serialize};

/// Builder with default limits.
pub(crate) fn builder() -> SchemaBuilder {
    SchemaBuilder::new(Config::default())
}

/// Builder whose collections refuse values above `max_value_bytes`.
pub(crate) fn limited_builder(max_value_bytes: usize) -> SchemaBuilder {
    SchemaBuilder::new(Config {
        limits: Limits {
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_value_bytes,
        },
    })
}

pub(crate) const fn store() -> MemoryStore {
    MemoryStore::new()
}

///
/// Person
///
/// Value type used by collection and index tests.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Person {
    pub name: String,
    pub city: String,
    pub email: String,
    pub age: u32,
}

impl Person {
    pub(crate) fn new(name: &str, city: &str, email: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            city: city.to_string(),
            email: email.to_string(),
            age,
        }
    }
}
