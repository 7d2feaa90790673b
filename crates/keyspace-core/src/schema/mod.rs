//! Module: schema
//! Responsibility: the registry of named, prefixed collections.
//! Does not own: collection behavior or key encodings.
//! Boundary: every collection constructor registers through `SchemaBuilder`;
//! `build()` validates the whole set once and produces an immutable `Schema`.

mod naming;
mod prefix;

#[cfg(test)]
mod tests;

pub use prefix::Prefix;

use crate::config::{Config, Limits};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use tracing::debug;

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("invalid collection name: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("duplicate collection name '{name}'")]
    DuplicateName { name: String },

    #[error("prefix {prefix} of '{name}' is already used by '{existing}'")]
    DuplicatePrefix {
        prefix: Prefix,
        name: String,
        existing: String,
    },

    #[error("prefix {outer_prefix} of '{outer}' is a prefix of {inner_prefix} ('{inner}')")]
    OverlappingPrefix {
        outer: String,
        outer_prefix: Prefix,
        inner: String,
        inner_prefix: Prefix,
    },

    #[error("{} schema errors: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<Self>),
}

fn join_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

///
/// CollectionInfo
///
/// Registration metadata for one collection.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub prefix: Prefix,
    pub key_type: String,
    pub value_type: String,
}

///
/// SchemaBuilder
///
/// Mutable registry used while collections are being constructed.
/// Registration problems are collected rather than returned so that a
/// single `build()` reports every mistake at once.
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    config: Config,
    collections: BTreeMap<String, CollectionInfo>,
    prefixes: BTreeMap<Prefix, String>,
    errors: Vec<SchemaError>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn limits(&self) -> Limits {
        self.config.limits
    }

    /// Record a collection. Invalid names, duplicate names and duplicate
    /// prefixes are remembered and reported by `build()`.
    pub(crate) fn register(&mut self, info: CollectionInfo) {
        if let Err(reason) = naming::validate_collection_name(&info.name) {
            self.errors.push(SchemaError::InvalidName {
                name: info.name,
                reason,
            });
            return;
        }

        if self.collections.contains_key(&info.name) {
            self.errors.push(SchemaError::DuplicateName { name: info.name });
            return;
        }

        if let Some(existing) = self.prefixes.get(&info.prefix) {
            self.errors.push(SchemaError::DuplicatePrefix {
                prefix: info.prefix,
                name: info.name,
                existing: existing.clone(),
            });
            return;
        }

        self.prefixes.insert(info.prefix.clone(), info.name.clone());
        self.collections.insert(info.name.clone(), info);
    }

    /// Validate the registry and freeze it.
    pub fn build(mut self) -> Result<Schema, SchemaError> {
        self.check_overlaps();

        match self.errors.len() {
            0 => {}
            1 => return Err(self.errors.remove(0)),
            _ => return Err(SchemaError::Multiple(self.errors)),
        }

        debug!(collections = self.collections.len(), "schema built");

        Ok(Schema {
            config: self.config,
            collections: self.collections,
            prefixes: self.prefixes,
        })
    }

    // In sorted order every key extending a prefix follows it contiguously,
    // so each prefix is compared only against that run.
    fn check_overlaps(&mut self) {
        let sorted: Vec<(&Prefix, &String)> = self.prefixes.iter().collect();
        let mut overlaps = Vec::new();

        for (i, &(outer_prefix, outer)) in sorted.iter().enumerate() {
            for &(inner_prefix, inner) in &sorted[i + 1..] {
                if !inner_prefix.starts_with(outer_prefix.as_bytes()) {
                    break;
                }

                overlaps.push(SchemaError::OverlappingPrefix {
                    outer: outer.clone(),
                    outer_prefix: outer_prefix.clone(),
                    inner: inner.clone(),
                    inner_prefix: inner_prefix.clone(),
                });
            }
        }

        self.errors.extend(overlaps);
    }
}

///
/// Schema
///
/// Immutable registry produced by `SchemaBuilder::build`.
///

#[derive(Clone, Debug)]
pub struct Schema {
    config: Config,
    collections: BTreeMap<String, CollectionInfo>,
    prefixes: BTreeMap<Prefix, String>,
}

impl Schema {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Registered names in ascending order.
    #[must_use]
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&CollectionInfo> {
        self.collections.get(name)
    }

    /// Collection owning a raw store key, if any.
    #[must_use]
    pub fn collection_for_key(&self, raw_key: &[u8]) -> Option<&CollectionInfo> {
        self.prefixes
            .iter()
            .rev()
            .find(|(prefix, _)| raw_key.starts_with(prefix.as_bytes()))
            .and_then(|(_, name)| self.collections.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
