//! Module: range
//! Responsibility: semantic ranges and their lowering to raw store bounds,
//! plus the typed iterator over a collection's key space.
//! Does not own: key encodings or collection registration.
//! Boundary: collections call `raw_bounds` and wrap cursors in `Iter`.

mod bounds;
mod iter;

#[cfg(test)]
mod tests;

pub use bounds::{RawBounds, raw_bounds};
pub use iter::{Iter, Keys};

use crate::{error::InternalError, store::Direction};

///
/// RangeKey
///
/// One side of a range, expressed on the typed key.
///
/// - `Exact(k)`: the encoding of `k` itself (inclusive start, exclusive end).
/// - `Next(k)`: the encoding of `k` followed by `0x00`, the immediate
///   successor (exclusive start, inclusive end).
/// - `PrefixEnd(k)`: the first key past everything that starts with the
///   encoding of `k`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeKey<K> {
    Exact(K),
    Next(K),
    PrefixEnd(K),
}

impl<K> RangeKey<K> {
    #[must_use]
    pub const fn key(&self) -> &K {
        match self {
            Self::Exact(key) | Self::Next(key) | Self::PrefixEnd(key) => key,
        }
    }
}

///
/// RangeValues
///
/// Fully resolved range shape consumed by the iterator engine.
/// `None` on either side means "bounded only by the collection prefix".
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeValues<K> {
    pub start: Option<RangeKey<K>>,
    pub end: Option<RangeKey<K>>,
    pub direction: Direction,
}

impl<K> RangeValues<K> {
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start: None,
            end: None,
            direction: Direction::Asc,
        }
    }
}

///
/// Ranger
///
/// Anything that can resolve into `RangeValues` for a key type.
/// Consumed once per query.
///

pub trait Ranger<K> {
    fn range_values(self) -> Result<RangeValues<K>, InternalError>;
}

impl<K> Ranger<K> for RangeValues<K> {
    fn range_values(self) -> Result<RangeValues<K>, InternalError> {
        Ok(self)
    }
}

///
/// Range
///
/// Builder for a semantic range over a single key type.
/// A prefix range cannot be combined with explicit start/end bounds.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Range<K> {
    prefix: Option<K>,
    start: Option<RangeKey<K>>,
    end: Option<RangeKey<K>>,
    direction: Direction,
}

impl<K> Default for Range<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Range<K> {
    /// Unbounded ascending range.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prefix: None,
            start: None,
            end: None,
            direction: Direction::Asc,
        }
    }

    /// Restrict to keys whose encoding starts with the encoding of `key`.
    #[must_use]
    pub fn prefix(mut self, key: K) -> Self {
        self.prefix = Some(key);
        self
    }

    #[must_use]
    pub fn start_inclusive(mut self, key: K) -> Self {
        self.start = Some(RangeKey::Exact(key));
        self
    }

    #[must_use]
    pub fn start_exclusive(mut self, key: K) -> Self {
        self.start = Some(RangeKey::Next(key));
        self
    }

    #[must_use]
    pub fn end_inclusive(mut self, key: K) -> Self {
        self.end = Some(RangeKey::Next(key));
        self
    }

    #[must_use]
    pub fn end_exclusive(mut self, key: K) -> Self {
        self.end = Some(RangeKey::Exact(key));
        self
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.direction = Direction::Desc;
        self
    }
}

impl<K: Clone> Ranger<K> for Range<K> {
    fn range_values(self) -> Result<RangeValues<K>, InternalError> {
        let Some(prefix) = self.prefix else {
            return Ok(RangeValues {
                start: self.start,
                end: self.end,
                direction: self.direction,
            });
        };

        if self.start.is_some() || self.end.is_some() {
            return Err(InternalError::invalid_iterator(
                "range prefix cannot be combined with start or end bounds",
            ));
        }

        Ok(RangeValues {
            start: Some(RangeKey::Exact(prefix.clone())),
            end: Some(RangeKey::PrefixEnd(prefix)),
            direction: self.direction,
        })
    }
}
