use crate::{
    codec::{CodecError, KeyCodec},
    error::InternalError,
    key::{decode_part, encode_part, json_parts, size_part, stringify_parts, take_part},
    range::{RangeKey, RangeValues, Ranger},
    store::Direction,
};
use serde_json::Value as JsonValue;

///
/// Pair
///
/// Two-part composite key. A pair built with [`Pair::prefix`] carries only
/// its first part and is used to address every key sharing that part.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pair<K1, K2> {
    k1: Option<K1>,
    k2: Option<K2>,
}

impl<K1, K2> Pair<K1, K2> {
    pub const fn new(k1: K1, k2: K2) -> Self {
        Self {
            k1: Some(k1),
            k2: Some(k2),
        }
    }

    /// Prefix key holding only the first part.
    pub const fn prefix(k1: K1) -> Self {
        Self {
            k1: Some(k1),
            k2: None,
        }
    }

    #[must_use]
    pub const fn k1(&self) -> Option<&K1> {
        self.k1.as_ref()
    }

    #[must_use]
    pub const fn k2(&self) -> Option<&K2> {
        self.k2.as_ref()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.k2.is_some()
    }
}

impl<K1: KeyCodec, K2: KeyCodec> Pair<K1, K2> {
    /// Split a complete pair into its parts.
    pub fn into_parts(self) -> Result<(K1, K2), CodecError> {
        Ok((
            take_part(self.k1, Self::key_type, "k1")?,
            take_part(self.k2, Self::key_type, "k2")?,
        ))
    }
}

impl<K1, K2> From<(K1, K2)> for Pair<K1, K2> {
    fn from((k1, k2): (K1, K2)) -> Self {
        Self::new(k1, k2)
    }
}

impl<K1: KeyCodec, K2: KeyCodec> KeyCodec for Pair<K1, K2> {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        let written = encode_part(self.k1.as_ref(), false, buf)?;

        Ok(written + encode_part(self.k2.as_ref(), true, buf)?)
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        let ty = Self::key_type();
        let mut offset = 0;
        let k1 = decode_part(&ty, buf, &mut offset, false)?;
        let k2 = decode_part(&ty, buf, &mut offset, true)?;

        Ok((offset, Self::new(k1, k2)))
    }

    fn size(&self) -> usize {
        size_part(self.k1.as_ref(), false) + size_part(self.k2.as_ref(), true)
    }

    fn encode_non_terminal(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        let written = encode_part(self.k1.as_ref(), false, buf)?;

        Ok(written + encode_part(self.k2.as_ref(), false, buf)?)
    }

    fn decode_non_terminal(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        let ty = Self::key_type();
        let mut offset = 0;
        let k1 = decode_part(&ty, buf, &mut offset, false)?;
        let k2 = decode_part(&ty, buf, &mut offset, false)?;

        Ok((offset, Self::new(k1, k2)))
    }

    fn size_non_terminal(&self) -> usize {
        size_part(self.k1.as_ref(), false) + size_part(self.k2.as_ref(), false)
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        let mut parts = Vec::with_capacity(2);
        if let Some(k1) = &self.k1 {
            parts.push(k1.encode_json()?);
        }
        if let Some(k2) = &self.k2 {
            parts.push(k2.encode_json()?);
        }

        Ok(JsonValue::Array(parts))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        let ty = Self::key_type();
        let parts = json_parts(&ty, json, 2)?;

        Ok(Self::new(K1::decode_json(&parts[0])?, K2::decode_json(&parts[1])?))
    }

    fn stringify(&self) -> String {
        stringify_parts(&[
            self.k1.as_ref().map(KeyCodec::stringify),
            self.k2.as_ref().map(KeyCodec::stringify),
        ])
    }

    fn key_type() -> String {
        format!("pair[{}, {}]", K1::key_type(), K2::key_type())
    }
}

///
/// PairRange
///
/// Range over all pairs sharing a first part, optionally bounded on the
/// second part.
///

#[derive(Clone, Debug)]
pub struct PairRange<K1, K2> {
    prefix: K1,
    start: Option<RangeKey<K2>>,
    end: Option<RangeKey<K2>>,
    direction: Direction,
}

impl<K1, K2> PairRange<K1, K2> {
    pub const fn prefixed(k1: K1) -> Self {
        Self {
            prefix: k1,
            start: None,
            end: None,
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub fn start_inclusive(mut self, k2: K2) -> Self {
        self.start = Some(RangeKey::Exact(k2));
        self
    }

    #[must_use]
    pub fn start_exclusive(mut self, k2: K2) -> Self {
        self.start = Some(RangeKey::Next(k2));
        self
    }

    #[must_use]
    pub fn end_inclusive(mut self, k2: K2) -> Self {
        self.end = Some(RangeKey::Next(k2));
        self
    }

    #[must_use]
    pub fn end_exclusive(mut self, k2: K2) -> Self {
        self.end = Some(RangeKey::Exact(k2));
        self
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.direction = Direction::Desc;
        self
    }
}

// Rebuild a second-part bound as a bound on the full pair.
fn pair_bound<K1, K2>(k1: K1, bound: RangeKey<K2>) -> RangeKey<Pair<K1, K2>> {
    match bound {
        RangeKey::Exact(k2) => RangeKey::Exact(Pair::new(k1, k2)),
        RangeKey::Next(k2) => RangeKey::Next(Pair::new(k1, k2)),
        RangeKey::PrefixEnd(k2) => RangeKey::PrefixEnd(Pair::new(k1, k2)),
    }
}

impl<K1: Clone, K2> Ranger<Pair<K1, K2>> for PairRange<K1, K2> {
    fn range_values(self) -> Result<RangeValues<Pair<K1, K2>>, InternalError> {
        let start = match self.start {
            Some(bound) => pair_bound(self.prefix.clone(), bound),
            None => RangeKey::Exact(Pair::prefix(self.prefix.clone())),
        };
        let end = match self.end {
            Some(bound) => pair_bound(self.prefix, bound),
            None => RangeKey::PrefixEnd(Pair::prefix(self.prefix)),
        };

        Ok(RangeValues {
            start: Some(start),
            end: Some(end),
            direction: self.direction,
        })
    }
}
