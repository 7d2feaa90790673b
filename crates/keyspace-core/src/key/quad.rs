use crate::{
    codec::{CodecError, KeyCodec},
    error::InternalError,
    key::{decode_part, encode_part, json_parts, size_part, stringify_parts, take_part},
    range::{RangeKey, RangeValues, Ranger},
    store::Direction,
};
use serde_json::Value as JsonValue;

///
/// Quad
///
/// Four-part composite key with one-, two- and three-part prefix forms.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Quad<K1, K2, K3, K4> {
    k1: Option<K1>,
    k2: Option<K2>,
    k3: Option<K3>,
    k4: Option<K4>,
}

impl<K1, K2, K3, K4> Quad<K1, K2, K3, K4> {
    pub const fn new(k1: K1, k2: K2, k3: K3, k4: K4) -> Self {
        Self {
            k1: Some(k1),
            k2: Some(k2),
            k3: Some(k3),
            k4: Some(k4),
        }
    }

    pub const fn prefix(k1: K1) -> Self {
        Self {
            k1: Some(k1),
            k2: None,
            k3: None,
            k4: None,
        }
    }

    pub const fn super_prefix(k1: K1, k2: K2) -> Self {
        Self {
            k1: Some(k1),
            k2: Some(k2),
            k3: None,
            k4: None,
        }
    }

    pub const fn super_prefix3(k1: K1, k2: K2, k3: K3) -> Self {
        Self {
            k1: Some(k1),
            k2: Some(k2),
            k3: Some(k3),
            k4: None,
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
    pub const fn k3(&self) -> Option<&K3> {
        self.k3.as_ref()
    }

    #[must_use]
    pub const fn k4(&self) -> Option<&K4> {
        self.k4.as_ref()
    }
}

impl<K1, K2, K3, K4> Quad<K1, K2, K3, K4>
where
    K1: KeyCodec,
    K2: KeyCodec,
    K3: KeyCodec,
    K4: KeyCodec,
{
    pub fn into_parts(self) -> Result<(K1, K2, K3, K4), CodecError> {
        Ok((
            take_part(self.k1, Self::key_type, "k1")?,
            take_part(self.k2, Self::key_type, "k2")?,
            take_part(self.k3, Self::key_type, "k3")?,
            take_part(self.k4, Self::key_type, "k4")?,
        ))
    }

    fn encode_parts(&self, buf: &mut Vec<u8>, terminal: bool) -> Result<usize, CodecError> {
        let mut written = encode_part(self.k1.as_ref(), false, buf)?;
        written += encode_part(self.k2.as_ref(), false, buf)?;
        written += encode_part(self.k3.as_ref(), false, buf)?;
        written += encode_part(self.k4.as_ref(), terminal, buf)?;

        Ok(written)
    }

    fn decode_parts(buf: &[u8], terminal: bool) -> Result<(usize, Self), CodecError> {
        let ty = Self::key_type();
        let mut offset = 0;
        let k1 = decode_part(&ty, buf, &mut offset, false)?;
        let k2 = decode_part(&ty, buf, &mut offset, false)?;
        let k3 = decode_part(&ty, buf, &mut offset, false)?;
        let k4 = decode_part(&ty, buf, &mut offset, terminal)?;

        Ok((offset, Self::new(k1, k2, k3, k4)))
    }

    fn parts_size(&self, terminal: bool) -> usize {
        size_part(self.k1.as_ref(), false)
            + size_part(self.k2.as_ref(), false)
            + size_part(self.k3.as_ref(), false)
            + size_part(self.k4.as_ref(), terminal)
    }
}

impl<K1, K2, K3, K4> KeyCodec for Quad<K1, K2, K3, K4>
where
    K1: KeyCodec,
    K2: KeyCodec,
    K3: KeyCodec,
    K4: KeyCodec,
{
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        self.encode_parts(buf, true)
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        Self::decode_parts(buf, true)
    }

    fn size(&self) -> usize {
        self.parts_size(true)
    }

    fn encode_non_terminal(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        self.encode_parts(buf, false)
    }

    fn decode_non_terminal(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        Self::decode_parts(buf, false)
    }

    fn size_non_terminal(&self) -> usize {
        self.parts_size(false)
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        let mut parts = Vec::with_capacity(4);
        if let Some(k1) = &self.k1 {
            parts.push(k1.encode_json()?);
        }
        if let Some(k2) = &self.k2 {
            parts.push(k2.encode_json()?);
        }
        if let Some(k3) = &self.k3 {
            parts.push(k3.encode_json()?);
        }
        if let Some(k4) = &self.k4 {
            parts.push(k4.encode_json()?);
        }

        Ok(JsonValue::Array(parts))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        let ty = Self::key_type();
        let parts = json_parts(&ty, json, 4)?;

        Ok(Self::new(
            K1::decode_json(&parts[0])?,
            K2::decode_json(&parts[1])?,
            K3::decode_json(&parts[2])?,
            K4::decode_json(&parts[3])?,
        ))
    }

    fn stringify(&self) -> String {
        stringify_parts(&[
            self.k1.as_ref().map(KeyCodec::stringify),
            self.k2.as_ref().map(KeyCodec::stringify),
            self.k3.as_ref().map(KeyCodec::stringify),
            self.k4.as_ref().map(KeyCodec::stringify),
        ])
    }

    fn key_type() -> String {
        format!(
            "quad[{}, {}, {}, {}]",
            K1::key_type(),
            K2::key_type(),
            K3::key_type(),
            K4::key_type()
        )
    }
}

///
/// QuadRange
///

#[derive(Clone, Debug)]
pub struct QuadRange<K1, K2, K3, K4> {
    prefix: Quad<K1, K2, K3, K4>,
    direction: Direction,
}

impl<K1, K2, K3, K4> QuadRange<K1, K2, K3, K4> {
    pub const fn prefixed(k1: K1) -> Self {
        Self {
            prefix: Quad::prefix(k1),
            direction: Direction::Asc,
        }
    }

    pub const fn super_prefixed(k1: K1, k2: K2) -> Self {
        Self {
            prefix: Quad::super_prefix(k1, k2),
            direction: Direction::Asc,
        }
    }

    pub const fn super_prefixed3(k1: K1, k2: K2, k3: K3) -> Self {
        Self {
            prefix: Quad::super_prefix3(k1, k2, k3),
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.direction = Direction::Desc;
        self
    }
}

impl<K1, K2, K3, K4> Ranger<Quad<K1, K2, K3, K4>> for QuadRange<K1, K2, K3, K4>
where
    K1: Clone,
    K2: Clone,
    K3: Clone,
    K4: Clone,
{
    fn range_values(self) -> Result<RangeValues<Quad<K1, K2, K3, K4>>, InternalError> {
        Ok(RangeValues {
            start: Some(RangeKey::Exact(self.prefix.clone())),
            end: Some(RangeKey::PrefixEnd(self.prefix)),
            direction: self.direction,
        })
    }
}
