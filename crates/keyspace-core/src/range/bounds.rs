use crate::{
    codec::KeyCodec,
    error::InternalError,
    range::{RangeKey, RangeValues},
    store::{prefix_end, next_key},
};

///
/// RawBounds
///
/// Store-level bounds: `start` inclusive, `end` exclusive, `None` end is
/// unbounded.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawBounds {
    pub start: Vec<u8>,
    pub end: Option<Vec<u8>>,
}

/// Lower typed range values into raw store bounds under `prefix`.
///
/// A missing start is the prefix itself; a missing end is the prefix end,
/// so iteration never leaves the collection's namespace.
pub fn raw_bounds<K: KeyCodec>(
    prefix: &[u8],
    values: &RangeValues<K>,
) -> Result<RawBounds, InternalError> {
    let start = match &values.start {
        None => prefix.to_vec(),
        Some(bound) => encode_bound(prefix, bound)?.ok_or_else(|| {
            InternalError::invalid_iterator("range start has no successor in key space")
        })?,
    };

    let end = match &values.end {
        None => prefix_end(prefix),
        Some(bound) => encode_bound(prefix, bound)?,
    };

    if let Some(end) = &end
        && start > *end
    {
        return Err(InternalError::invalid_iterator(format!(
            "range start {start:02x?} is greater than end {end:02x?}"
        )));
    }

    Ok(RawBounds { start, end })
}

// Encode one bound as `prefix ++ key` with the bound-kind adjustment.
fn encode_bound<K: KeyCodec>(
    prefix: &[u8],
    bound: &RangeKey<K>,
) -> Result<Option<Vec<u8>>, InternalError> {
    let key = bound.key();

    let mut bytes = Vec::with_capacity(prefix.len() + key.size() + 1);
    bytes.extend_from_slice(prefix);
    key.encode(&mut bytes)?;

    let bytes = match bound {
        RangeKey::Exact(_) => Some(bytes),
        RangeKey::Next(_) => Some(next_key(&bytes)),
        RangeKey::PrefixEnd(_) => prefix_end(&bytes),
    };

    Ok(bytes)
}
