//! Module: key
//! Responsibility: multi-part composite keys and their prefixed ranges.
//! Does not own: scalar part encodings (see `codec`).
//! Boundary: composite keys are ordinary `KeyCodec` types to collections.
//!
//! Parts `1..n-1` are written in non-terminal form and part `n` in terminal
//! form. A prefix key holds only its leading parts and encodes them in the
//! same positions, so its encoding is a byte prefix of every full key that
//! extends it. Nested inside another key, every part is non-terminal.

mod pair;
mod quad;
mod triple;

#[cfg(test)]
mod tests;

pub use pair::{Pair, PairRange};
pub use quad::{Quad, QuadRange};
pub use triple::{Triple, TripleRange};

use crate::codec::{CodecError, KeyCodec};
use serde_json::Value as JsonValue;

// Encode one optional part in its positional form.
fn encode_part<K: KeyCodec>(
    part: Option<&K>,
    terminal: bool,
    buf: &mut Vec<u8>,
) -> Result<usize, CodecError> {
    match part {
        None => Ok(0),
        Some(key) if terminal => key.encode(buf),
        Some(key) => key.encode_non_terminal(buf),
    }
}

fn size_part<K: KeyCodec>(part: Option<&K>, terminal: bool) -> usize {
    match part {
        None => 0,
        Some(key) if terminal => key.size(),
        Some(key) => key.size_non_terminal(),
    }
}

// Decode one part at `offset`, advancing the offset.
fn decode_part<K: KeyCodec>(
    ty: &str,
    buf: &[u8],
    offset: &mut usize,
    terminal: bool,
) -> Result<K, CodecError> {
    let rest = buf
        .get(*offset..)
        .ok_or_else(|| CodecError::buffer_too_small(ty, *offset, buf.len()))?;

    let (read, key) = if terminal {
        K::decode(rest)?
    } else {
        K::decode_non_terminal(rest)?
    };
    *offset += read;

    Ok(key)
}

fn stringify_parts(parts: &[Option<String>]) -> String {
    let rendered: Vec<&str> = parts.iter().flatten().map(String::as_str).collect();

    format!("({})", rendered.join(", "))
}

// Unwrap a part of a key that must be complete.
fn take_part<K>(
    part: Option<K>,
    key_type: fn() -> String,
    name: &'static str,
) -> Result<K, CodecError> {
    part.ok_or_else(|| CodecError::IncompleteKey {
        ty: key_type(),
        part: name,
    })
}

fn json_parts<'a>(
    ty: &str,
    json: &'a JsonValue,
    expected: usize,
) -> Result<&'a [JsonValue], CodecError> {
    let parts = json
        .as_array()
        .ok_or_else(|| CodecError::json(ty, format!("expected array, got {json}")))?;

    if parts.len() != expected {
        return Err(CodecError::json(
            ty,
            format!("expected {expected} parts, got {}", parts.len()),
        ));
    }

    Ok(parts.as_slice())
}
