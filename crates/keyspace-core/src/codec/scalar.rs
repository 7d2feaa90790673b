use crate::codec::{
    CodecError, KeyCodec, ensure_len,
    ordered::{
        i8_from_ordered, i16_from_ordered, i32_from_ordered, i64_from_ordered, ordered_i8_bytes,
        ordered_i16_bytes, ordered_i32_bytes, ordered_i64_bytes,
    },
};
use serde_json::Value as JsonValue;

// Fixed-width integers read exactly their width; the terminal and
// non-terminal forms are identical.
fn read_array<const N: usize>(ty: &str, buf: &[u8]) -> Result<[u8; N], CodecError> {
    ensure_len(ty, buf, N)?;

    let mut out = [0u8; N];
    out.copy_from_slice(&buf[..N]);

    Ok(out)
}

// 64-bit integers travel as JSON strings so they survive double-precision
// JSON consumers; narrower integers are plain numbers. Both shapes decode.
fn json_integer_text(ty: &str, json: &JsonValue) -> Result<String, CodecError> {
    match json {
        JsonValue::String(text) => Ok(text.clone()),
        JsonValue::Number(number) => Ok(number.to_string()),
        other => Err(CodecError::json(
            ty,
            format!("expected integer, got {other}"),
        )),
    }
}

macro_rules! unsigned_key {
    ($ty:ty, $name:literal, $width:expr, $json_string:expr) => {
        impl KeyCodec for $ty {
            fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
                buf.extend_from_slice(&self.to_be_bytes());
                Ok($width)
            }

            fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
                let bytes = read_array::<$width>($name, buf)?;
                Ok(($width, <$ty>::from_be_bytes(bytes)))
            }

            fn size(&self) -> usize {
                $width
            }

            fn encode_json(&self) -> Result<JsonValue, CodecError> {
                if $json_string {
                    Ok(JsonValue::String(self.to_string()))
                } else {
                    Ok(JsonValue::from(*self))
                }
            }

            fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
                json_integer_text($name, json)?
                    .parse::<$ty>()
                    .map_err(|err| CodecError::json($name, err))
            }

            fn stringify(&self) -> String {
                self.to_string()
            }

            fn key_type() -> String {
                $name.to_string()
            }
        }
    };
}

macro_rules! signed_key {
    ($ty:ty, $name:literal, $width:expr, $encode:ident, $decode:ident, $json_string:expr) => {
        impl KeyCodec for $ty {
            fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
                buf.extend_from_slice(&$encode(*self));
                Ok($width)
            }

            fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
                let bytes = read_array::<$width>($name, buf)?;
                Ok(($width, $decode(bytes)))
            }

            fn size(&self) -> usize {
                $width
            }

            fn encode_json(&self) -> Result<JsonValue, CodecError> {
                if $json_string {
                    Ok(JsonValue::String(self.to_string()))
                } else {
                    Ok(JsonValue::from(*self))
                }
            }

            fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
                json_integer_text($name, json)?
                    .parse::<$ty>()
                    .map_err(|err| CodecError::json($name, err))
            }

            fn stringify(&self) -> String {
                self.to_string()
            }

            fn key_type() -> String {
                $name.to_string()
            }
        }
    };
}

unsigned_key!(u8, "uint8", 1, false);
unsigned_key!(u16, "uint16", 2, false);
unsigned_key!(u32, "uint32", 4, false);
unsigned_key!(u64, "uint64", 8, true);

signed_key!(i8, "int8", 1, ordered_i8_bytes, i8_from_ordered, false);
signed_key!(i16, "int16", 2, ordered_i16_bytes, i16_from_ordered, false);
signed_key!(i32, "int32", 4, ordered_i32_bytes, i32_from_ordered, false);
signed_key!(i64, "int64", 8, ordered_i64_bytes, i64_from_ordered, true);

impl KeyCodec for bool {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        buf.push(u8::from(*self));
        Ok(1)
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        ensure_len("bool", buf, 1)?;

        match buf[0] {
            0 => Ok((1, false)),
            1 => Ok((1, true)),
            byte => Err(CodecError::InvalidByte {
                ty: "bool".to_string(),
                byte,
            }),
        }
    }

    fn size(&self) -> usize {
        1
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        Ok(JsonValue::Bool(*self))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        json.as_bool()
            .ok_or_else(|| CodecError::json("bool", format!("expected bool, got {json}")))
    }

    fn stringify(&self) -> String {
        self.to_string()
    }

    fn key_type() -> String {
        "bool".to_string()
    }
}

///
/// NoKey
///
/// Zero-byte key used by single-value collections: the collection prefix
/// alone is the stored key.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NoKey;

impl KeyCodec for NoKey {
    fn encode(&self, _: &mut Vec<u8>) -> Result<usize, CodecError> {
        Ok(0)
    }

    fn decode(_: &[u8]) -> Result<(usize, Self), CodecError> {
        Ok((0, Self))
    }

    fn size(&self) -> usize {
        0
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        Ok(JsonValue::Null)
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        if json.is_null() {
            Ok(Self)
        } else {
            Err(CodecError::json("no_key", format!("expected null, got {json}")))
        }
    }

    fn stringify(&self) -> String {
        "<no_key>".to_string()
    }

    fn key_type() -> String {
        "no_key".to_string()
    }
}
