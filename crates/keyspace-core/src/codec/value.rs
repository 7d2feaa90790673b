use crate::{
    MAX_VALUE_BYTES,
    codec::{CodecError, KeyCodec, ValueCodec, decode_key_exact, encode_key},
    serialize::{deserialize_bounded, serialize},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;
use std::{any::type_name, fmt, marker::PhantomData};

// Codec markers carry no data; these impls avoid derive's `T: Trait` bounds.
macro_rules! marker_codec {
    ($name:ident) => {
        impl<T> $name<T> {
            #[must_use]
            pub const fn new() -> Self {
                Self(PhantomData)
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}<{}>", stringify!($name), type_name::<T>())
            }
        }
    };
}

fn json_stringify<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("<unprintable: {err}>"))
}

///
/// Cbor
///
/// Binary value codec backed by serde + CBOR. Decoding is bounded by
/// `MAX_VALUE_BYTES`.
///

pub struct Cbor<T>(PhantomData<fn() -> T>);

marker_codec!(Cbor);

impl<T> ValueCodec for Cbor<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serialize(value).map_err(|source| CodecError::Serialize {
            ty: self.value_type(),
            source,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        deserialize_bounded(bytes, MAX_VALUE_BYTES).map_err(|source| CodecError::Serialize {
            ty: self.value_type(),
            source,
        })
    }

    fn encode_json(&self, value: &T) -> Result<JsonValue, CodecError> {
        serde_json::to_value(value).map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn decode_json(&self, json: &JsonValue) -> Result<T, CodecError> {
        serde_json::from_value(json.clone())
            .map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn stringify(&self, value: &T) -> String {
        json_stringify(value)
    }

    fn value_type(&self) -> String {
        format!("cbor[{}]", type_name::<T>())
    }
}

///
/// Json
///
/// Value codec storing serde_json bytes.
///

pub struct Json<T>(PhantomData<fn() -> T>);

marker_codec!(Json);

impl<T> ValueCodec for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn encode_json(&self, value: &T) -> Result<JsonValue, CodecError> {
        serde_json::to_value(value).map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn decode_json(&self, json: &JsonValue) -> Result<T, CodecError> {
        serde_json::from_value(json.clone())
            .map_err(|err| CodecError::json(self.value_type(), err))
    }

    fn stringify(&self, value: &T) -> String {
        json_stringify(value)
    }

    fn value_type(&self) -> String {
        format!("json[{}]", type_name::<T>())
    }
}

///
/// KeyAsValue
///
/// Stores a value using its terminal key encoding. Used for counters and
/// for index entries that point back at primary keys.
///

pub struct KeyAsValue<K>(PhantomData<fn() -> K>);

marker_codec!(KeyAsValue);

impl<K: KeyCodec> ValueCodec for KeyAsValue<K> {
    type Value = K;

    fn encode(&self, value: &K) -> Result<Vec<u8>, CodecError> {
        encode_key(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<K, CodecError> {
        decode_key_exact(bytes)
    }

    fn encode_json(&self, value: &K) -> Result<JsonValue, CodecError> {
        value.encode_json()
    }

    fn decode_json(&self, json: &JsonValue) -> Result<K, CodecError> {
        K::decode_json(json)
    }

    fn stringify(&self, value: &K) -> String {
        value.stringify()
    }

    fn value_type(&self) -> String {
        K::key_type()
    }
}

///
/// NoValue
///
/// Placeholder value for membership-only collections. Encodes to zero
/// bytes and rejects anything else on decode.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoValue;

impl ValueCodec for NoValue {
    type Value = ();

    fn encode(&self, _: &()) -> Result<Vec<u8>, CodecError> {
        Ok(Vec::new())
    }

    fn decode(&self, bytes: &[u8]) -> Result<(), CodecError> {
        if !bytes.is_empty() {
            return Err(CodecError::NonEmptyValue {
                ty: self.value_type(),
                len: bytes.len(),
            });
        }

        Ok(())
    }

    fn encode_json(&self, _: &()) -> Result<JsonValue, CodecError> {
        Ok(JsonValue::Object(serde_json::Map::new()))
    }

    fn decode_json(&self, _: &JsonValue) -> Result<(), CodecError> {
        Ok(())
    }

    fn stringify(&self, _: &()) -> String {
        "<no_value>".to_string()
    }

    fn value_type(&self) -> String {
        "no_value".to_string()
    }
}

///
/// UncheckedNoValue
///
/// Like [`NoValue`] but tolerates legacy non-empty placeholder bytes on
/// decode. Writes are always empty, so entries are repaired on next write.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UncheckedNoValue;

impl ValueCodec for UncheckedNoValue {
    type Value = ();

    fn encode(&self, _: &()) -> Result<Vec<u8>, CodecError> {
        Ok(Vec::new())
    }

    fn decode(&self, _: &[u8]) -> Result<(), CodecError> {
        Ok(())
    }

    fn encode_json(&self, value: &()) -> Result<JsonValue, CodecError> {
        NoValue.encode_json(value)
    }

    fn decode_json(&self, _: &JsonValue) -> Result<(), CodecError> {
        Ok(())
    }

    fn stringify(&self, _: &()) -> String {
        "<no_value>".to_string()
    }

    fn value_type(&self) -> String {
        "unchecked_no_value".to_string()
    }
}
