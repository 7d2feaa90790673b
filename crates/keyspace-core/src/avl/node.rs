use crate::codec::{CodecError, KeyCodec, ValueCodec, decode_key_exact};
use serde_json::{Value as JsonValue, json};
use std::{fmt, marker::PhantomData};

// id + (flag + id) * 2 + height
const HEADER_LEN: usize = 8 + 9 + 9 + 8;

///
/// Node
///
/// One tree node. Children are node ids, not pointers; `id` is the node's
/// index in the node vector and is never reused.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node<K> {
    pub id: u64,
    pub left: Option<u64>,
    pub right: Option<u64>,
    pub height: u64,
    pub key: K,
}

impl<K> Node<K> {
    #[must_use]
    pub const fn leaf(id: u64, key: K) -> Self {
        Self {
            id,
            left: None,
            right: None,
            height: 1,
            key,
        }
    }
}

///
/// NodeCodec
///
/// Fixed binary layout:
/// `id(8) | has_left(1) left(8) | has_right(1) right(8) | height(8) | key`.
/// Integers are big-endian; an absent child is written as flag 0 and id 0.
/// The key uses its terminal encoding.
///

pub struct NodeCodec<K>(PhantomData<fn() -> K>);

impl<K> NodeCodec<K> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K> Clone for NodeCodec<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeCodec<K> {}

impl<K> Default for NodeCodec<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for NodeCodec<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeCodec")
    }
}

fn encode_child(child: Option<u64>, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    child.is_some().encode(buf)?;
    child.unwrap_or(0).encode(buf)?;

    Ok(())
}

fn decode_child(buf: &[u8], offset: &mut usize) -> Result<Option<u64>, CodecError> {
    let (_, present) = bool::decode(&buf[*offset..])?;
    let (_, id) = u64::decode(&buf[*offset + 1..*offset + 9])?;
    *offset += 9;

    Ok(present.then_some(id))
}

fn json_u64(ty: &str, json: &JsonValue, field: &str) -> Result<u64, CodecError> {
    json.get(field)
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| CodecError::json(ty, format!("missing or invalid field '{field}'")))
}

fn json_child(ty: &str, json: &JsonValue, field: &str) -> Result<Option<u64>, CodecError> {
    match json.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| CodecError::json(ty, format!("invalid field '{field}'"))),
    }
}

impl<K: KeyCodec> ValueCodec for NodeCodec<K> {
    type Value = Node<K>;

    fn encode(&self, node: &Node<K>) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(HEADER_LEN + node.key.size());
        node.id.encode(&mut buf)?;
        encode_child(node.left, &mut buf)?;
        encode_child(node.right, &mut buf)?;
        node.height.encode(&mut buf)?;
        node.key.encode(&mut buf)?;

        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Node<K>, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::buffer_too_small(
                self.value_type(),
                HEADER_LEN,
                bytes.len(),
            ));
        }

        let (_, id) = u64::decode(&bytes[..8])?;
        let mut offset = 8;
        let left = decode_child(bytes, &mut offset)?;
        let right = decode_child(bytes, &mut offset)?;
        let (_, height) = u64::decode(&bytes[offset..offset + 8])?;
        let key = decode_key_exact(&bytes[HEADER_LEN..])?;

        Ok(Node {
            id,
            left,
            right,
            height,
            key,
        })
    }

    fn encode_json(&self, node: &Node<K>) -> Result<JsonValue, CodecError> {
        Ok(json!({
            "id": node.id,
            "left": node.left,
            "right": node.right,
            "height": node.height,
            "key": node.key.encode_json()?,
        }))
    }

    fn decode_json(&self, json: &JsonValue) -> Result<Node<K>, CodecError> {
        let ty = self.value_type();
        let key = json
            .get("key")
            .ok_or_else(|| CodecError::json(&ty, "missing field 'key'"))?;

        Ok(Node {
            id: json_u64(&ty, json, "id")?,
            left: json_child(&ty, json, "left")?,
            right: json_child(&ty, json, "right")?,
            height: json_u64(&ty, json, "height")?,
            key: K::decode_json(key)?,
        })
    }

    fn stringify(&self, node: &Node<K>) -> String {
        format!(
            "node#{} {} (h={}, left={:?}, right={:?})",
            node.id,
            node.key.stringify(),
            node.height,
            node.left,
            node.right
        )
    }

    fn value_type(&self) -> String {
        format!("node[{}]", K::key_type())
    }
}
