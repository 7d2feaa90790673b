use crate::codec::{CodecError, KeyCodec, MAX_NON_TERMINAL_BYTES, ensure_len, hex};
use serde_json::Value as JsonValue;

const DELIMITER: u8 = 0x00;

///
/// Bytes keys
///
/// Terminal: raw bytes, length implied by the buffer.
/// Non-terminal: one length byte followed by the raw bytes.
///

impl KeyCodec for Vec<u8> {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        buf.extend_from_slice(self);
        Ok(self.len())
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        Ok((buf.len(), buf.to_vec()))
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn encode_non_terminal(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        let len = u8::try_from(self.len()).map_err(|_| CodecError::NonTerminalTooLong {
            ty: Self::key_type(),
            len: self.len(),
            max: MAX_NON_TERMINAL_BYTES,
        })?;

        buf.push(len);
        buf.extend_from_slice(self);

        Ok(1 + self.len())
    }

    fn decode_non_terminal(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        ensure_len("bytes", buf, 1)?;

        let len = usize::from(buf[0]);
        ensure_len("bytes", buf, 1 + len)?;

        Ok((1 + len, buf[1..=len].to_vec()))
    }

    fn size_non_terminal(&self) -> usize {
        1 + self.len()
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        Ok(JsonValue::String(hex::encode(self)))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        let text = json
            .as_str()
            .ok_or_else(|| CodecError::json("bytes", format!("expected hex string, got {json}")))?;

        hex::decode(text).map_err(|message| CodecError::json("bytes", message))
    }

    fn stringify(&self) -> String {
        hex::encode(self)
    }

    fn key_type() -> String {
        "bytes".to_string()
    }
}

///
/// String keys
///
/// Terminal: raw UTF-8.
/// Non-terminal: raw UTF-8 followed by a single 0x00 delimiter; the string
/// itself must not contain 0x00.
///

impl KeyCodec for String {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        buf.extend_from_slice(self.as_bytes());
        Ok(self.len())
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        let text = std::str::from_utf8(buf).map_err(|_| CodecError::InvalidUtf8 {
            ty: Self::key_type(),
        })?;

        Ok((buf.len(), text.to_string()))
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn encode_non_terminal(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        if self.as_bytes().contains(&DELIMITER) {
            return Err(CodecError::ContainsDelimiter {
                ty: Self::key_type(),
            });
        }

        buf.extend_from_slice(self.as_bytes());
        buf.push(DELIMITER);

        Ok(self.len() + 1)
    }

    fn decode_non_terminal(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        let end = buf
            .iter()
            .position(|&byte| byte == DELIMITER)
            .ok_or_else(|| CodecError::MissingDelimiter {
                ty: Self::key_type(),
            })?;

        let (_, text) = Self::decode(&buf[..end])?;

        Ok((end + 1, text))
    }

    fn size_non_terminal(&self) -> usize {
        self.len() + 1
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        Ok(JsonValue::String(self.clone()))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        json.as_str()
            .map(ToString::to_string)
            .ok_or_else(|| CodecError::json("string", format!("expected string, got {json}")))
    }

    fn stringify(&self) -> String {
        self.clone()
    }

    fn key_type() -> String {
        "string".to_string()
    }
}
