use crate::codec::{CodecError, KeyCodec, ensure_len};
use serde_json::Value as JsonValue;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const TY: &str = "time";
const WIDTH: usize = 8;
const NANOS_PER_MILLI: i128 = 1_000_000;

// Unix milliseconds, flooring sub-millisecond precision.
fn unix_millis(value: &OffsetDateTime) -> Result<i64, CodecError> {
    let millis = value.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI);

    i64::try_from(millis).map_err(|err| CodecError::TimeOutOfRange {
        ty: TY.to_string(),
        message: err.to_string(),
    })
}

fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, CodecError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).map_err(
        |err| CodecError::TimeOutOfRange {
            ty: TY.to_string(),
            message: err.to_string(),
        },
    )
}

///
/// Time keys
///
/// 8-byte big-endian Unix milliseconds; decode yields UTC.
///

impl KeyCodec for OffsetDateTime {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, CodecError> {
        let millis = unix_millis(self)?;
        buf.extend_from_slice(&millis.cast_unsigned().to_be_bytes());

        Ok(WIDTH)
    }

    fn decode(buf: &[u8]) -> Result<(usize, Self), CodecError> {
        ensure_len(TY, buf, WIDTH)?;

        let mut bytes = [0u8; WIDTH];
        bytes.copy_from_slice(&buf[..WIDTH]);
        let millis = u64::from_be_bytes(bytes).cast_signed();

        Ok((WIDTH, from_unix_millis(millis)?))
    }

    fn size(&self) -> usize {
        WIDTH
    }

    fn encode_json(&self) -> Result<JsonValue, CodecError> {
        self.format(&Rfc3339)
            .map(JsonValue::String)
            .map_err(|err| CodecError::json(TY, err))
    }

    fn decode_json(json: &JsonValue) -> Result<Self, CodecError> {
        let text = json
            .as_str()
            .ok_or_else(|| CodecError::json(TY, format!("expected RFC 3339 string, got {json}")))?;

        Self::parse(text, &Rfc3339).map_err(|err| CodecError::json(TY, err))
    }

    fn stringify(&self) -> String {
        self.format(&Rfc3339)
            .unwrap_or_else(|_| format!("{}ms", self.unix_timestamp_nanos() / NANOS_PER_MILLI))
    }

    fn key_type() -> String {
        TY.to_string()
    }
}

///
/// TESTS
///
