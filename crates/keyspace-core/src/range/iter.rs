use crate::{
    codec::{KeyCodec, ValueCodec, decode_key_exact},
    error::InternalError,
    store::RawCursor,
};
use std::marker::PhantomData;

///
/// Iter
///
/// Typed iterator over one collection's key space.
///
/// Raw keys have the collection prefix stripped and must decode with no
/// bytes left over; anything else is an encoding error. Dropping the
/// iterator closes the underlying store cursor.
///

pub struct Iter<'a, K, VC> {
    cursor: RawCursor<'a>,
    prefix_len: usize,
    value_codec: &'a VC,
    _key: PhantomData<fn() -> K>,
}

impl<'a, K, VC> Iter<'a, K, VC>
where
    K: KeyCodec,
    VC: ValueCodec,
{
    pub(crate) fn new(cursor: RawCursor<'a>, prefix_len: usize, value_codec: &'a VC) -> Self {
        Self {
            cursor,
            prefix_len,
            value_codec,
            _key: PhantomData,
        }
    }

    /// Drain the remaining keys, skipping value decoding.
    pub fn keys(self) -> Result<Vec<K>, InternalError> {
        self.into_keys().collect()
    }

    /// Drain the remaining values.
    pub fn values(self) -> Result<Vec<VC::Value>, InternalError> {
        self.map(|entry| entry.map(|(_, value)| value)).collect()
    }

    /// Drain the remaining entries.
    pub fn key_values(self) -> Result<Vec<(K, VC::Value)>, InternalError> {
        self.collect()
    }

    /// Convert into a key-only iterator.
    #[must_use]
    pub const fn into_keys(self) -> Keys<'a, K, VC> {
        Keys { inner: self }
    }

    fn decode_key(&self, raw_key: &[u8]) -> Result<K, InternalError> {
        let Some(suffix) = raw_key.get(self.prefix_len..) else {
            return Err(InternalError::collection_encoding(format!(
                "raw key of {} bytes is shorter than the collection prefix ({} bytes)",
                raw_key.len(),
                self.prefix_len
            )));
        };

        Ok(decode_key_exact(suffix)?)
    }

    fn decode_entry(
        &self,
        raw_key: &[u8],
        raw_value: &[u8],
    ) -> Result<(K, VC::Value), InternalError> {
        let key = self.decode_key(raw_key)?;
        let value = self.value_codec.decode(raw_value)?;

        Ok((key, value))
    }
}

impl<K, VC> Iterator for Iter<'_, K, VC>
where
    K: KeyCodec,
    VC: ValueCodec,
{
    type Item = Result<(K, VC::Value), InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (raw_key, raw_value) = self.cursor.next()?;

        Some(self.decode_entry(&raw_key, &raw_value))
    }
}

///
/// Keys
///
/// Key-only view of an [`Iter`]; values are never decoded.
///

pub struct Keys<'a, K, VC> {
    inner: Iter<'a, K, VC>,
}

impl<K, VC> Iterator for Keys<'_, K, VC>
where
    K: KeyCodec,
    VC: ValueCodec,
{
    type Item = Result<K, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (raw_key, _) = self.inner.cursor.next()?;

        Some(self.inner.decode_key(&raw_key))
    }
}
