use derive_more::Deref;
use std::fmt;

///
/// Prefix
///
/// Immutable byte namespace owned by one registered collection.
///

#[derive(Clone, Debug, Default, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Prefix(Vec<u8>);

impl Prefix {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Child namespace `self ++ [suffix]`, used by composite collections.
    #[must_use]
    pub fn child(&self, suffix: u8) -> Self {
        let mut bytes = Vec::with_capacity(self.0.len() + 1);
        bytes.extend_from_slice(&self.0);
        bytes.push(suffix);

        Self(bytes)
    }

    /// Raw store key for an already-encoded collection key.
    #[must_use]
    pub fn key(&self, encoded: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() + encoded.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(encoded);

        bytes
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl From<u8> for Prefix {
    fn from(byte: u8) -> Self {
        Self(vec![byte])
    }
}

impl From<&str> for Prefix {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Prefix {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Prefix {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Prefix {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
