use crate::MAX_VALUE_BYTES;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Default key size limit, including the collection prefix.
pub const DEFAULT_MAX_KEY_BYTES: usize = 64 * 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config limit '{field}' must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error("config limit '{field}' is {value}, above the hard cap of {max}")]
    AboveHardCap {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

///
/// Config
///
/// Runtime configuration handed to every collection through the schema
/// builder. Loaded from TOML; every field has a default.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub limits: Limits,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()
    }
}

///
/// Limits
///
/// Size ceilings enforced on writes. `max_value_bytes` may not exceed
/// `MAX_VALUE_BYTES`, the bound applied when decoding CBOR values.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_key_bytes: usize,
    pub max_value_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_value_bytes: MAX_VALUE_BYTES,
        }
    }
}

impl Limits {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_key_bytes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_key_bytes",
            });
        }
        if self.max_value_bytes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_value_bytes",
            });
        }
        if self.max_value_bytes > MAX_VALUE_BYTES {
            return Err(ConfigError::AboveHardCap {
                field: "max_value_bytes",
                value: self.max_value_bytes,
                max: MAX_VALUE_BYTES,
            });
        }

        Ok(())
    }
}

///
/// TESTS
///
