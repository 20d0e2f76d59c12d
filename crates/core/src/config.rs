//! Decoder limits and printer settings
//!
//! Declared lengths in a foreign buffer are bounded here before anything is
//! allocated for them. All fields are optional in TOML:
//!
//! ```toml
//! [limits]
//! max_depth = 32
//! max_elements = 65536
//! max_text_len = 1048576
//!
//! [print]
//! indent = 4
//! ```

use crate::error::ConfigError;
use crate::printer::PrintConfig;
use serde::Deserialize;
use std::path::Path;

/// Upper bounds applied while validating a wire buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum container nesting (0 rejects every Array/Table)
    pub max_depth: usize,
    /// Maximum declared Array length or Table entry count
    pub max_elements: u32,
    /// Maximum declared Text length in bytes
    pub max_text_len: u32,
}

impl DecodeLimits {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_ELEMENTS: u32 = 1 << 20;
    pub const DEFAULT_MAX_TEXT_LEN: u32 = 16 * 1024 * 1024;
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_elements: Self::DEFAULT_MAX_ELEMENTS,
            max_text_len: Self::DEFAULT_MAX_TEXT_LEN,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: DecodeLimits,
    pub print: PrintConfig,
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
