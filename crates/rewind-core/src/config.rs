#![forbid(unsafe_code)]

//! History configuration as data.
//!
//! [`TemporalConfig`] carries the tunables of a tracker that make sense
//! outside of code, so they can be loaded from TOML or JSON at startup.
//! Closures (projection, equality, hooks) stay in
//! [`TemporalOptions`](crate::TemporalOptions); apply a loaded config with
//! [`TemporalOptions::with_config`](crate::TemporalOptions::with_config).
//!
//! # Loading
//!
//! ```toml
//! # rewind.toml
//! limit = 100
//! start_paused = false
//! ```
//!
//! ```rust,ignore
//! let config = TemporalConfig::from_toml_file("rewind.toml")?;
//! let options = TemporalOptions::<Doc>::new().with_config(&config);
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Data-only tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TemporalConfig {
    /// Maximum past length. `None` or `0` means unbounded.
    pub limit: Option<usize>,
    /// Whether the tracker starts with recording paused.
    pub start_paused: bool,
}

impl TemporalConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Serialize to a TOML document.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSerialize)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a history configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSerialize(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSerialize(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
