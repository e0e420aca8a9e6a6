#![forbid(unsafe_code)]

//! Rewind public facade crate.
//!
//! Re-exports the history tracker from `rewind-core` and, with the default
//! `store` feature, the [`TemporalStore`] host from `rewind-store`, plus a
//! small prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use rewind_core::{
    ConfigError, History, PendingEvents, StateHost, Subscription, Temporal, TemporalChange,
    TemporalConfig, TemporalEvent, TemporalMachine, TemporalOptions, throttle,
};

#[cfg(feature = "store")]
pub use rewind_store::TemporalStore;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for rewind.
#[derive(Debug)]
pub enum Error {
    /// History configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "history config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for rewind APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Load a [`TemporalConfig`] from a TOML file.
#[cfg(feature = "config")]
pub fn load_config(path: impl AsRef<std::path::Path>) -> Result<TemporalConfig> {
    Ok(TemporalConfig::from_toml_file(path)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Result, StateHost, Temporal, TemporalChange, TemporalConfig, TemporalEvent,
        TemporalOptions,
    };

    #[cfg(feature = "store")]
    pub use crate::TemporalStore;

    pub use crate::core;
}

pub use rewind_core as core;
#[cfg(feature = "store")]
pub use rewind_store as store;

#[cfg(feature = "hamt")]
pub use rewind_core::persistent;
