use common::ErrorLocation;

use rpc_core::error::CoreError;
use rpc_core::error::runtime::RuntimeError;
use rpc_core::error::transport::TransportError;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the shell.
///
/// These serialize for the UI surface, but structured error information and
/// location tracking are kept internally.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum GlintError {
    /// Error from the shell itself
    #[error("Glint Error: {message} {location}")]
    Glint {
        message: String,
        location: ErrorLocation,
    },

    /// Error from the RPC core (runtime, transports, config)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for GlintError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        GlintError::Core {
            message: error.to_string(),
            location: ErrorLocation::here(),
        }
    }
}

impl From<RuntimeError> for GlintError {
    #[track_caller]
    fn from(error: RuntimeError) -> Self {
        GlintError::Core {
            message: error.to_string(),
            location: ErrorLocation::here(),
        }
    }
}

impl From<TransportError> for GlintError {
    #[track_caller]
    fn from(error: TransportError) -> Self {
        GlintError::Core {
            message: error.to_string(),
            location: ErrorLocation::here(),
        }
    }
}
