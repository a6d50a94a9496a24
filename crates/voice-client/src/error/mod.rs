//! Error types for the voice client library
//!
//! Every failure surfaced by this crate is a [`VoiceError`]. The variants
//! follow four families:
//!
//! - **Argument errors** - raised locally, before any native call, for
//!   malformed inputs ([`VoiceError::InvalidArgument`])
//! - **State errors** - raised locally when an operation is attempted from a
//!   state that forbids it ([`VoiceError::InvalidState`])
//! - **Coded domain errors** - native failures keyed by a numeric code
//!   ([`VoiceError::Coded`], see [`CodedError`])
//! - **Unexpected native errors** - named native failures this layer does
//!   not recognize ([`VoiceError::UnexpectedNative`])
//!
//! Transport-level failures of the native bridge itself pass through
//! unchanged as [`VoiceError::Transport`].

pub mod codes;
pub mod coded;

use thiserror::Error;

use crate::native::NativeTransportError;

pub use codes::{ErrorCategory, ErrorCode};
pub use coded::{construct, construct_checked, CodedError, GENERIC_ERROR_NAME};

/// Result type for voice client operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors that can occur in the voice client
#[derive(Debug, Error)]
pub enum VoiceError {
    /// Malformed input rejected before reaching the native layer
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Operation attempted from a state that forbids it
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Native failure carrying a numeric error code
    #[error(transparent)]
    Coded(#[from] CodedError),

    /// Named native failure this layer does not recognize
    #[error("Unexpected native error: {message}")]
    UnexpectedNative { message: String },

    /// The native bridge failed without producing a result envelope
    #[error(transparent)]
    Transport(#[from] NativeTransportError),

    /// The native layer delivered an event that breaks the event contract
    #[error("Native event contract violation: {message}")]
    EventContract { message: String },

    /// Payload (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl VoiceError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an unexpected native error
    pub fn unexpected_native(message: impl Into<String>) -> Self {
        Self::UnexpectedNative {
            message: message.into(),
        }
    }

    /// Create an event contract violation
    pub fn event_contract(message: impl Into<String>) -> Self {
        Self::EventContract {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The coded error behind this failure, if there is one
    pub fn as_coded(&self) -> Option<&CodedError> {
        match self {
            Self::Coded(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this error was raised locally before any native call
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::InvalidState { .. })
    }
}

impl From<std::convert::Infallible> for VoiceError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
