//! Settlement of native result envelopes
//!
//! Every native operation resolves to one of three shapes:
//!
//! ```json
//! {"status": "ok", "value": ...}
//! {"status": "rejected-with-code", "code": 31486, "message": "..."}
//! {"status": "rejected-with-name", "name": "InvalidStateError", "message": "..."}
//! ```
//!
//! [`settle`] turns that into the unwrapped value or a [`VoiceError`].
//! Rejections are reported once and never retried here.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{NativeResult, NativeTransportError};
use crate::error::{construct, VoiceError, VoiceResult};

/// Name the native layer uses for argument rejections
pub const INVALID_ARGUMENT_ERROR_NAME: &str = "InvalidArgumentError";

/// Name the native layer uses for state rejections
pub const INVALID_STATE_ERROR_NAME: &str = "InvalidStateError";

/// Discriminated result of a native operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum NativeEnvelope<T> {
    Ok { value: T },
    RejectedWithCode { code: u32, message: String },
    RejectedWithName { name: String, message: String },
}

impl<T> NativeEnvelope<T> {
    /// Successful envelope
    pub fn ok(value: T) -> Self {
        Self::Ok { value }
    }

    /// Envelope rejected with a numeric error code
    pub fn rejected_with_code(code: u32, message: impl Into<String>) -> Self {
        Self::RejectedWithCode {
            code,
            message: message.into(),
        }
    }

    /// Envelope rejected with an error name
    pub fn rejected_with_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RejectedWithName {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unwrap the envelope into a value or a typed error
    pub fn into_result(self) -> VoiceResult<T> {
        match self {
            Self::Ok { value } => Ok(value),
            Self::RejectedWithCode { code, message } => Err(construct(message, code).into()),
            Self::RejectedWithName { name, message } => Err(named_error(&name, message)),
        }
    }
}

fn named_error(name: &str, message: String) -> VoiceError {
    match name {
        INVALID_ARGUMENT_ERROR_NAME => VoiceError::InvalidArgument { message },
        INVALID_STATE_ERROR_NAME => VoiceError::InvalidState { message },
        _ => VoiceError::UnexpectedNative { message },
    }
}

/// Await a native operation and settle its envelope
///
/// A transport failure of the bridge is passed through unchanged as
/// [`VoiceError::Transport`].
pub async fn settle<T, F>(operation: F) -> VoiceResult<T>
where
    F: Future<Output = NativeResult<T>>,
{
    let envelope = operation.await.map_err(|e: NativeTransportError| {
        debug!("Native operation failed in transport: {}", e);
        VoiceError::Transport(e)
    })?;

    envelope.into_result().inspect_err(|e| {
        debug!("Native operation rejected: {}", e);
    })
}
