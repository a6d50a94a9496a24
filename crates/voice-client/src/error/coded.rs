//! Construction of coded domain errors
//!
//! [`construct`] is the one place a numeric native error code turns into a
//! typed error. Settlement of rejected native operations and the error
//! payloads of unsolicited native events both go through it.

use std::fmt;

use serde_json::Value;

use super::codes::{ErrorCategory, ErrorCode};
use super::{VoiceError, VoiceResult};

/// Name carried by coded errors whose code is not in the table
pub const GENERIC_ERROR_NAME: &str = "GenericError";

/// A native failure identified by a numeric code
///
/// Known codes carry the fixed metadata of their [`ErrorCode`]; unknown
/// codes keep the numeric value and fall back to [`GENERIC_ERROR_NAME`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedError {
    code: u32,
    kind: Option<ErrorCode>,
    message: String,
}

impl CodedError {
    /// Numeric code, preserved verbatim for unknown codes
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Table entry for this code, `None` for the generic fallback
    pub fn kind(&self) -> Option<ErrorCode> {
        self.kind
    }

    /// Whether this error fell back to the generic kind
    pub fn is_generic(&self) -> bool {
        self.kind.is_none()
    }

    /// Message reported by the native layer
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn name(&self) -> &'static str {
        self.kind.map_or(GENERIC_ERROR_NAME, |kind| kind.name())
    }

    pub fn description(&self) -> &'static str {
        self.kind.map_or("Generic error", |kind| kind.description())
    }

    pub fn explanation(&self) -> &'static str {
        self.kind
            .map_or("An error with an unrecognized code was reported.", |kind| {
                kind.explanation()
            })
    }

    pub fn causes(&self) -> &'static [&'static str] {
        match self.kind {
            Some(kind) => kind.causes(),
            None => &[],
        }
    }

    pub fn solutions(&self) -> &'static [&'static str] {
        match self.kind {
            Some(kind) => kind.solutions(),
            None => &[],
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.kind.map(|kind| kind.category())
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code, self.message)
    }
}

impl std::error::Error for CodedError {}

/// Build the typed error for a native `(message, code)` pair
pub fn construct(message: impl Into<String>, code: u32) -> CodedError {
    CodedError {
        code,
        kind: ErrorCode::from_code(code),
        message: message.into(),
    }
}

/// Build a typed error from raw JSON values
///
/// Fails with [`VoiceError::InvalidArgument`] when `message` is not a string
/// or `code` is not a non-negative integer that fits in a `u32`.
///
/// For callers holding untyped `(message, code)` pairs of their own. Error
/// payloads inside native events are typed by the event decoder instead, so
/// a mistyped code there rejects the whole event as
/// [`VoiceError::EventContract`].
pub fn construct_checked(message: &Value, code: &Value) -> VoiceResult<CodedError> {
    let message = message
        .as_str()
        .ok_or_else(|| VoiceError::invalid_argument("error message must be a string"))?;
    let code = code
        .as_u64()
        .and_then(|code| u32::try_from(code).ok())
        .ok_or_else(|| VoiceError::invalid_argument("error code must be a number"))?;
    Ok(construct(message, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapped_code_builds_specific_kind() {
        let err = construct("token is bad", 20101);
        assert_eq!(err.code(), 20101);
        assert_eq!(err.kind(), Some(ErrorCode::AccessTokenInvalid));
        assert_eq!(err.name(), "AccessTokenInvalid");
        assert_eq!(err.message(), "token is bad");
        assert_eq!(err.description(), "Invalid access token");
    }

    #[test]
    fn test_unmapped_code_keeps_code_verbatim() {
        let err = construct("mystery", 99999);
        assert_eq!(err.code(), 99999);
        assert!(err.is_generic());
        assert_eq!(err.name(), GENERIC_ERROR_NAME);
        assert!(err.causes().is_empty());
        assert_eq!(err.category(), None);
    }

    #[test]
    fn test_metadata_does_not_depend_on_message() {
        let a = construct("first", 31486);
        let b = construct("second", 31486);
        assert_eq!(a.name(), b.name());
        assert_eq!(a.explanation(), b.explanation());
        assert_ne!(a.message(), b.message());
    }

    #[test]
    fn test_checked_construction_rejects_wrong_types() {
        let err = construct_checked(&json!(42), &json!(20101)).unwrap_err();
        assert!(matches!(err, VoiceError::InvalidArgument { .. }));

        let err = construct_checked(&json!("msg"), &json!("20101")).unwrap_err();
        assert!(matches!(err, VoiceError::InvalidArgument { .. }));

        let err = construct_checked(&json!("msg"), &json!(-1)).unwrap_err();
        assert!(matches!(err, VoiceError::InvalidArgument { .. }));

        let ok = construct_checked(&json!("msg"), &json!(31005)).unwrap();
        assert_eq!(ok.kind(), Some(ErrorCode::ConnectionError));
    }
}
