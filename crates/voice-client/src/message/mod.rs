//! Call messages
//!
//! A [`CallMessage`] is an in-call, application-defined payload exchanged
//! with the remote party. Content may be any serializable value; it is
//! turned into its wire form once, when the message is sent:
//!
//! - a JSON string is sent verbatim
//! - anything else is sent as its JSON text
//!
//! Outgoing messages are tracked by an [`OutgoingCallMessage`] until the
//! native layer reports delivery or failure.
//!
//! # Examples
//!
//! ```rust
//! use rvoip_voice_client::message::{CallMessage, DEFAULT_CONTENT_TYPE};
//! use serde_json::json;
//!
//! let message = CallMessage::new(json!({"ping": 1}), "user-defined-message").unwrap();
//! assert_eq!(message.content_type(), DEFAULT_CONTENT_TYPE);
//! assert_eq!(message.wire_content(), r#"{"ping":1}"#);
//!
//! let text = CallMessage::new("hello", "user-defined-message").unwrap()
//!     .with_content_type("text/plain");
//! assert_eq!(text.wire_content(), "hello");
//! ```

pub mod outgoing;

use serde::Serialize;
use serde_json::Value;

use crate::error::{VoiceError, VoiceResult};

pub use outgoing::{OutgoingCallMessage, OutgoingCallMessageEvent, OutgoingCallMessageStatus};

/// Content type used when none is given
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// An in-call message
#[derive(Debug, Clone, PartialEq)]
pub struct CallMessage {
    content: Value,
    content_type: String,
    message_type: String,
    voice_event_sid: Option<String>,
}

impl CallMessage {
    /// Create a message with the default content type
    ///
    /// Fails with [`VoiceError::InvalidArgument`] if `content` serializes to
    /// `null`.
    pub fn new<C: Serialize>(content: C, message_type: impl Into<String>) -> VoiceResult<Self> {
        let content = serde_json::to_value(content)?;
        if content.is_null() {
            return Err(VoiceError::invalid_argument("call message content must not be null"));
        }
        Ok(Self {
            content,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            message_type: message_type.into(),
            voice_event_sid: None,
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Validate a message received from the native layer
    ///
    /// `contentType` may be absent (or `null`), in which case the default
    /// applies; if present it must be a string.
    pub fn from_native(raw: &Value) -> VoiceResult<Self> {
        let content = match raw.get("content") {
            Some(content) if !content.is_null() => content.clone(),
            _ => {
                return Err(VoiceError::invalid_argument(
                    "call message content must be present and not null",
                ));
            }
        };

        let content_type = match raw.get("contentType") {
            None | Some(Value::Null) => DEFAULT_CONTENT_TYPE.to_string(),
            Some(Value::String(content_type)) => content_type.clone(),
            Some(other) => {
                return Err(VoiceError::invalid_argument(format!(
                    "call message content type must be a string, got {}",
                    other
                )));
            }
        };

        let Some(message_type) = raw.get("messageType").and_then(Value::as_str) else {
            return Err(VoiceError::invalid_argument("call message type must be a string"));
        };

        let voice_event_sid = raw
            .get("voiceEventSid")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            content,
            content_type,
            message_type: message_type.to_string(),
            voice_event_sid,
        })
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Correlation id assigned by the native layer, once known
    pub fn sid(&self) -> Option<&str> {
        self.voice_event_sid.as_deref()
    }

    /// Content as it goes over the wire
    pub fn wire_content(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.voice_event_sid = Some(sid.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_content_is_rejected() {
        let err = CallMessage::new(Value::Null, "user-defined-message").unwrap_err();
        assert!(matches!(err, VoiceError::InvalidArgument { .. }));
        let err = CallMessage::new(Option::<String>::None, "user-defined-message").unwrap_err();
        assert!(matches!(err, VoiceError::InvalidArgument { .. }));
    }

    #[test]
    fn test_from_native_defaults_content_type() {
        let message = CallMessage::from_native(&json!({
            "content": {"a": 1},
            "messageType": "user-defined-message",
            "voiceEventSid": "KX1",
        }))
        .unwrap();
        assert_eq!(message.content_type(), "application/json");
        assert_eq!(message.sid(), Some("KX1"));
        assert_eq!(message.content(), &json!({"a": 1}));
    }

    #[test]
    fn test_from_native_validation() {
        let missing_content = json!({"messageType": "user-defined-message"});
        let null_content = json!({"content": null, "messageType": "user-defined-message"});
        let bad_content_type = json!({"content": "x", "contentType": 7, "messageType": "m"});
        let bad_message_type = json!({"content": "x", "messageType": 7});
        for raw in [missing_content, null_content, bad_content_type, bad_message_type] {
            assert!(
                matches!(CallMessage::from_native(&raw), Err(VoiceError::InvalidArgument { .. })),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_wire_content() {
        let text = CallMessage::new("already text", "m").unwrap();
        assert_eq!(text.wire_content(), "already text");
        let number = CallMessage::new(42, "m").unwrap();
        assert_eq!(number.wire_content(), "42");
        let list = CallMessage::new(vec!["a", "b"], "m").unwrap();
        assert_eq!(list.wire_content(), r#"["a","b"]"#);
    }
}
