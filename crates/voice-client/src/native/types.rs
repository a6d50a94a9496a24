//! Wire shapes of entity data reported by the native layer

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::call::CallState;
use crate::error::{construct, CodedError};

/// Call data as reported by the native layer
///
/// Only `uuid` is guaranteed; everything else may be absent until the call
/// progresses far enough for the native layer to know it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCallInfo {
    pub uuid: String,
    /// State the native layer last reported, if any
    #[serde(default)]
    pub state: Option<CallState>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub is_muted: Option<bool>,
    #[serde(default)]
    pub is_on_hold: Option<bool>,
    /// Milliseconds since the Unix epoch; fractional values are truncated
    #[serde(
        default,
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize",
        deserialize_with = "epoch_millis_option"
    )]
    pub initial_connected_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_parameters: HashMap<String, String>,
}

impl NativeCallInfo {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }
}

/// Read an optional epoch-millis timestamp sent as any JSON number
fn epoch_millis_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(millis) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !millis.is_finite() {
        return Err(D::Error::custom("timestamp must be a finite number"));
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("timestamp {} out of range", millis)))
}

/// Call invite data as reported by the native layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCallInviteInfo {
    pub uuid: String,
    pub call_sid: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub custom_parameters: HashMap<String, String>,
}

/// Data of an invite the caller withdrew
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCancelledCallInviteInfo {
    pub call_sid: String,
    pub from: String,
    pub to: String,
}

/// Error payload attached to unsolicited native events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeErrorInfo {
    pub code: u32,
    pub message: String,
}

impl NativeErrorInfo {
    /// Turn the payload into a typed error
    pub fn into_coded(self) -> CodedError {
        construct(self.message, self.code)
    }
}
