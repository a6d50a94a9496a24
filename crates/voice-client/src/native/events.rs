//! Closed sets of native events, one enum per scope
//!
//! Each enum is internally tagged by the payload's `type` field. The wire
//! names are camelCase (`connectFailure`, `qualityWarningsChanged`, ...).
//! Decoding goes through the [gate](crate::gate), which first checks the
//! correlation id and then the type against [`ScopedEvent::TYPES`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{
    NativeCallInfo, NativeCallInviteInfo, NativeCancelledCallInviteInfo, NativeErrorInfo,
};
use crate::bus::Scope;
use crate::call::QualityWarning;

/// An event set bound to one scope
pub trait ScopedEvent: serde::de::DeserializeOwned {
    /// Scope the events are published on
    const SCOPE: Scope;

    /// Wire names of every event type in the set
    const TYPES: &'static [&'static str];
}

/// An event set whose payloads name the entity instance they target
pub trait CorrelatedEvent: ScopedEvent {
    /// Read the correlation id out of a raw payload
    fn correlation_id(payload: &Value) -> Option<&str>;
}

/// `type` field of a raw payload
pub fn event_type(payload: &Value) -> Option<&str> {
    payload.get("type").and_then(Value::as_str)
}

/// Events on the `call` scope; correlated by `call.uuid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NativeCallEvent {
    Connected {
        call: NativeCallInfo,
    },
    ConnectFailure {
        call: NativeCallInfo,
        error: NativeErrorInfo,
    },
    Disconnected {
        call: NativeCallInfo,
        #[serde(default)]
        error: Option<NativeErrorInfo>,
    },
    Reconnecting {
        call: NativeCallInfo,
        error: NativeErrorInfo,
    },
    Reconnected {
        call: NativeCallInfo,
    },
    Ringing {
        call: NativeCallInfo,
    },
    #[serde(rename_all = "camelCase")]
    QualityWarningsChanged {
        call: NativeCallInfo,
        current_warnings: Vec<QualityWarning>,
        previous_warnings: Vec<QualityWarning>,
    },
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        call: NativeCallInfo,
        call_message: Value,
    },
}

impl NativeCallEvent {
    /// Call data carried by every call event
    pub fn call(&self) -> &NativeCallInfo {
        match self {
            Self::Connected { call }
            | Self::ConnectFailure { call, .. }
            | Self::Disconnected { call, .. }
            | Self::Reconnecting { call, .. }
            | Self::Reconnected { call }
            | Self::Ringing { call }
            | Self::QualityWarningsChanged { call, .. }
            | Self::MessageReceived { call, .. } => call,
        }
    }
}

impl ScopedEvent for NativeCallEvent {
    const SCOPE: Scope = Scope::Call;
    const TYPES: &'static [&'static str] = &[
        "connected",
        "connectFailure",
        "disconnected",
        "reconnecting",
        "reconnected",
        "ringing",
        "qualityWarningsChanged",
        "messageReceived",
    ];
}

impl CorrelatedEvent for NativeCallEvent {
    fn correlation_id(payload: &Value) -> Option<&str> {
        payload.get("call")?.get("uuid")?.as_str()
    }
}

/// Events on the `call-invite` scope; correlated by top-level `uuid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NativeCallInviteEvent {
    /// Accepted outside the application, e.g. from the system call UI
    Accepted {
        uuid: String,
        call: NativeCallInfo,
    },
    /// Rejected outside the application
    Rejected {
        uuid: String,
    },
    #[serde(rename_all = "camelCase")]
    Cancelled {
        uuid: String,
        cancelled_call_invite: NativeCancelledCallInviteInfo,
        #[serde(default)]
        error: Option<NativeErrorInfo>,
    },
    NotificationTapped {
        uuid: String,
    },
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        uuid: String,
        call_message: Value,
    },
}

impl ScopedEvent for NativeCallInviteEvent {
    const SCOPE: Scope = Scope::CallInvite;
    const TYPES: &'static [&'static str] = &[
        "accepted",
        "rejected",
        "cancelled",
        "notificationTapped",
        "messageReceived",
    ];
}

impl CorrelatedEvent for NativeCallInviteEvent {
    fn correlation_id(payload: &Value) -> Option<&str> {
        payload.get("uuid")?.as_str()
    }
}

/// Events on the `call-message` scope; correlated by `voiceEventSid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NativeCallMessageEvent {
    #[serde(rename_all = "camelCase")]
    Sent { voice_event_sid: String },
    #[serde(rename_all = "camelCase")]
    Failure {
        voice_event_sid: String,
        error: NativeErrorInfo,
    },
}

impl ScopedEvent for NativeCallMessageEvent {
    const SCOPE: Scope = Scope::CallMessage;
    const TYPES: &'static [&'static str] = &["sent", "failure"];
}

impl CorrelatedEvent for NativeCallMessageEvent {
    fn correlation_id(payload: &Value) -> Option<&str> {
        payload.get("voiceEventSid")?.as_str()
    }
}

/// Events on the `voice` scope; not correlated, the session manager is the
/// only listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NativeVoiceEvent {
    #[serde(rename_all = "camelCase")]
    CallInvite { call_invite: NativeCallInviteInfo },
    Error { error: NativeErrorInfo },
    Registered,
    Unregistered,
}

impl ScopedEvent for NativeVoiceEvent {
    const SCOPE: Scope = Scope::Voice;
    const TYPES: &'static [&'static str] = &["callInvite", "error", "registered", "unregistered"];
}
