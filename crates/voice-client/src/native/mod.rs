//! Boundary to the native voice transport
//!
//! The native layer performs the actual signaling and media work. This crate
//! only sees it through two channels:
//!
//! - **Requests** - the [`NativeBridge`] trait, one async method per native
//!   operation, each resolving to a [`NativeEnvelope`]
//! - **Events** - JSON payloads published on the
//!   [`NativeEventBus`](crate::bus::NativeEventBus), decoded by the types in
//!   [`events`]
//!
//! ```text
//! ┌─────────────────────────┐
//! │ Call / CallInvite / ... │
//! └───────┬─────────▲───────┘
//!   requests        │ events
//! ┌───────▼─────────┴───────┐
//! │      NativeBridge       │ ◄── implemented by the platform binding
//! └─────────────────────────┘
//! ```

pub mod envelope;
pub mod events;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::call::feedback::{FeedbackIssue, FeedbackScore};

pub use envelope::{settle, NativeEnvelope};
pub use types::{
    NativeCallInfo, NativeCallInviteInfo, NativeCancelledCallInviteInfo, NativeErrorInfo,
};

/// Failure of the bridge itself, before any result envelope was produced
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Native transport error: {message}")]
pub struct NativeTransportError {
    pub message: String,
}

impl NativeTransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raw outcome of a native operation
pub type NativeResult<T> = Result<NativeEnvelope<T>, NativeTransportError>;

/// Request side of the native voice transport
///
/// Implementations forward each call to the platform SDK and report the
/// outcome as a [`NativeEnvelope`]. A structured rejection belongs in the
/// envelope; `Err` is reserved for failures of the bridge itself.
#[async_trait]
pub trait NativeBridge: Send + Sync {
    /// Place an outgoing call
    async fn voice_connect(
        &self,
        access_token: &str,
        params: &HashMap<String, String>,
        contact_handle: &str,
    ) -> NativeResult<NativeCallInfo>;

    /// Register this device for incoming call invites
    async fn voice_register(&self, access_token: &str) -> NativeResult<()>;

    /// Stop receiving incoming call invites
    async fn voice_unregister(&self, access_token: &str) -> NativeResult<()>;

    /// Version of the native SDK
    async fn voice_get_version(&self) -> NativeResult<String>;

    /// Push device token used for registration
    async fn voice_get_device_token(&self) -> NativeResult<String>;

    /// Calls currently known to the native layer
    async fn voice_get_calls(&self) -> NativeResult<Vec<NativeCallInfo>>;

    /// Call invites currently pending in the native layer
    async fn voice_get_call_invites(&self) -> NativeResult<Vec<NativeCallInviteInfo>>;

    async fn call_disconnect(&self, call_uuid: &str) -> NativeResult<()>;

    /// Returns the hold state after the operation
    async fn call_hold(&self, call_uuid: &str, hold: bool) -> NativeResult<bool>;

    /// Returns the mute state after the operation
    async fn call_mute(&self, call_uuid: &str, mute: bool) -> NativeResult<bool>;

    async fn call_send_digits(&self, call_uuid: &str, digits: &str) -> NativeResult<()>;

    /// Returns the correlation id (`voiceEventSid`) assigned to the message
    async fn call_send_message(
        &self,
        call_uuid: &str,
        content: &str,
        content_type: &str,
        message_type: &str,
    ) -> NativeResult<String>;

    async fn call_post_feedback(
        &self,
        call_uuid: &str,
        score: FeedbackScore,
        issue: FeedbackIssue,
    ) -> NativeResult<()>;

    /// Returns the data of the call created by accepting
    async fn call_invite_accept(
        &self,
        invite_uuid: &str,
        params: &HashMap<String, String>,
    ) -> NativeResult<NativeCallInfo>;

    async fn call_invite_reject(&self, invite_uuid: &str) -> NativeResult<()>;

    async fn call_invite_is_valid(&self, invite_uuid: &str) -> NativeResult<bool>;
}
