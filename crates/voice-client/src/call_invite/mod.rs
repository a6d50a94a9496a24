//! Incoming call invites
//!
//! A [`CallInvite`] starts `Pending` and settles exactly once:
//!
//! | from      | trigger                                  | to          |
//! |-----------|------------------------------------------|-------------|
//! | `Pending` | [`CallInvite::accept`] / `accepted` event | `Accepted`  |
//! | `Pending` | [`CallInvite::reject`] / `rejected` event | `Rejected`  |
//! | `Pending` | `cancelled` event                         | `Cancelled` |
//!
//! Every other state is terminal. Accepting or rejecting a settled invite
//! fails with [`VoiceError::InvalidState`] before anything reaches the
//! native layer.
//!
//! Events reach only receivers subscribed before they are emitted;
//! [`CallInvite::watch_state`] always starts at the current state.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::bus::Subscription;
use crate::call::Call;
use crate::context::SessionContext;
use crate::emitter::{EventEmitter, EventStream};
use crate::error::{CodedError, VoiceError, VoiceResult};
use crate::gate::{self, GatedEntity};
use crate::message::CallMessage;
use crate::native::events::NativeCallInviteEvent;
use crate::native::{
    settle, NativeCallInviteInfo, NativeCancelledCallInviteInfo, NativeErrorInfo,
};

/// Settlement state of a call invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallInviteState {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl CallInviteState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallInviteState::Pending)
    }
}

impl fmt::Display for CallInviteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallInviteState::Pending => "pending",
            CallInviteState::Accepted => "accepted",
            CallInviteState::Rejected => "rejected",
            CallInviteState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// An invite the caller withdrew before it was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledCallInvite {
    call_sid: String,
    from: String,
    to: String,
}

impl CancelledCallInvite {
    pub fn call_sid(&self) -> &str {
        &self.call_sid
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}

impl From<NativeCancelledCallInviteInfo> for CancelledCallInvite {
    fn from(info: NativeCancelledCallInviteInfo) -> Self {
        Self {
            call_sid: info.call_sid,
            from: info.from,
            to: info.to,
        }
    }
}

/// Options for [`CallInvite::accept`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInviteAcceptOptions {
    /// Parameters passed to the native layer with the accept request
    pub params: HashMap<String, String>,
}

impl CallInviteAcceptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Events emitted by a call invite
#[derive(Debug, Clone)]
pub enum CallInviteEvent {
    /// Invite accepted outside the application; carries the resulting call
    Accepted(Call),
    /// Invite rejected outside the application
    Rejected,
    /// Caller withdrew the invite
    Cancelled {
        cancelled: CancelledCallInvite,
        error: Option<CodedError>,
    },
    /// User tapped the incoming call notification
    NotificationTapped,
    MessageReceived(CallMessage),
}

/// Handle to an incoming call invite
#[derive(Clone)]
pub struct CallInvite {
    inner: Arc<CallInviteInner>,
}

pub(crate) struct CallInviteInner {
    uuid: String,
    call_sid: String,
    from: String,
    to: String,
    custom_parameters: HashMap<String, String>,
    ctx: Arc<SessionContext>,
    state: watch::Sender<CallInviteState>,
    events: EventEmitter<CallInviteEvent>,
    subscription: Mutex<Option<Subscription>>,
}

impl CallInvite {
    /// Handle for the invite described by `info`, reusing a live instance
    pub(crate) fn obtain(ctx: &Arc<SessionContext>, info: NativeCallInviteInfo) -> Self {
        if let Some(inner) = ctx.registry.live_call_invite(&info.uuid) {
            return Self { inner };
        }

        let (state, _) = watch::channel(CallInviteState::Pending);
        let inner = Arc::new_cyclic(|weak: &Weak<CallInviteInner>| CallInviteInner {
            uuid: info.uuid,
            call_sid: info.call_sid,
            from: info.from,
            to: info.to,
            custom_parameters: info.custom_parameters,
            ctx: ctx.clone(),
            state,
            events: EventEmitter::new(ctx.config.event_capacity),
            subscription: Mutex::new(Some(gate::attach(&ctx.bus, weak.clone()))),
        });
        ctx.registry
            .insert_call_invite(&inner.uuid, Arc::downgrade(&inner));
        info!("Created call invite {} for call {}", inner.uuid, inner.call_sid);

        Self { inner }
    }

    pub fn uuid(&self) -> &str {
        &self.inner.uuid
    }

    pub fn call_sid(&self) -> &str {
        &self.inner.call_sid
    }

    pub fn from(&self) -> &str {
        &self.inner.from
    }

    pub fn to(&self) -> &str {
        &self.inner.to
    }

    pub fn custom_parameters(&self) -> &HashMap<String, String> {
        &self.inner.custom_parameters
    }

    pub fn state(&self) -> CallInviteState {
        *self.inner.state.borrow()
    }

    /// Watch the settlement state; the receiver starts at the current state
    pub fn watch_state(&self) -> watch::Receiver<CallInviteState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to invite events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CallInviteEvent> {
        self.inner.events.subscribe()
    }

    pub fn event_stream(&self) -> EventStream<CallInviteEvent> {
        self.inner.events.stream()
    }

    /// Stop listening for native events
    pub fn dispose(&self) {
        if self.inner.subscription.lock().take().is_some() {
            debug!("Disposed call invite {}", self.inner.uuid);
        }
    }

    /// Answer the invite
    ///
    /// On success the invite is `Accepted` and the resulting call is
    /// returned. A native rejection leaves the invite `Pending`.
    pub async fn accept(&self, options: CallInviteAcceptOptions) -> VoiceResult<Call> {
        self.inner.ensure_pending("accept")?;
        info!("Accepting call invite {}", self.inner.uuid);

        let info = settle(
            self.inner
                .ctx
                .bridge
                .call_invite_accept(&self.inner.uuid, &options.params),
        )
        .await?;
        let call = Call::obtain(&self.inner.ctx, info);
        self.inner.set_state(CallInviteState::Accepted);
        Ok(call)
    }

    /// Decline the invite
    pub async fn reject(&self) -> VoiceResult<()> {
        self.inner.ensure_pending("reject")?;
        info!("Rejecting call invite {}", self.inner.uuid);

        settle(self.inner.ctx.bridge.call_invite_reject(&self.inner.uuid)).await?;
        self.inner.set_state(CallInviteState::Rejected);
        Ok(())
    }

    /// Whether the native layer still considers the invite answerable
    pub async fn is_valid(&self) -> VoiceResult<bool> {
        settle(self.inner.ctx.bridge.call_invite_is_valid(&self.inner.uuid)).await
    }
}

impl CallInviteInner {
    fn ensure_pending(&self, operation: &str) -> VoiceResult<()> {
        let state = *self.state.borrow();
        if state.is_terminal() {
            return Err(VoiceError::invalid_state(format!(
                "cannot {} call invite {}: already {}",
                operation, self.uuid, state
            )));
        }
        Ok(())
    }

    fn set_state(&self, next: CallInviteState) {
        let previous = self.state.send_replace(next);
        debug!("Call invite {} state {} -> {}", self.uuid, previous, next);
    }

    /// Settle from `Pending` on behalf of the native layer
    ///
    /// Returns `false`, leaving state untouched, if the invite was already
    /// settled.
    fn settle_unsolicited(&self, next: CallInviteState) -> bool {
        let mut previous = next;
        let settled = self.state.send_if_modified(|state| {
            previous = *state;
            if state.is_terminal() {
                return false;
            }
            *state = next;
            true
        });
        if settled {
            debug!("Call invite {} state pending -> {}", self.uuid, next);
        } else {
            debug!(
                "Call invite {} already {}, ignoring native {}",
                self.uuid, previous, next
            );
        }
        settled
    }
}

impl GatedEntity for CallInviteInner {
    type Event = NativeCallInviteEvent;

    fn correlation_id(&self) -> &str {
        &self.uuid
    }

    fn handle_event(&self, event: NativeCallInviteEvent) -> VoiceResult<()> {
        let app_event = match event {
            NativeCallInviteEvent::Accepted { call, .. } => {
                if !self.settle_unsolicited(CallInviteState::Accepted) {
                    return Ok(());
                }
                CallInviteEvent::Accepted(Call::obtain(&self.ctx, call))
            }
            NativeCallInviteEvent::Rejected { .. } => {
                if !self.settle_unsolicited(CallInviteState::Rejected) {
                    return Ok(());
                }
                CallInviteEvent::Rejected
            }
            NativeCallInviteEvent::Cancelled {
                cancelled_call_invite,
                error,
                ..
            } => {
                if !self.settle_unsolicited(CallInviteState::Cancelled) {
                    return Ok(());
                }
                CallInviteEvent::Cancelled {
                    cancelled: cancelled_call_invite.into(),
                    error: error.map(NativeErrorInfo::into_coded),
                }
            }
            NativeCallInviteEvent::NotificationTapped { .. } => CallInviteEvent::NotificationTapped,
            NativeCallInviteEvent::MessageReceived { call_message, .. } => {
                CallInviteEvent::MessageReceived(CallMessage::from_native(&call_message)?)
            }
        };

        self.events.emit(app_event);
        Ok(())
    }
}

impl fmt::Debug for CallInvite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallInvite")
            .field("uuid", &self.inner.uuid)
            .field("call_sid", &self.inner.call_sid)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_open() {
        assert!(!CallInviteState::Pending.is_terminal());
        for state in [
            CallInviteState::Accepted,
            CallInviteState::Rejected,
            CallInviteState::Cancelled,
        ] {
            assert!(state.is_terminal());
        }
        assert_eq!(CallInviteState::default(), CallInviteState::Pending);
    }

    #[test]
    fn test_cancelled_invite_from_native() {
        let cancelled: CancelledCallInvite = NativeCancelledCallInviteInfo {
            call_sid: "CA1".to_string(),
            from: "alice".to_string(),
            to: "bob".to_string(),
        }
        .into();
        assert_eq!(cancelled.call_sid(), "CA1");
        assert_eq!(cancelled.from(), "alice");
        assert_eq!(cancelled.to(), "bob");
    }

    #[test]
    fn test_accept_options_builder() {
        let options = CallInviteAcceptOptions::new().with_param("region", "ie1");
        assert_eq!(options.params.get("region").map(String::as_str), Some("ie1"));
    }
}
