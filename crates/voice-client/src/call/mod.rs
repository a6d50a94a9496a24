//! Calls
//!
//! A [`Call`] is a cheap, cloneable handle to one call known to the native
//! layer. Its state only moves in response to native `call` events (see
//! [`state`]); the operations on the handle are requests to the native layer
//! and resolve once the native layer settles them.
//!
//! Dropping every handle to a call releases its bus subscription.
//!
//! Events go out on a broadcast channel and only reach receivers that exist
//! when they are emitted. Use [`Call::watch_state`] to observe the latest
//! state regardless of when the receiver was created.

pub mod events;
pub mod feedback;
pub mod state;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::bus::Subscription;
use crate::context::SessionContext;
use crate::emitter::{EventEmitter, EventStream};
use crate::error::{VoiceError, VoiceResult};
use crate::gate::{self, GatedEntity};
use crate::message::{CallMessage, OutgoingCallMessage};
use crate::native::events::NativeCallEvent;
use crate::native::{settle, NativeCallInfo, NativeErrorInfo};

pub use events::{CallEvent, QualityWarning};
pub use feedback::{FeedbackIssue, FeedbackScore};
pub use state::CallState;

/// Handle to a call
#[derive(Clone)]
pub struct Call {
    inner: Arc<CallInner>,
}

/// Mutable part of a call, refreshed from native events
#[derive(Debug, Clone, Default)]
struct CallSnapshot {
    state: CallState,
    sid: Option<String>,
    from: Option<String>,
    to: Option<String>,
    is_muted: bool,
    is_on_hold: bool,
    initial_connected_timestamp: Option<DateTime<Utc>>,
}

impl CallSnapshot {
    fn from_info(info: &NativeCallInfo) -> Self {
        Self {
            state: info.state.unwrap_or_default(),
            sid: info.sid.clone(),
            from: info.from.clone(),
            to: info.to.clone(),
            is_muted: info.is_muted.unwrap_or(false),
            is_on_hold: info.is_on_hold.unwrap_or(false),
            initial_connected_timestamp: info.initial_connected_timestamp,
        }
    }

    /// Take every field the payload carries; absent fields keep their value
    fn refresh(&mut self, info: &NativeCallInfo) {
        if let Some(sid) = &info.sid {
            self.sid = Some(sid.clone());
        }
        if let Some(from) = &info.from {
            self.from = Some(from.clone());
        }
        if let Some(to) = &info.to {
            self.to = Some(to.clone());
        }
        if let Some(ts) = info.initial_connected_timestamp {
            self.initial_connected_timestamp = Some(ts);
        }
    }
}

pub(crate) struct CallInner {
    uuid: String,
    custom_parameters: HashMap<String, String>,
    ctx: Arc<SessionContext>,
    snapshot: Mutex<CallSnapshot>,
    state_sender: watch::Sender<CallState>,
    events: EventEmitter<CallEvent>,
    subscription: Mutex<Option<Subscription>>,
}

impl Call {
    /// Handle for the call described by `info`
    ///
    /// Returns the live instance for `info.uuid` if the application still
    /// holds one, otherwise builds a new instance and subscribes it.
    pub(crate) fn obtain(ctx: &Arc<SessionContext>, info: NativeCallInfo) -> Self {
        if let Some(inner) = ctx.registry.live_call(&info.uuid) {
            return Self { inner };
        }

        let snapshot = CallSnapshot::from_info(&info);
        let (state_sender, _) = watch::channel(snapshot.state);
        let inner = Arc::new_cyclic(|weak: &Weak<CallInner>| CallInner {
            uuid: info.uuid.clone(),
            custom_parameters: info.custom_parameters.clone(),
            ctx: ctx.clone(),
            snapshot: Mutex::new(snapshot),
            state_sender,
            events: EventEmitter::new(ctx.config.event_capacity),
            subscription: Mutex::new(Some(gate::attach(&ctx.bus, weak.clone()))),
        });
        ctx.registry.insert_call(&inner.uuid, Arc::downgrade(&inner));
        info!("Created call {} in state {}", inner.uuid, inner.snapshot.lock().state);

        Self { inner }
    }

    pub fn uuid(&self) -> &str {
        &self.inner.uuid
    }

    pub fn state(&self) -> CallState {
        self.inner.snapshot.lock().state
    }

    /// Call SID, known once the call reaches the server
    pub fn sid(&self) -> Option<String> {
        self.inner.snapshot.lock().sid.clone()
    }

    pub fn from(&self) -> Option<String> {
        self.inner.snapshot.lock().from.clone()
    }

    pub fn to(&self) -> Option<String> {
        self.inner.snapshot.lock().to.clone()
    }

    /// Parameters captured when the call was created
    pub fn custom_parameters(&self) -> &HashMap<String, String> {
        &self.inner.custom_parameters
    }

    pub fn initial_connected_timestamp(&self) -> Option<DateTime<Utc>> {
        self.inner.snapshot.lock().initial_connected_timestamp
    }

    pub fn is_muted(&self) -> bool {
        self.inner.snapshot.lock().is_muted
    }

    pub fn is_on_hold(&self) -> bool {
        self.inner.snapshot.lock().is_on_hold
    }

    /// Watch the call state; the receiver starts at the current state
    pub fn watch_state(&self) -> watch::Receiver<CallState> {
        self.inner.state_sender.subscribe()
    }

    /// Subscribe to call events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.inner.events.subscribe()
    }

    pub fn event_stream(&self) -> EventStream<CallEvent> {
        self.inner.events.stream()
    }

    /// Stop listening for native events
    ///
    /// The handle stays usable for native operations; its state no longer
    /// changes.
    pub fn dispose(&self) {
        if self.inner.subscription.lock().take().is_some() {
            debug!("Disposed call {}", self.inner.uuid);
        }
    }

    /// Hang up
    pub async fn disconnect(&self) -> VoiceResult<()> {
        info!("Disconnecting call {}", self.inner.uuid);
        settle(self.inner.ctx.bridge.call_disconnect(&self.inner.uuid)).await
    }

    /// Put the call on or off hold
    ///
    /// Resolves with the hold state the native layer reports afterwards,
    /// which is also what [`Call::is_on_hold`] returns from then on.
    pub async fn hold(&self, hold: bool) -> VoiceResult<bool> {
        let on_hold = settle(self.inner.ctx.bridge.call_hold(&self.inner.uuid, hold)).await?;
        self.inner.snapshot.lock().is_on_hold = on_hold;
        debug!("Call {} hold requested {} -> {}", self.inner.uuid, hold, on_hold);
        Ok(on_hold)
    }

    /// Mute or unmute the microphone; resolves with the resulting mute state
    pub async fn mute(&self, mute: bool) -> VoiceResult<bool> {
        let muted = settle(self.inner.ctx.bridge.call_mute(&self.inner.uuid, mute)).await?;
        self.inner.snapshot.lock().is_muted = muted;
        debug!("Call {} mute requested {} -> {}", self.inner.uuid, mute, muted);
        Ok(muted)
    }

    /// Play DTMF digits
    pub async fn send_digits(&self, digits: &str) -> VoiceResult<()> {
        settle(self.inner.ctx.bridge.call_send_digits(&self.inner.uuid, digits)).await
    }

    /// Send a message to the remote party
    ///
    /// Resolves once the native layer accepts the message; delivery is
    /// reported later through the returned [`OutgoingCallMessage`].
    pub async fn send_message(&self, message: &CallMessage) -> VoiceResult<OutgoingCallMessage> {
        let content = message.wire_content();
        let sid = settle(self.inner.ctx.bridge.call_send_message(
            &self.inner.uuid,
            &content,
            message.content_type(),
            message.message_type(),
        ))
        .await?;
        Ok(OutgoingCallMessage::track(&self.inner.ctx, message.clone(), sid))
    }

    /// Report call quality
    ///
    /// Accepts the typed values or their wire names (`"5"`, `"five"`,
    /// `"one-way-audio"`, ...). Invalid values fail with
    /// [`VoiceError::InvalidArgument`] without reaching the native layer.
    pub async fn post_feedback<S, I>(&self, score: S, issue: I) -> VoiceResult<()>
    where
        S: TryInto<FeedbackScore>,
        I: TryInto<FeedbackIssue>,
        VoiceError: From<S::Error> + From<I::Error>,
    {
        let score = score.try_into()?;
        let issue = issue.try_into()?;
        settle(
            self.inner
                .ctx
                .bridge
                .call_post_feedback(&self.inner.uuid, score, issue),
        )
        .await
    }
}

impl CallInner {
    fn transition(&self, next: CallState, info: &NativeCallInfo) {
        let mut snapshot = self.snapshot.lock();
        let previous = snapshot.state;
        if !previous.can_transition_to(next) {
            warn!(
                "Call {} moved {} -> {} outside the state graph",
                self.uuid, previous, next
            );
        }
        snapshot.state = next;
        snapshot.refresh(info);
        self.state_sender.send_replace(next);
        debug!("Call {} state {} -> {}", self.uuid, previous, next);
    }
}

impl GatedEntity for CallInner {
    type Event = NativeCallEvent;

    fn correlation_id(&self) -> &str {
        &self.uuid
    }

    fn handle_event(&self, event: NativeCallEvent) -> VoiceResult<()> {
        if let Some(next) = state::target_state(&event) {
            self.transition(next, event.call());
        }

        let app_event = match event {
            NativeCallEvent::Connected { .. } => CallEvent::Connected,
            NativeCallEvent::ConnectFailure { error, .. } => {
                CallEvent::ConnectFailure(error.into_coded())
            }
            NativeCallEvent::Disconnected { error, .. } => {
                CallEvent::Disconnected(error.map(NativeErrorInfo::into_coded))
            }
            NativeCallEvent::Reconnecting { error, .. } => {
                CallEvent::Reconnecting(error.into_coded())
            }
            NativeCallEvent::Reconnected { .. } => CallEvent::Reconnected,
            NativeCallEvent::Ringing { .. } => CallEvent::Ringing,
            NativeCallEvent::QualityWarningsChanged {
                current_warnings,
                previous_warnings,
                ..
            } => CallEvent::QualityWarningsChanged {
                current: current_warnings,
                previous: previous_warnings,
            },
            NativeCallEvent::MessageReceived { call_message, .. } => {
                CallEvent::MessageReceived(CallMessage::from_native(&call_message)?)
            }
        };

        self.events.emit(app_event);
        Ok(())
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("uuid", &self.inner.uuid)
            .field("snapshot", &*self.inner.snapshot.lock())
            .finish()
    }
}

impl PartialEq for Call {
    /// Handles are equal when they point at the same instance
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
