//! Delivery tracking for sent call messages

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::CallMessage;
use crate::bus::Subscription;
use crate::context::SessionContext;
use crate::emitter::{EventEmitter, EventStream};
use crate::error::{CodedError, VoiceResult};
use crate::gate::{self, GatedEntity};
use crate::native::events::NativeCallMessageEvent;

/// Terminal outcome of a sent message, emitted once
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingCallMessageEvent {
    Sent,
    Failure(CodedError),
}

/// Delivery status of a sent message
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingCallMessageStatus {
    /// Waiting for the native layer to report the outcome
    Pending,
    Sent,
    Failed(CodedError),
}

impl OutgoingCallMessageStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A call message handed to the native layer, awaiting its outcome
///
/// Listens on the `call-message` scope for the `voiceEventSid` assigned to
/// this send. The first matching `sent` or `failure` event settles the
/// message and releases the subscription; later events are never seen.
///
/// The outcome event reaches only receivers subscribed before it arrived.
/// [`OutgoingCallMessage::outcome`] and [`OutgoingCallMessage::watch_status`]
/// observe it no matter when they are called.
#[derive(Clone)]
pub struct OutgoingCallMessage {
    inner: Arc<OutgoingInner>,
}

struct OutgoingInner {
    message: CallMessage,
    sid: String,
    status: watch::Sender<OutgoingCallMessageStatus>,
    events: EventEmitter<OutgoingCallMessageEvent>,
    subscription: Mutex<Option<Subscription>>,
}

impl OutgoingCallMessage {
    pub(crate) fn track(ctx: &Arc<SessionContext>, message: CallMessage, sid: String) -> Self {
        let message = message.with_sid(sid.clone());
        let (status, _) = watch::channel(OutgoingCallMessageStatus::Pending);
        let inner = Arc::new_cyclic(|weak: &Weak<OutgoingInner>| OutgoingInner {
            message,
            sid,
            status,
            events: EventEmitter::new(ctx.config.event_capacity),
            subscription: Mutex::new(Some(gate::attach(&ctx.bus, weak.clone()))),
        });
        info!("Tracking outgoing call message {}", inner.sid);
        Self { inner }
    }

    /// The message as sent, carrying its assigned sid
    pub fn message(&self) -> &CallMessage {
        &self.inner.message
    }

    pub fn sid(&self) -> &str {
        &self.inner.sid
    }

    pub fn status(&self) -> OutgoingCallMessageStatus {
        self.inner.status.borrow().clone()
    }

    /// Watch the delivery status; the receiver starts at the current status
    pub fn watch_status(&self) -> watch::Receiver<OutgoingCallMessageStatus> {
        self.inner.status.subscribe()
    }

    /// Wait for the message to settle
    ///
    /// Returns at once if the outcome already arrived. Never returns while
    /// the message is pending, so a disposed message that had not settled
    /// waits forever.
    pub async fn outcome(&self) -> OutgoingCallMessageStatus {
        let mut status = self.inner.status.subscribe();
        match status.wait_for(OutgoingCallMessageStatus::is_settled).await {
            Ok(settled) => settled.clone(),
            // The sender lives as long as `self`
            Err(_) => self.status(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutgoingCallMessageEvent> {
        self.inner.events.subscribe()
    }

    pub fn event_stream(&self) -> EventStream<OutgoingCallMessageEvent> {
        self.inner.events.stream()
    }

    /// Stop listening for the outcome
    pub fn dispose(&self) {
        self.inner.subscription.lock().take();
    }

    /// Whether the message still listens for its outcome
    pub fn is_listening(&self) -> bool {
        self.inner.subscription.lock().is_some()
    }
}

impl GatedEntity for OutgoingInner {
    type Event = NativeCallMessageEvent;

    fn correlation_id(&self) -> &str {
        &self.sid
    }

    fn handle_event(&self, event: NativeCallMessageEvent) -> VoiceResult<()> {
        let (status, app_event) = match event {
            NativeCallMessageEvent::Sent { .. } => {
                (OutgoingCallMessageStatus::Sent, OutgoingCallMessageEvent::Sent)
            }
            NativeCallMessageEvent::Failure { error, .. } => {
                let error = error.into_coded();
                (
                    OutgoingCallMessageStatus::Failed(error.clone()),
                    OutgoingCallMessageEvent::Failure(error),
                )
            }
        };

        let settled_now = self.status.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            *current = status;
            true
        });
        if !settled_now {
            debug!("Call message {} already settled, ignoring {:?}", self.sid, app_event);
            return Ok(());
        }

        debug!("Call message {} settled: {:?}", self.sid, app_event);
        self.subscription.lock().take();
        self.events.emit(app_event);
        Ok(())
    }
}

impl fmt::Debug for OutgoingCallMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutgoingCallMessage")
            .field("sid", &self.inner.sid)
            .field("status", &*self.inner.status.borrow())
            .finish()
    }
}
