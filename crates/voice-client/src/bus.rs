//! Publish/subscribe bus for native events
//!
//! The native layer emits every event on one of four scopes, one per entity
//! kind. All instances of a kind share their scope and filter for their own
//! events (see [`gate`](crate::gate)), so the bus is a plain fan-out keyed by
//! [`Scope`].
//!
//! Subscribing returns a [`Subscription`] handle; dropping the handle (or
//! calling [`Subscription::release`]) removes the handler. The bus keeps no
//! other reference to the subscriber.
//!
//! # Examples
//!
//! ```rust
//! use rvoip_voice_client::bus::{NativeEventBus, Scope};
//! use serde_json::json;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let bus = NativeEventBus::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! let subscription = bus.subscribe(Scope::Voice, move |_payload| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! bus.publish(Scope::Voice, &json!({"type": "registered"})).unwrap();
//! drop(subscription);
//! bus.publish(Scope::Voice, &json!({"type": "registered"})).unwrap();
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use crate::error::VoiceResult;

/// Named event channel shared by all instances of one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Voice,
    Call,
    CallInvite,
    CallMessage,
}

impl Scope {
    /// Wire name of the scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Voice => "voice",
            Scope::Call => "call",
            Scope::CallInvite => "call-invite",
            Scope::CallMessage => "call-message",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw event as delivered by the native layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeEvent {
    pub scope: Scope,
    pub payload: Value,
}

impl NativeEvent {
    pub fn new(scope: Scope, payload: Value) -> Self {
        Self { scope, payload }
    }
}

type Handler = Arc<dyn Fn(&Value) -> VoiceResult<()> + Send + Sync>;

struct BusInner {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<Scope, Vec<(u64, Handler)>>>,
}

impl BusInner {
    fn remove(&self, scope: Scope, id: u64) {
        let mut handlers = self.handlers.write();
        if let Some(list) = handlers.get_mut(&scope) {
            list.retain(|(handler_id, _)| *handler_id != id);
        }
    }
}

/// Scope-keyed fan-out of native events
#[derive(Clone)]
pub struct NativeEventBus {
    inner: Arc<BusInner>,
}

impl NativeEventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                handlers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Add a handler to a scope
    pub fn subscribe<F>(&self, scope: Scope, handler: F) -> Subscription
    where
        F: Fn(&Value) -> VoiceResult<()> + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .write()
            .entry(scope)
            .or_default()
            .push((id, Arc::new(handler)));
        trace!("Subscribed handler {} to scope {}", id, scope);

        Subscription {
            bus: Arc::downgrade(&self.inner),
            scope,
            id,
        }
    }

    /// Deliver a payload to every handler of a scope, in subscription order
    ///
    /// All handlers run even if one fails; the first failure is returned.
    /// Handlers may subscribe or unsubscribe while the payload is delivered;
    /// such changes take effect from the next publish.
    pub fn publish(&self, scope: Scope, payload: &Value) -> VoiceResult<()> {
        let snapshot: Vec<Handler> = self
            .inner
            .handlers
            .read()
            .get(&scope)
            .map(|list| list.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();

        let mut first_error = None;
        for handler in snapshot {
            if let Err(e) = handler(payload) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Deliver a [`NativeEvent`]
    pub fn dispatch(&self, event: &NativeEvent) -> VoiceResult<()> {
        self.publish(event.scope, &event.payload)
    }

    /// Number of live handlers on a scope
    pub fn subscriber_count(&self, scope: Scope) -> usize {
        self.inner
            .handlers
            .read()
            .get(&scope)
            .map_or(0, Vec::len)
    }

    /// Feed native events into the bus in arrival order until the sender
    /// side closes
    ///
    /// Contract violations reported by handlers never stop the pump; they
    /// are logged when `log_errors` is set.
    pub async fn pump(self, mut events: mpsc::UnboundedReceiver<NativeEvent>, log_errors: bool) {
        debug!("Native event pump started");
        while let Some(event) = events.recv().await {
            match self.dispatch(&event) {
                Err(e) if log_errors => {
                    error!("Failed to handle native event on scope {}: {}", event.scope, e);
                }
                _ => {}
            }
        }
        debug!("Native event pump stopped: channel closed");
    }
}

impl Default for NativeEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NativeEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.inner.handlers.read();
        let counts: HashMap<Scope, usize> = handlers
            .iter()
            .map(|(scope, list)| (*scope, list.len()))
            .collect();
        f.debug_struct("NativeEventBus")
            .field("subscribers", &counts)
            .finish()
    }
}

/// Handle to a bus subscription; unsubscribes on drop
pub struct Subscription {
    bus: Weak<BusInner>,
    scope: Scope,
    id: u64,
}

impl Subscription {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Unsubscribe now
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.scope, self.id);
            trace!("Released handler {} from scope {}", self.id, self.scope);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("scope", &self.scope)
            .field("id", &self.id)
            .finish()
    }
}
