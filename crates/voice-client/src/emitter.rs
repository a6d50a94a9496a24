//! Application-facing event channels
//!
//! Each entity owns one [`EventEmitter`]. Applications take either a raw
//! [`broadcast::Receiver`] or an [`EventStream`]; a receiver that falls more
//! than the configured capacity behind loses the oldest events.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

/// Stream of application events; lagging shows up as an `Err` item
pub type EventStream<E> = BroadcastStream<E>;

/// Broadcast sender for one entity's application events
#[derive(Debug)]
pub struct EventEmitter<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> EventEmitter<E> {
    /// Create an emitter; `capacity` must be greater than zero
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to every current receiver
    pub fn emit(&self, event: E) {
        if self.sender.send(event).is_err() {
            trace!("Dropped application event: no receivers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn stream(&self) -> EventStream<E> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Get the number of active receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
