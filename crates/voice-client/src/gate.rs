//! Per-instance filtering of shared scope traffic
//!
//! Every entity instance subscribes one handler to the scope of its kind.
//! The handler goes through [`route`]:
//!
//! 1. read the payload's correlation id
//! 2. if it is not this instance's id, ignore the payload
//! 3. check `type` against the closed set of event kinds for the scope;
//!    an unknown type is a contract violation
//! 4. decode into the event enum and hand it to the instance
//!
//! The instance's handler then matches exhaustively over the decoded enum,
//! so each arm only ever sees the payload shape it was written for.

use std::sync::Weak;

use serde_json::Value;
use tracing::trace;

use crate::bus::{NativeEventBus, Subscription};
use crate::error::{VoiceError, VoiceResult};
use crate::native::events::{event_type, CorrelatedEvent, ScopedEvent};

/// Outcome of routing one payload to one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Payload addressed another instance
    Ignored,
    /// Payload was decoded and handled
    Handled,
}

/// An entity instance that listens on a correlated scope
pub trait GatedEntity: Send + Sync + 'static {
    type Event: CorrelatedEvent;

    /// Correlation id this instance answers to
    fn correlation_id(&self) -> &str;

    /// Handle an event addressed to this instance
    fn handle_event(&self, event: Self::Event) -> VoiceResult<()>;
}

/// Check the `type` of a payload and decode it
pub fn decode<E: ScopedEvent>(payload: &Value) -> VoiceResult<E> {
    let ty = event_type(payload).ok_or_else(|| {
        VoiceError::event_contract(format!("{} event without a type field", E::SCOPE))
    })?;
    if !E::TYPES.iter().any(|known| *known == ty) {
        return Err(VoiceError::event_contract(format!(
            "unknown {} event type \"{}\"",
            E::SCOPE,
            ty
        )));
    }
    E::deserialize(payload).map_err(|e| {
        VoiceError::event_contract(format!("malformed {} event \"{}\": {}", E::SCOPE, ty, e))
    })
}

/// Filter a payload for one instance and dispatch it if it matches
pub fn route<T: GatedEntity>(entity: &T, payload: &Value) -> VoiceResult<GateOutcome> {
    let Some(id) = T::Event::correlation_id(payload) else {
        return Err(VoiceError::event_contract(format!(
            "{} event without a correlation id",
            T::Event::SCOPE
        )));
    };
    if id != entity.correlation_id() {
        trace!(
            "Ignoring {} event for {} (instance {})",
            T::Event::SCOPE,
            id,
            entity.correlation_id()
        );
        return Ok(GateOutcome::Ignored);
    }

    let event = decode::<T::Event>(payload)?;
    entity.handle_event(event)?;
    Ok(GateOutcome::Handled)
}

/// Subscribe an instance to its scope
///
/// The bus holds only a weak reference: once every strong handle to the
/// instance is gone, its handler ignores further payloads until the
/// subscription handle is dropped along with the instance.
pub fn attach<T: GatedEntity>(bus: &NativeEventBus, entity: Weak<T>) -> Subscription {
    bus.subscribe(T::Event::SCOPE, move |payload| {
        let Some(entity) = entity.upgrade() else {
            return Ok(());
        };
        route(entity.as_ref(), payload).map(|_| ())
    })
}
