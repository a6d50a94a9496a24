//! # Voice Client - Typed Call Sessions over a Native Voice Transport
//!
//! This crate is the application-facing layer of a voice calling client. The
//! actual signaling and media work happens in a native layer, reached through
//! the [`NativeBridge`] trait and an event bus. On top of that it provides:
//!
//! - **Session manager** ([`Voice`]): connect, register, list calls and invites
//! - **Call** ([`Call`]): state machine driven by native events, hold, mute,
//!   DTMF, in-call messages, quality feedback
//! - **Call invite** ([`CallInvite`]): accept, reject, cancellation
//! - **Call messages** ([`CallMessage`], [`OutgoingCallMessage`])
//! - **Typed errors** ([`VoiceError`], [`CodedError`]) from a compiled-in
//!   error code table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rvoip_voice_client::{
//!     CallEvent, ConnectOptions, NativeBridge, NativeEvent, Voice, VoiceConfig, VoiceResult,
//! };
//! use tokio::sync::mpsc;
//!
//! async fn run(
//!     bridge: Arc<dyn NativeBridge>,
//!     native_events: mpsc::UnboundedReceiver<NativeEvent>,
//! ) -> VoiceResult<()> {
//!     let voice = Voice::new(bridge, VoiceConfig::default())?;
//!     voice.spawn_event_pump(native_events);
//!
//!     let call = voice.connect("access-token", ConnectOptions::new()).await?;
//!     let mut events = call.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         if let CallEvent::Disconnected(error) = event {
//!             println!("call ended: {:?}", error);
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  native events ──► NativeEventBus ──► gate (per instance) ──► Call / CallInvite / ...
//!                                                                   │
//!  application ◄──────────────── broadcast events ◄─────────────────┘
//!  application ──► Call::hold(..) ──► NativeBridge ──► envelope ──► settle
//! ```
//!
//! Native events are fanned out per scope; each entity instance only acts on
//! payloads carrying its own identifier.

pub mod bus;
pub mod call;
pub mod call_invite;
pub mod config;
mod context;
pub mod emitter;
pub mod error;
pub mod gate;
pub mod logging;
pub mod message;
pub mod native;
pub mod voice;

// Re-export main types
pub use bus::{NativeEvent, NativeEventBus, Scope, Subscription};
pub use call::{Call, CallEvent, CallState, FeedbackIssue, FeedbackScore, QualityWarning};
pub use call_invite::{
    CallInvite, CallInviteAcceptOptions, CallInviteEvent, CallInviteState, CancelledCallInvite,
};
pub use config::VoiceConfig;
pub use emitter::EventStream;
pub use error::{construct, CodedError, ErrorCode, VoiceError, VoiceResult};
pub use logging::{setup_logging, LoggingConfig};
pub use message::{
    CallMessage, OutgoingCallMessage, OutgoingCallMessageEvent, OutgoingCallMessageStatus,
};
pub use native::{NativeBridge, NativeEnvelope, NativeResult, NativeTransportError};
pub use voice::{ConnectOptions, Voice, VoiceEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
