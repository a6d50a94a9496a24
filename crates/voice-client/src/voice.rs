//! Voice session manager
//!
//! [`Voice`] is the entry point of the crate. It owns the session state
//! shared with every entity (bridge, bus, configuration, live-instance registry),
//! places outgoing calls, manages registration and turns `voice` scope
//! events into [`VoiceEvent`]s.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rvoip_voice_client::{ConnectOptions, NativeBridge, Voice, VoiceConfig, VoiceResult};
//!
//! async fn place_call(bridge: Arc<dyn NativeBridge>) -> VoiceResult<()> {
//!     let voice = Voice::new(bridge, VoiceConfig::default())?;
//!     let call = voice
//!         .connect("access-token", ConnectOptions::new().with_param("To", "bob"))
//!         .await?;
//!     let mut events = call.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bus::{NativeEvent, NativeEventBus, Subscription};
use crate::call::Call;
use crate::call_invite::CallInvite;
use crate::config::VoiceConfig;
use crate::context::SessionContext;
use crate::emitter::{EventEmitter, EventStream};
use crate::error::{CodedError, VoiceResult};
use crate::gate;
use crate::native::events::{NativeVoiceEvent, ScopedEvent};
use crate::native::{settle, NativeBridge};

/// Options for [`Voice::connect`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Parameters forwarded to the application server
    pub params: HashMap<String, String>,
    /// Name shown for the call in the system call UI
    pub contact_handle: String,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_contact_handle(mut self, handle: impl Into<String>) -> Self {
        self.contact_handle = handle.into();
        self
    }
}

/// Events emitted by the session manager
#[derive(Debug, Clone)]
pub enum VoiceEvent {
    /// A new incoming call invite arrived
    CallInvite(CallInvite),
    /// Unsolicited native error not tied to a call
    Error(CodedError),
    Registered,
    Unregistered,
}

/// Voice session manager
#[derive(Clone)]
pub struct Voice {
    inner: Arc<VoiceInner>,
}

struct VoiceInner {
    ctx: Arc<SessionContext>,
    events: EventEmitter<VoiceEvent>,
    // Held for its drop
    _subscription: Subscription,
}

impl Voice {
    /// Create a manager with its own event bus
    pub fn new(bridge: Arc<dyn NativeBridge>, config: VoiceConfig) -> VoiceResult<Self> {
        Self::with_bus(bridge, NativeEventBus::new(), config)
    }

    /// Create a manager on an existing event bus
    pub fn with_bus(
        bridge: Arc<dyn NativeBridge>,
        bus: NativeEventBus,
        config: VoiceConfig,
    ) -> VoiceResult<Self> {
        config.validate()?;
        let ctx = SessionContext::new(bridge, bus, config);

        let inner = Arc::new_cyclic(|weak: &Weak<VoiceInner>| {
            let weak = weak.clone();
            let subscription = ctx.bus.subscribe(NativeVoiceEvent::SCOPE, move |payload| {
                let Some(inner) = weak.upgrade() else {
                    return Ok(());
                };
                inner.handle_event(gate::decode(payload)?);
                Ok(())
            });
            VoiceInner {
                events: EventEmitter::new(ctx.config.event_capacity),
                ctx,
                _subscription: subscription,
            }
        });
        info!("Voice session manager created");

        Ok(Self { inner })
    }

    /// Bus the native layer publishes events on
    pub fn bus(&self) -> &NativeEventBus {
        &self.inner.ctx.bus
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.inner.ctx.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VoiceEvent> {
        self.inner.events.subscribe()
    }

    pub fn event_stream(&self) -> EventStream<VoiceEvent> {
        self.inner.events.stream()
    }

    /// Drive native events from `events` into the bus on a tokio task
    ///
    /// The task ends when every sender is dropped.
    pub fn spawn_event_pump(&self, events: mpsc::UnboundedReceiver<NativeEvent>) -> JoinHandle<()> {
        let log_errors = self.inner.ctx.config.log_contract_violations;
        tokio::spawn(self.inner.ctx.bus.clone().pump(events, log_errors))
    }

    /// Place an outgoing call
    pub async fn connect(&self, access_token: &str, options: ConnectOptions) -> VoiceResult<Call> {
        info!("Connecting call with {} parameters", options.params.len());
        let info = settle(self.inner.ctx.bridge.voice_connect(
            access_token,
            &options.params,
            &options.contact_handle,
        ))
        .await?;
        Ok(Call::obtain(&self.inner.ctx, info))
    }

    /// Register for incoming call invites
    pub async fn register(&self, access_token: &str) -> VoiceResult<()> {
        info!("Registering for incoming calls");
        settle(self.inner.ctx.bridge.voice_register(access_token)).await
    }

    pub async fn unregister(&self, access_token: &str) -> VoiceResult<()> {
        info!("Unregistering from incoming calls");
        settle(self.inner.ctx.bridge.voice_unregister(access_token)).await
    }

    /// Version of the native voice SDK
    pub async fn get_version(&self) -> VoiceResult<String> {
        settle(self.inner.ctx.bridge.voice_get_version()).await
    }

    pub async fn get_device_token(&self) -> VoiceResult<String> {
        settle(self.inner.ctx.bridge.voice_get_device_token()).await
    }

    /// Calls known to the native layer
    ///
    /// Calls the application already holds come back as the same instance.
    pub async fn get_calls(&self) -> VoiceResult<Vec<Call>> {
        let calls = settle(self.inner.ctx.bridge.voice_get_calls()).await?;
        Ok(calls
            .into_iter()
            .map(|info| Call::obtain(&self.inner.ctx, info))
            .collect())
    }

    /// Pending call invites known to the native layer
    pub async fn get_call_invites(&self) -> VoiceResult<Vec<CallInvite>> {
        let invites = settle(self.inner.ctx.bridge.voice_get_call_invites()).await?;
        Ok(invites
            .into_iter()
            .map(|info| CallInvite::obtain(&self.inner.ctx, info))
            .collect())
    }

    /// Number of live calls and call invites currently tracked
    pub fn live_entities(&self) -> (usize, usize) {
        self.inner.ctx.registry.live_counts()
    }
}

impl VoiceInner {
    fn handle_event(&self, event: NativeVoiceEvent) {
        let app_event = match event {
            NativeVoiceEvent::CallInvite { call_invite } => {
                info!("Incoming call invite {}", call_invite.uuid);
                VoiceEvent::CallInvite(CallInvite::obtain(&self.ctx, call_invite))
            }
            NativeVoiceEvent::Error { error } => VoiceEvent::Error(error.into_coded()),
            NativeVoiceEvent::Registered => VoiceEvent::Registered,
            NativeVoiceEvent::Unregistered => VoiceEvent::Unregistered,
        };
        debug!("Voice event {:?}", app_event);
        self.events.emit(app_event);
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("bus", &self.inner.ctx.bus)
            .field("config", &self.inner.ctx.config)
            .finish()
    }
}
