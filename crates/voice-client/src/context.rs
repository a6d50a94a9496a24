//! Collaborators shared by the session manager and every entity

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::bus::NativeEventBus;
use crate::call::CallInner;
use crate::call_invite::CallInviteInner;
use crate::config::VoiceConfig;
use crate::native::NativeBridge;

/// Weak index of live entity instances by identifier
///
/// Lets list operations and native events reuse the instance the application
/// already holds instead of creating a second one. Entries never keep an
/// instance alive.
#[derive(Default)]
pub(crate) struct Registry {
    calls: DashMap<String, Weak<CallInner>>,
    call_invites: DashMap<String, Weak<CallInviteInner>>,
}

impl Registry {
    pub(crate) fn live_call(&self, uuid: &str) -> Option<Arc<CallInner>> {
        self.calls.get(uuid).and_then(|entry| entry.upgrade())
    }

    pub(crate) fn insert_call(&self, uuid: &str, call: Weak<CallInner>) {
        self.calls.retain(|_, weak| weak.strong_count() > 0);
        self.calls.insert(uuid.to_string(), call);
    }

    pub(crate) fn live_call_invite(&self, uuid: &str) -> Option<Arc<CallInviteInner>> {
        self.call_invites.get(uuid).and_then(|entry| entry.upgrade())
    }

    pub(crate) fn insert_call_invite(&self, uuid: &str, invite: Weak<CallInviteInner>) {
        self.call_invites.retain(|_, weak| weak.strong_count() > 0);
        self.call_invites.insert(uuid.to_string(), invite);
    }

    pub(crate) fn live_counts(&self) -> (usize, usize) {
        let calls = self.calls.iter().filter(|e| e.strong_count() > 0).count();
        let invites = self
            .call_invites
            .iter()
            .filter(|e| e.strong_count() > 0)
            .count();
        (calls, invites)
    }
}

/// Everything an entity needs to talk to the native layer
pub(crate) struct SessionContext {
    pub(crate) bridge: Arc<dyn NativeBridge>,
    pub(crate) bus: NativeEventBus,
    pub(crate) config: VoiceConfig,
    pub(crate) registry: Registry,
}

impl SessionContext {
    pub(crate) fn new(
        bridge: Arc<dyn NativeBridge>,
        bus: NativeEventBus,
        config: VoiceConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            bridge,
            bus,
            config,
            registry: Registry::default(),
        })
    }
}
