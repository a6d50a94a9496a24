//! Shared test harness: a scripted native bridge
//!
//! Each bridge method records its arguments and answers with the next
//! envelope scripted for it. An unscripted method fails in transport.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rvoip_voice_client::native::{
    NativeBridge, NativeCallInfo, NativeCallInviteInfo, NativeEnvelope, NativeResult,
    NativeTransportError,
};
use rvoip_voice_client::{FeedbackIssue, FeedbackScore, Scope, Voice, VoiceConfig};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// One recorded bridge call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub method: String,
    pub args: Value,
}

#[derive(Default)]
pub struct FakeBridge {
    replies: Mutex<HashMap<String, VecDeque<Value>>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the raw envelope `method` answers with next
    pub fn script(&self, method: &str, envelope: Value) {
        self.replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(envelope);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Recorded calls of one method
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.invocations
            .lock()
            .iter()
            .filter(|invocation| invocation.method == method)
            .map(|invocation| invocation.args.clone())
            .collect()
    }

    fn reply<T: DeserializeOwned>(&self, method: &str, args: Value) -> NativeResult<T> {
        self.invocations.lock().push(Invocation {
            method: method.to_string(),
            args,
        });
        let envelope = self
            .replies
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| NativeTransportError::new(format!("no scripted reply for {}", method)))?;
        serde_json::from_value::<NativeEnvelope<T>>(envelope)
            .map_err(|e| NativeTransportError::new(format!("bad scripted envelope: {}", e)))
    }
}

#[async_trait]
impl NativeBridge for FakeBridge {
    async fn voice_connect(
        &self,
        access_token: &str,
        params: &HashMap<String, String>,
        contact_handle: &str,
    ) -> NativeResult<NativeCallInfo> {
        self.reply(
            "voice_connect",
            json!({"accessToken": access_token, "params": params, "contactHandle": contact_handle}),
        )
    }

    async fn voice_register(&self, access_token: &str) -> NativeResult<()> {
        self.reply("voice_register", json!({"accessToken": access_token}))
    }

    async fn voice_unregister(&self, access_token: &str) -> NativeResult<()> {
        self.reply("voice_unregister", json!({"accessToken": access_token}))
    }

    async fn voice_get_version(&self) -> NativeResult<String> {
        self.reply("voice_get_version", Value::Null)
    }

    async fn voice_get_device_token(&self) -> NativeResult<String> {
        self.reply("voice_get_device_token", Value::Null)
    }

    async fn voice_get_calls(&self) -> NativeResult<Vec<NativeCallInfo>> {
        self.reply("voice_get_calls", Value::Null)
    }

    async fn voice_get_call_invites(&self) -> NativeResult<Vec<NativeCallInviteInfo>> {
        self.reply("voice_get_call_invites", Value::Null)
    }

    async fn call_disconnect(&self, call_uuid: &str) -> NativeResult<()> {
        self.reply("call_disconnect", json!({"uuid": call_uuid}))
    }

    async fn call_hold(&self, call_uuid: &str, hold: bool) -> NativeResult<bool> {
        self.reply("call_hold", json!({"uuid": call_uuid, "hold": hold}))
    }

    async fn call_mute(&self, call_uuid: &str, mute: bool) -> NativeResult<bool> {
        self.reply("call_mute", json!({"uuid": call_uuid, "mute": mute}))
    }

    async fn call_send_digits(&self, call_uuid: &str, digits: &str) -> NativeResult<()> {
        self.reply("call_send_digits", json!({"uuid": call_uuid, "digits": digits}))
    }

    async fn call_send_message(
        &self,
        call_uuid: &str,
        content: &str,
        content_type: &str,
        message_type: &str,
    ) -> NativeResult<String> {
        self.reply(
            "call_send_message",
            json!({
                "uuid": call_uuid,
                "content": content,
                "contentType": content_type,
                "messageType": message_type,
            }),
        )
    }

    async fn call_post_feedback(
        &self,
        call_uuid: &str,
        score: FeedbackScore,
        issue: FeedbackIssue,
    ) -> NativeResult<()> {
        self.reply(
            "call_post_feedback",
            json!({"uuid": call_uuid, "score": score, "issue": issue}),
        )
    }

    async fn call_invite_accept(
        &self,
        invite_uuid: &str,
        params: &HashMap<String, String>,
    ) -> NativeResult<NativeCallInfo> {
        self.reply("call_invite_accept", json!({"uuid": invite_uuid, "params": params}))
    }

    async fn call_invite_reject(&self, invite_uuid: &str) -> NativeResult<()> {
        self.reply("call_invite_reject", json!({"uuid": invite_uuid}))
    }

    async fn call_invite_is_valid(&self, invite_uuid: &str) -> NativeResult<bool> {
        self.reply("call_invite_is_valid", json!({"uuid": invite_uuid}))
    }
}

pub fn ok(value: Value) -> Value {
    json!({"status": "ok", "value": value})
}

pub fn ok_unit() -> Value {
    ok(Value::Null)
}

pub fn rejected_with_code(code: u32, message: &str) -> Value {
    json!({"status": "rejected-with-code", "code": code, "message": message})
}

pub fn rejected_with_name(name: &str, message: &str) -> Value {
    json!({"status": "rejected-with-name", "name": name, "message": message})
}

/// A session manager over a fresh scripted bridge
pub fn voice() -> (Voice, Arc<FakeBridge>) {
    let bridge = FakeBridge::new();
    let voice = Voice::new(bridge.clone(), VoiceConfig::default()).expect("default config");
    (voice, bridge)
}

/// Place a call through `connect` and return it
pub async fn connected_call(
    voice: &Voice,
    bridge: &FakeBridge,
    uuid: &str,
) -> rvoip_voice_client::Call {
    bridge.script("voice_connect", ok(json!({"uuid": uuid, "to": "bob"})));
    voice
        .connect("token", Default::default())
        .await
        .expect("scripted connect")
}

/// Publish a raw payload on a scope of the manager's bus
pub fn publish(voice: &Voice, scope: Scope, payload: Value) -> rvoip_voice_client::VoiceResult<()> {
    voice.bus().publish(scope, &payload)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rvoip_voice_client=trace")
        .with_test_writer()
        .try_init();
}
