//! Call state machine and call operations against a scripted bridge

mod common;

use common::*;
use rvoip_voice_client::{CallEvent, CallState, QualityWarning, Scope, VoiceError};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

#[tokio::test]
async fn test_call_follows_native_events() -> anyhow::Result<()> {
    init_tracing();
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let mut events = call.subscribe();

    assert_eq!(call.state(), CallState::Connecting);
    assert_eq!(call.to().as_deref(), Some("bob"));
    assert!(call.initial_connected_timestamp().is_none());

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "connected",
            "call": {"uuid": "c1", "sid": "CA1", "from": "alice",
                     "initialConnectedTimestamp": 1_700_000_000_000_i64},
        }),
    )?;
    assert_eq!(call.state(), CallState::Connected);
    assert_eq!(call.sid().as_deref(), Some("CA1"));
    let connected_at = call.initial_connected_timestamp().expect("timestamp");
    assert_eq!(connected_at.timestamp_millis(), 1_700_000_000_000);

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "qualityWarningsChanged",
            "call": {"uuid": "c1"},
            "currentWarnings": ["high-jitter", "low-mos"],
            "previousWarnings": [],
        }),
    )?;
    assert_eq!(call.state(), CallState::Connected);

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "reconnecting",
            "call": {"uuid": "c1"},
            "error": {"code": 53405, "message": "ice failed"},
        }),
    )?;
    assert_eq!(call.state(), CallState::Reconnecting);

    publish(&voice, Scope::Call, json!({"type": "reconnected", "call": {"uuid": "c1"}}))?;
    assert_eq!(call.state(), CallState::Connected);
    assert_eq!(call.initial_connected_timestamp(), Some(connected_at));
    assert_eq!(call.sid().as_deref(), Some("CA1"));
    assert_eq!(call.from().as_deref(), Some("alice"));

    assert_eq!(events.try_recv()?, CallEvent::Connected);
    assert_eq!(
        events.try_recv()?,
        CallEvent::QualityWarningsChanged {
            current: vec![QualityWarning::HighJitter, QualityWarning::LowMos],
            previous: vec![],
        }
    );
    match events.try_recv()? {
        CallEvent::Reconnecting(error) => {
            assert_eq!(error.code(), 53405);
            assert_eq!(error.name(), "MediaConnectionError");
            assert_eq!(error.message(), "ice failed");
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(events.try_recv()?, CallEvent::Reconnected);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

#[tokio::test]
async fn test_events_for_other_calls_are_ignored() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let mut events = call.subscribe();

    publish(
        &voice,
        Scope::Call,
        json!({"type": "connected", "call": {"uuid": "c2", "sid": "CA2"}}),
    )?;
    publish(
        &voice,
        Scope::Call,
        json!({"type": "not-a-call-event", "call": {"uuid": "c2"}}),
    )?;

    assert_eq!(call.state(), CallState::Connecting);
    assert!(call.sid().is_none());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

#[tokio::test]
async fn test_unknown_event_type_is_contract_violation() {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    let err = publish(&voice, Scope::Call, json!({"type": "exploded", "call": {"uuid": "c1"}}))
        .unwrap_err();
    assert!(matches!(err, VoiceError::EventContract { .. }));

    let err = publish(&voice, Scope::Call, json!({"type": "connected"})).unwrap_err();
    assert!(matches!(err, VoiceError::EventContract { .. }));
    assert_eq!(call.state(), CallState::Connecting);
}

#[tokio::test]
async fn test_disconnect_with_error_is_terminal_but_native_wins() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let mut events = call.subscribe();

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "disconnected",
            "call": {"uuid": "c1"},
            "error": {"code": 31603, "message": "declined"},
        }),
    )?;
    assert_eq!(call.state(), CallState::Disconnected);
    match events.try_recv()? {
        CallEvent::Disconnected(Some(error)) => assert_eq!(error.name(), "Decline"),
        other => panic!("unexpected event {:?}", other),
    }

    // Out of graph, applied anyway
    publish(&voice, Scope::Call, json!({"type": "ringing", "call": {"uuid": "c1"}}))?;
    assert_eq!(call.state(), CallState::Ringing);
    assert_eq!(events.try_recv()?, CallEvent::Ringing);
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_carries_generic_error_for_unknown_code() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let mut events = call.subscribe();

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "connectFailure",
            "call": {"uuid": "c1"},
            "error": {"code": 99999, "message": "mystery"},
        }),
    )?;
    assert_eq!(call.state(), CallState::Disconnected);
    match events.try_recv()? {
        CallEvent::ConnectFailure(error) => {
            assert_eq!(error.code(), 99999);
            assert_eq!(error.name(), "GenericError");
            assert!(error.is_generic());
        }
        other => panic!("unexpected event {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_fractional_connect_timestamp_is_truncated() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "connected",
            "call": {"uuid": "c1", "initialConnectedTimestamp": 1_700_000_000_000.25},
        }),
    )?;
    assert_eq!(call.state(), CallState::Connected);
    let connected_at = call.initial_connected_timestamp().expect("timestamp");
    assert_eq!(connected_at.timestamp_millis(), 1_700_000_000_000);
    Ok(())
}

#[tokio::test]
async fn test_mistyped_error_code_rejects_whole_event() {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    let err = publish(
        &voice,
        Scope::Call,
        json!({
            "type": "connectFailure",
            "call": {"uuid": "c1"},
            "error": {"code": "31005", "message": "bad"},
        }),
    )
    .unwrap_err();
    assert!(matches!(err, VoiceError::EventContract { .. }));
    assert_eq!(call.state(), CallState::Connecting);
}

#[tokio::test]
async fn test_state_watch_sees_changes_made_before_it_existed() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    publish(&voice, Scope::Call, json!({"type": "ringing", "call": {"uuid": "c1"}}))?;
    let mut late = call.subscribe();
    let mut state = call.watch_state();
    assert_eq!(*state.borrow_and_update(), CallState::Ringing);
    assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));

    publish(&voice, Scope::Call, json!({"type": "connected", "call": {"uuid": "c1"}}))?;
    assert!(state.has_changed()?);
    assert_eq!(*state.borrow_and_update(), CallState::Connected);
    assert_eq!(late.try_recv()?, CallEvent::Connected);
    Ok(())
}

#[tokio::test]
async fn test_incoming_message_is_validated() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let mut events = call.subscribe();

    publish(
        &voice,
        Scope::Call,
        json!({
            "type": "messageReceived",
            "call": {"uuid": "c1"},
            "callMessage": {"content": {"hello": "world"}, "messageType": "user-defined-message",
                            "voiceEventSid": "KX9"},
        }),
    )?;
    match events.try_recv()? {
        CallEvent::MessageReceived(message) => {
            assert_eq!(message.content_type(), "application/json");
            assert_eq!(message.content(), &json!({"hello": "world"}));
            assert_eq!(message.sid(), Some("KX9"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    let err = publish(
        &voice,
        Scope::Call,
        json!({
            "type": "messageReceived",
            "call": {"uuid": "c1"},
            "callMessage": {"content": null, "messageType": "user-defined-message"},
        }),
    )
    .unwrap_err();
    assert!(matches!(err, VoiceError::InvalidArgument { .. }));
    assert_eq!(call.state(), CallState::Connecting);
    Ok(())
}

#[tokio::test]
async fn test_hold_and_mute_store_native_result() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    bridge.script("call_hold", ok(json!(false)));
    assert!(!call.hold(true).await?);
    assert!(!call.is_on_hold());
    assert_eq!(bridge.calls_to("call_hold"), vec![json!({"uuid": "c1", "hold": true})]);

    bridge.script("call_mute", ok(json!(true)));
    assert!(call.mute(true).await?);
    assert!(call.is_muted());
    Ok(())
}

#[tokio::test]
async fn test_operation_rejections_are_typed() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    bridge.script("call_disconnect", rejected_with_code(31005, "gone"));
    let err = call.disconnect().await.unwrap_err();
    assert_eq!(err.as_coded().map(|e| e.name()), Some("ConnectionError"));

    bridge.script("call_send_digits", rejected_with_name("InvalidArgumentError", "bad digit"));
    assert!(matches!(
        call.send_digits("12x").await,
        Err(VoiceError::InvalidArgument { ref message }) if message == "bad digit"
    ));

    bridge.script("call_mute", rejected_with_name("SomethingElse", "surprise"));
    assert!(matches!(
        call.mute(true).await,
        Err(VoiceError::UnexpectedNative { .. })
    ));
    assert!(!call.is_muted());

    // Nothing scripted: the bridge itself fails
    assert!(matches!(call.hold(true).await, Err(VoiceError::Transport(_))));

    bridge.script("call_send_digits", ok_unit());
    call.send_digits("123#").await?;
    Ok(())
}

#[tokio::test]
async fn test_listing_reuses_live_instances() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    bridge.script(
        "voice_get_calls",
        ok(json!([
            {"uuid": "c1", "state": "connected"},
            {"uuid": "c2", "state": "connected", "sid": "CA2"},
            {"uuid": "c3"},
        ])),
    );
    let calls = voice.get_calls().await?;
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], call);
    assert_ne!(calls[1], call);
    assert_eq!(voice.live_entities(), (3, 0));

    // A live instance keeps its own state; new ones start where native reports
    assert_eq!(calls[0].state(), CallState::Connecting);
    assert_eq!(calls[1].state(), CallState::Connected);
    assert_eq!(*calls[1].watch_state().borrow(), CallState::Connected);
    assert_eq!(calls[1].sid().as_deref(), Some("CA2"));
    assert_eq!(calls[2].state(), CallState::Connecting);
    Ok(())
}

#[tokio::test]
async fn test_dropping_last_handle_releases_subscription() {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;
    let clone = call.clone();
    assert_eq!(voice.bus().subscriber_count(Scope::Call), 1);

    drop(call);
    assert_eq!(voice.bus().subscriber_count(Scope::Call), 1);
    drop(clone);
    assert_eq!(voice.bus().subscriber_count(Scope::Call), 0);
    assert_eq!(voice.live_entities(), (0, 0));
}

#[tokio::test]
async fn test_dispose_stops_state_updates() -> anyhow::Result<()> {
    let (voice, bridge) = voice();
    let call = connected_call(&voice, &bridge, "c1").await;

    call.dispose();
    assert_eq!(voice.bus().subscriber_count(Scope::Call), 0);
    publish(&voice, Scope::Call, json!({"type": "connected", "call": {"uuid": "c1"}}))?;
    assert_eq!(call.state(), CallState::Connecting);
    Ok(())
}
