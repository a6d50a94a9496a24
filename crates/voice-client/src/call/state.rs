//! Call states and the event → state table
//!
//! | event                    | next state     |
//! |--------------------------|----------------|
//! | `connected`              | `Connected`    |
//! | `connectFailure`         | `Disconnected` |
//! | `disconnected`           | `Disconnected` |
//! | `reconnecting`           | `Reconnecting` |
//! | `reconnected`            | `Connected`    |
//! | `ringing`                | `Ringing`      |
//! | `qualityWarningsChanged` | unchanged      |
//! | `messageReceived`        | unchanged      |
//!
//! Legal successors: `Connecting` → `Ringing` / `Connected` /
//! `Disconnected`; `Ringing` → `Connected` / `Disconnected`; `Connected` →
//! `Reconnecting` / `Disconnected`; `Reconnecting` → `Connected` /
//! `Disconnected`. `Disconnected` is terminal.

use serde::{Deserialize, Serialize};

use crate::native::events::NativeCallEvent;

/// Lifecycle state of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallState {
    /// Call is being set up
    #[default]
    Connecting,
    /// Remote party is being alerted
    Ringing,
    /// Media is flowing
    Connected,
    /// Connectivity was lost and is being restored
    Reconnecting,
    /// Call has ended
    Disconnected,
}

impl CallState {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Disconnected)
    }

    /// Whether `next` is a legal successor of this state
    ///
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(&self, next: CallState) -> bool {
        use CallState::*;

        if *self == next {
            return true;
        }
        matches!(
            (*self, next),
            (Connecting, Ringing | Connected | Disconnected)
                | (Ringing, Connected | Disconnected)
                | (Connected, Reconnecting | Disconnected)
                | (Reconnecting, Connected | Disconnected)
        )
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CallState::Connecting => "connecting",
            CallState::Ringing => "ringing",
            CallState::Connected => "connected",
            CallState::Reconnecting => "reconnecting",
            CallState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// State a native call event moves the call to, `None` for events that
/// leave state untouched
pub fn target_state(event: &NativeCallEvent) -> Option<CallState> {
    match event {
        NativeCallEvent::Connected { .. } => Some(CallState::Connected),
        NativeCallEvent::ConnectFailure { .. } => Some(CallState::Disconnected),
        NativeCallEvent::Disconnected { .. } => Some(CallState::Disconnected),
        NativeCallEvent::Reconnecting { .. } => Some(CallState::Reconnecting),
        NativeCallEvent::Reconnected { .. } => Some(CallState::Connected),
        NativeCallEvent::Ringing { .. } => Some(CallState::Ringing),
        NativeCallEvent::QualityWarningsChanged { .. } => None,
        NativeCallEvent::MessageReceived { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{NativeCallInfo, NativeErrorInfo};
    use serde_json::Value;

    fn info() -> NativeCallInfo {
        NativeCallInfo::new("c1")
    }

    fn error() -> NativeErrorInfo {
        NativeErrorInfo {
            code: 31005,
            message: "lost".to_string(),
        }
    }

    #[test]
    fn test_event_table() {
        let cases = vec![
            (NativeCallEvent::Connected { call: info() }, Some(CallState::Connected)),
            (
                NativeCallEvent::ConnectFailure { call: info(), error: error() },
                Some(CallState::Disconnected),
            ),
            (
                NativeCallEvent::Disconnected { call: info(), error: None },
                Some(CallState::Disconnected),
            ),
            (
                NativeCallEvent::Reconnecting { call: info(), error: error() },
                Some(CallState::Reconnecting),
            ),
            (NativeCallEvent::Reconnected { call: info() }, Some(CallState::Connected)),
            (NativeCallEvent::Ringing { call: info() }, Some(CallState::Ringing)),
            (
                NativeCallEvent::QualityWarningsChanged {
                    call: info(),
                    current_warnings: vec![],
                    previous_warnings: vec![],
                },
                None,
            ),
            (
                NativeCallEvent::MessageReceived { call: info(), call_message: Value::Null },
                None,
            ),
        ];
        for (event, expected) in cases {
            assert_eq!(target_state(&event), expected, "{:?}", event);
        }
    }

    #[test]
    fn test_transition_graph() {
        use CallState::*;
        assert!(Connecting.can_transition_to(Ringing));
        assert!(Connecting.can_transition_to(Disconnected));
        assert!(Ringing.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Reconnecting));
        assert!(Reconnecting.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Connected));

        assert!(!Disconnected.can_transition_to(Connected));
        assert!(!Connected.can_transition_to(Ringing));
        assert!(!Reconnecting.can_transition_to(Ringing));
        assert!(Disconnected.is_terminal());
        assert_eq!(CallState::default(), Connecting);
    }
}
