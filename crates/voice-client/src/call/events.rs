//! Application events emitted by a [`Call`](super::Call)

use serde::{Deserialize, Serialize};

use crate::error::CodedError;
use crate::message::CallMessage;

/// Call quality degradation reported by the native media stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityWarning {
    /// Microphone input level has not changed for a while
    ConstantAudioInputLevel,
    HighJitter,
    HighPacketLoss,
    /// High round-trip time
    HighRtt,
    /// Low mean opinion score
    LowMos,
}

/// Events emitted by a call
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// Call connected
    Connected,
    /// Call could not be set up
    ConnectFailure(CodedError),
    /// Call ended, with the error that ended it if any
    Disconnected(Option<CodedError>),
    /// Connectivity lost, reconnection in progress
    Reconnecting(CodedError),
    /// Connectivity restored
    Reconnected,
    /// Remote party is being alerted
    Ringing,
    /// Set of active quality warnings changed
    QualityWarningsChanged {
        current: Vec<QualityWarning>,
        previous: Vec<QualityWarning>,
    },
    /// Message received from the remote party
    MessageReceived(CallMessage),
}
