//! Call quality feedback values
//!
//! Both enumerations are closed. Conversions from raw strings or numbers
//! fail with [`VoiceError::InvalidArgument`], which lets
//! [`Call::post_feedback`](crate::call::Call::post_feedback) reject bad input
//! before anything reaches the native layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

/// Perceived call quality, `NotReported` or 1 (worst) to 5 (best)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FeedbackScore {
    NotReported,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl FeedbackScore {
    pub fn as_u8(&self) -> u8 {
        match self {
            FeedbackScore::NotReported => 0,
            FeedbackScore::One => 1,
            FeedbackScore::Two => 2,
            FeedbackScore::Three => 3,
            FeedbackScore::Four => 4,
            FeedbackScore::Five => 5,
        }
    }
}

impl From<FeedbackScore> for u8 {
    fn from(score: FeedbackScore) -> Self {
        score.as_u8()
    }
}

impl TryFrom<u8> for FeedbackScore {
    type Error = VoiceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FeedbackScore::NotReported),
            1 => Ok(FeedbackScore::One),
            2 => Ok(FeedbackScore::Two),
            3 => Ok(FeedbackScore::Three),
            4 => Ok(FeedbackScore::Four),
            5 => Ok(FeedbackScore::Five),
            other => Err(VoiceError::invalid_argument(format!(
                "feedback score must be between 0 and 5, got {}",
                other
            ))),
        }
    }
}

impl FromStr for FeedbackScore {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "not-reported" => Ok(FeedbackScore::NotReported),
            "1" | "one" => Ok(FeedbackScore::One),
            "2" | "two" => Ok(FeedbackScore::Two),
            "3" | "three" => Ok(FeedbackScore::Three),
            "4" | "four" => Ok(FeedbackScore::Four),
            "5" | "five" => Ok(FeedbackScore::Five),
            other => Err(VoiceError::invalid_argument(format!(
                "invalid feedback score \"{}\"",
                other
            ))),
        }
    }
}

impl TryFrom<&str> for FeedbackScore {
    type Error = VoiceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Problem the user experienced on the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackIssue {
    NotReported,
    DroppedCall,
    AudioLatency,
    OneWayAudio,
    ChoppyAudio,
    NoisyCall,
    Echo,
}

impl FeedbackIssue {
    /// Wire name of the issue
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackIssue::NotReported => "not-reported",
            FeedbackIssue::DroppedCall => "dropped-call",
            FeedbackIssue::AudioLatency => "audio-latency",
            FeedbackIssue::OneWayAudio => "one-way-audio",
            FeedbackIssue::ChoppyAudio => "choppy-audio",
            FeedbackIssue::NoisyCall => "noisy-call",
            FeedbackIssue::Echo => "echo",
        }
    }
}

impl fmt::Display for FeedbackIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackIssue {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-reported" => Ok(FeedbackIssue::NotReported),
            "dropped-call" => Ok(FeedbackIssue::DroppedCall),
            "audio-latency" => Ok(FeedbackIssue::AudioLatency),
            "one-way-audio" => Ok(FeedbackIssue::OneWayAudio),
            "choppy-audio" => Ok(FeedbackIssue::ChoppyAudio),
            "noisy-call" => Ok(FeedbackIssue::NoisyCall),
            "echo" => Ok(FeedbackIssue::Echo),
            other => Err(VoiceError::invalid_argument(format!(
                "invalid feedback issue \"{}\"",
                other
            ))),
        }
    }
}

impl TryFrom<&str> for FeedbackIssue {
    type Error = VoiceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
