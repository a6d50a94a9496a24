//! Configuration for the voice client
//!
//! # Usage Examples
//!
//! ```rust
//! use rvoip_voice_client::config::VoiceConfig;
//!
//! let config = VoiceConfig::new().with_event_capacity(64);
//! assert_eq!(config.event_capacity, 64);
//! assert!(config.validate().is_ok());
//!
//! let from_file = VoiceConfig::from_toml_str("event_capacity = 16").unwrap();
//! assert_eq!(from_file.event_capacity, 16);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{VoiceError, VoiceResult};
use crate::logging::LoggingConfig;

/// Default capacity of each entity's application event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Voice client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Capacity of the broadcast channel each Call, CallInvite and
    /// OutgoingCallMessage uses for application events. Receivers that fall
    /// further behind than this miss the oldest events.
    pub event_capacity: usize,

    /// Whether the event pump logs contract violations reported by handlers
    pub log_contract_violations: bool,

    /// Logging setup used by [`crate::logging::setup_logging`]
    pub logging: LoggingConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_contract_violations: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl VoiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-entity event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set whether the event pump logs contract violations
    pub fn with_contract_violation_logging(mut self, enabled: bool) -> Self {
        self.log_contract_violations = enabled;
        self
    }

    /// Set the logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Parse a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(input: &str) -> VoiceResult<Self> {
        let config: Self = toml::from_str(input)
            .map_err(|e| VoiceError::config(format!("invalid voice configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VoiceResult<()> {
        if self.event_capacity == 0 {
            return Err(VoiceError::config("event_capacity must be greater than zero"));
        }
        self.logging.validate()
    }
}
