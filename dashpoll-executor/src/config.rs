//! Executor configuration
//!
//! Defines the tunable parameters of a polling executor: the poll
//! interval, whether `fire_now` cancels the request it supersedes, and how
//! observer delivery reacts to an observer it cannot serve.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default time between the end of one poll and the start of the next
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// What observer delivery does when it meets an observer that is not
/// listening, or one that drops expired responses while the current
/// response is stale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Stop delivering for the rest of the cycle
    #[default]
    HaltCycle,
    /// Skip only that observer and keep going
    SkipObserver,
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be greater than 0")]
    ZeroInterval,
}

/// Polling executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Delay armed after each completed poll
    pub interval: Duration,

    /// Cancel the in-flight request when `fire_now` supersedes it
    ///
    /// Off by default: the superseded response still arrives and is
    /// delivered to observers that accept expired responses.
    pub abort_superseded: bool,

    /// Observer delivery behaviour
    pub delivery_policy: DeliveryPolicy,
}

impl ExecutorConfig {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            abort_superseded: false,
            delivery_policy: DeliveryPolicy::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }

    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}
