//! Poll counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters describing what an executor has done so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStats {
    /// Requests issued (equals the current sequence number)
    pub requests_issued: u64,
    /// Requests that ran their completion step, whatever the outcome
    pub completed: u64,
    /// Completions with a successful JSON response
    pub succeeded: u64,
    /// Individual observer notifications
    pub deliveries: u64,
    /// Timers armed after a completion
    pub timers_armed: u64,
    /// When the last completion step ran
    pub last_completed_at: Option<DateTime<Utc>>,
}
