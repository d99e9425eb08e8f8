//! Poll outcome
//!
//! A poll request resolves to exactly one of these variants, and the
//! executor handles all of them in a single completion step.

use crate::payload::Payload;

/// Result of one poll request
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// 2xx response with a decodable JSON body
    Success(Payload),
    /// Non-2xx response
    HttpError(u16),
    /// Connection, timeout or decoding failure
    TransportError(String),
    /// The request was cancelled before it resolved
    Aborted,
}

impl PollOutcome {
    pub const UNAUTHORIZED: u16 = 401;

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for a 401 response
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpError(status) if *status == Self::UNAUTHORIZED)
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }
}
