//! Sequence number bookkeeping
//!
//! Every request a poller issues is tagged with the next sequence number.
//! A response is stale when its number is no longer the latest one issued.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing request tag
///
/// Starts at zero (no request issued yet) and never resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub const ZERO: Self = Self(0);

    /// Advances to the next number and returns it
    pub fn advance(&mut self) -> Self {
        self.0 += 1;
        *self
    }

    /// Returns true when `captured` is still the latest issued number
    pub fn is_current(&self, captured: SequenceNumber) -> bool {
        self.0 == captured.0
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut seq = SequenceNumber::default();
        assert_eq!(seq, SequenceNumber::ZERO);
        let first = seq.advance();
        let second = seq.advance();
        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert!(second > first);
    }

    #[test]
    fn test_superseded_number_is_not_current() {
        let mut seq = SequenceNumber::default();
        let first = seq.advance();
        assert!(seq.is_current(first));
        let second = seq.advance();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }
}
