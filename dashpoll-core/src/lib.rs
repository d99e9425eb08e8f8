//! Dashpoll Core
//!
//! Core types shared by the dashboard polling crates.
//!
//! This crate contains:
//! - Payloads: decoded JSON bodies and the error-signal check
//! - Outcomes: the single result type every poll request resolves to
//! - Sequence numbers: staleness bookkeeping for superseded requests
//! - Paths: resolving logical paths to application paths

pub mod outcome;
pub mod path;
pub mod payload;
pub mod sequence;

pub use outcome::PollOutcome;
pub use path::{ContextRoot, FALLBACK_ROOT, LOGIN_PATH, PathError, PathResolver, is_absolute_url, resolve_url};
pub use payload::Payload;
pub use sequence::SequenceNumber;
