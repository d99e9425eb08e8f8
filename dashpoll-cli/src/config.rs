//! Configuration module
//!
//! Handles CLI configuration shared by every command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the dashboard server
    pub server_url: String,

    /// Context root the application is mounted under (e.g. `/go`)
    pub context_root: String,
}
