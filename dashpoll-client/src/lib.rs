//! Dashpoll HTTP Client
//!
//! A small HTTP client for reading JSON documents from a dashboard server.
//!
//! The client is the production `Transport` used by the polling executor:
//! every request resolves to a `PollOutcome` so callers never have to
//! deal with transport errors directly.
//!
//! # Example
//!
//! ```no_run
//! use dashpoll_client::DashboardClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashboardClient::new("http://localhost:8153");
//!     let payload = client.get_json("/go/agents.json").await?;
//!     println!("{}", payload.as_value());
//!     Ok(())
//! }
//! ```

pub mod error;
mod transport;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use transport::Transport;

use dashpoll_core::{LOGIN_PATH, Payload, PathResolver, is_absolute_url, resolve_url};
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

/// HTTP client for a dashboard server
#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// Origin of the server (e.g., "http://localhost:8153")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl DashboardClient {
    /// Create a new dashboard client
    ///
    /// # Arguments
    /// * `base_url` - Origin of the dashboard server (e.g., "http://localhost:8153")
    ///
    /// # Example
    /// ```
    /// use dashpoll_client::DashboardClient;
    ///
    /// let client = DashboardClient::new("http://localhost:8153");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a dashboard client on top of a prepared reqwest client
    ///
    /// Use this to bound connect and request time below the poll interval,
    /// so a hung server cannot hold a cycle open.
    ///
    /// # Example
    /// ```
    /// use dashpoll_client::DashboardClient;
    /// use std::time::Duration;
    ///
    /// let session = reqwest::Client::builder()
    ///     .connect_timeout(Duration::from_secs(1))
    ///     .timeout(Duration::from_secs(4))
    ///     .build()
    ///     .expect("reqwest client");
    ///
    /// let dashboard = DashboardClient::with_client("https://ci.example.com", session);
    /// assert_eq!(dashboard.base_url(), "https://ci.example.com");
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the origin of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turns an application path into a full URL
    ///
    /// Absolute `http://` and `https://` URLs are returned unchanged.
    pub fn absolute_url(&self, path: &str) -> Result<String> {
        if is_absolute_url(path) {
            return Ok(path.to_string());
        }
        if path.is_empty() {
            return Err(ClientError::InvalidUrl("empty path".to_string()));
        }
        if path.contains("://") {
            return Err(ClientError::InvalidUrl(path.to_string()));
        }

        Ok(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
    }

    /// URL of the login page under this server's origin
    pub fn login_url(&self, resolver: &dyn PathResolver) -> String {
        format!("{}{}", self.base_url, resolve_url(resolver, LOGIN_PATH))
    }

    /// GET a JSON document
    ///
    /// # Arguments
    /// * `path` - Application path or absolute URL
    ///
    /// # Returns
    /// The decoded body, or `ApiError` for non-2xx answers and
    /// `ParseError` for bodies that are not JSON
    pub async fn get_json(&self, path: &str) -> Result<Payload> {
        let url = self.absolute_url(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Map a non-2xx status to `ApiError`, otherwise decode the body
    async fn handle_response(&self, response: reqwest::Response) -> Result<Payload> {
        let status = response.status();
        // The body is best-effort context; the status alone decides the outcome.
        let body = response.text().await;

        if !status.is_success() {
            return Err(ClientError::api_error(
                status.as_u16(),
                body.unwrap_or_default(),
            ));
        }

        let body = body?;
        serde_json::from_str(&body)
            .map(Payload::new)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
