//! Transport seam
//!
//! The executor issues its requests through this trait so that the HTTP
//! stack can be swapped out (tests use a scripted in-memory transport).

use async_trait::async_trait;
use dashpoll_core::PollOutcome;
use tracing::debug;

use crate::DashboardClient;
use crate::error::ClientError;

/// Something that can fetch a JSON document for a poll cycle
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and folds every result into a `PollOutcome`
    ///
    /// # Arguments
    /// * `url` - Resolved application path (e.g. `/go/agents.json`) or an absolute URL
    async fn fetch(&self, url: &str) -> PollOutcome;
}

#[async_trait]
impl Transport for DashboardClient {
    async fn fetch(&self, url: &str) -> PollOutcome {
        match self.get_json(url).await {
            Ok(payload) => PollOutcome::Success(payload),
            Err(ClientError::ApiError { status, .. }) => PollOutcome::HttpError(status),
            Err(e) => {
                debug!("Poll request to {} failed: {}", url, e);
                match e.status() {
                    Some(status) => PollOutcome::HttpError(status),
                    None => PollOutcome::TransportError(e.to_string()),
                }
            }
        }
    }
}
