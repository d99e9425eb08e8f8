//! Login redirect
//!
//! A 401 from the polled endpoint means the session is gone. The executor
//! hands the login URL to a `LoginRedirect` and stops rescheduling.

use tracing::warn;

/// Receives the login URL when the server rejects the session
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, login_url: &str);
}

/// Redirect handler that only records the event in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoginRedirect;

impl LoginRedirect for LogLoginRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        warn!("Session rejected by server, login required at {}", login_url);
    }
}

impl<F> LoginRedirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect_to_login(&self, login_url: &str) {
        self(login_url)
    }
}
