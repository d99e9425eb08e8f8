//! Application path resolution
//!
//! Dashboard endpoints are addressed by logical paths such as
//! `agents.json`. A resolver maps them under the application's context
//! root. When no resolver can produce a path, `resolve_url` falls back to
//! the fixed `/go/` prefix. Absolute `http(s)://` URLs bypass resolution.

use thiserror::Error;

/// Prefix used when path resolution fails
pub const FALLBACK_ROOT: &str = "/go/";

/// Logical path of the login page
pub const LOGIN_PATH: &str = "auth/login";

/// Errors raised by a path resolver
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The resolver has no context root to resolve against
    #[error("context root is not available")]
    Unavailable,

    /// The path cannot be placed under the context root
    #[error("invalid path: {0}")]
    Invalid(String),
}

/// Maps a logical path to an absolute application path
pub trait PathResolver: Send + Sync {
    fn context_path(&self, path: &str) -> Result<String, PathError>;
}

/// Resolves paths under a fixed context root (e.g. `/go`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextRoot {
    root: String,
}

impl ContextRoot {
    /// Creates a resolver for the given root
    ///
    /// A missing leading slash is added and trailing slashes are dropped,
    /// so `go`, `/go` and `/go/` are equivalent.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let trimmed = root.trim().trim_end_matches('/');
        let root = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self { root }
    }

    /// A resolver with no root; every resolution fails
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl PathResolver for ContextRoot {
    fn context_path(&self, path: &str) -> Result<String, PathError> {
        if self.root.is_empty() {
            return Err(PathError::Unavailable);
        }

        let path = path.trim();
        if path.is_empty() {
            return Err(PathError::Invalid("path is empty".to_string()));
        }
        if path.contains("://") {
            return Err(PathError::Invalid(format!(
                "{} is already an absolute URL",
                path
            )));
        }

        Ok(format!("{}/{}", self.root, path.trim_start_matches('/')))
    }
}

/// Returns true for `http://` and `https://` URLs
pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Resolves `path` through `resolver`, falling back to `/go/<path>`
///
/// Absolute URLs are returned unchanged.
pub fn resolve_url(resolver: &dyn PathResolver, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }

    match resolver.context_path(path) {
        Ok(resolved) => resolved,
        Err(_) => format!("{}{}", FALLBACK_ROOT, path),
    }
}
