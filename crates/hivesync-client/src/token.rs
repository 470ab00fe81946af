//! Bearer credential seam.

use std::fmt;

/// Supplies the bearer credential attached to each API call.
///
/// Returning `None` means no credential is available; calls fail fast with
/// an authentication error and are never retried.
pub trait TokenProvider: Send + Sync + fmt::Debug + 'static {
    /// The current bearer token, if any.
    fn bearer_token(&self) -> Option<String>;
}

/// Token provider backed by a fixed string (tests, long-lived API keys).
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    /// Provider that always returns the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Provider with no credential.
    pub fn empty() -> Self {
        Self { token: None }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
