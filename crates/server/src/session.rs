//! Identity provider seam.
//!
//! Sessions are managed by an external identity provider; the server only
//! resolves a bearer token to a stable user id and threads that id into
//! every engine call. The provider client is injected at startup.
use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Client for the hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to the user's stable id. `Ok(None)` means the
    /// session is unknown or expired, i.e. unauthenticated.
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError>;
}

/// Fixed token-to-user map, configured from settings. Stands in for the
/// hosted provider in local runs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticSessions {
    tokens: HashMap<String, String>,
}

impl StaticSessions {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: pairs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticSessions {
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// The authenticated caller, inserted as a request extension by the auth
/// middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);
