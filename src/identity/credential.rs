use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Result;

/// A bearer token issued by the identity service
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Trait for anything that can hand out bearer tokens for a scope
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token for the given scope (e.g. `https://management.azure.com/.default`)
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// Convert an OAuth2 v2 scope into the v1 resource the managed identity endpoints expect
pub fn resource_for_scope(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}
