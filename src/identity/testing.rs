use std::sync::Mutex;

use super::credential::{AccessToken, TokenCredential};
use crate::error::{Error, Result};

/// Hands out a fixed token and remembers which scopes were asked for
pub(crate) struct StaticCredential {
    token: String,
    pub scopes: Mutex<Vec<String>>,
}

impl StaticCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            scopes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.scopes.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        self.scopes.lock().unwrap().push(scope.to_string());
        Ok(AccessToken::new(self.token.clone(), None))
    }
}

/// Behaves like a host with no managed identity
pub(crate) struct NoIdentity;

#[async_trait::async_trait]
impl TokenCredential for NoIdentity {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Err(Error::Authentication(
            "no managed identity available".to_string(),
        ))
    }
}
