use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::credential::{resource_for_scope, AccessToken, TokenCredential};
use crate::config::{IdentityConfig, IdentitySource};
use crate::error::{Error, Result};

const IMDS_TOKEN_PATH: &str = "/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Token credential backed by the host's managed identity endpoint
pub struct ManagedIdentityCredential {
    client: Client,
    config: IdentityConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Option<Value>,
}

impl ManagedIdentityCredential {
    /// Create a credential for the detected identity source
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Authentication(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the token request URL for a resource
    pub(crate) fn token_url(&self, resource: &str) -> Result<Url> {
        let (base, api_version) = match &self.config.source {
            IdentitySource::AppService { endpoint, .. } => {
                (endpoint.clone(), APP_SERVICE_API_VERSION)
            }
            IdentitySource::Imds { authority_host } => (
                format!("{}{}", authority_host.trim_end_matches('/'), IMDS_TOKEN_PATH),
                IMDS_API_VERSION,
            ),
        };

        let mut url = Url::parse(&base).map_err(|e| {
            Error::Authentication(format!("Invalid identity endpoint '{}': {}", base, e))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", api_version);
            query.append_pair("resource", resource);
            if let Some(ref client_id) = self.config.client_id {
                query.append_pair("client_id", client_id);
            }
        }

        Ok(url)
    }

    fn source_name(&self) -> &'static str {
        match self.config.source {
            IdentitySource::AppService { .. } => "App Service",
            IdentitySource::Imds { .. } => "IMDS",
        }
    }
}

#[async_trait::async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = resource_for_scope(scope);
        let url = self.token_url(resource)?;
        debug!(
            "Requesting managed identity token from {} for {}",
            self.source_name(),
            resource
        );

        let mut request = self.client.get(url);
        request = match &self.config.source {
            IdentitySource::AppService { header, .. } => request.header("X-IDENTITY-HEADER", header),
            IdentitySource::Imds { .. } => request.header("Metadata", "true"),
        };

        let response = request.send().await.map_err(|e| {
            Error::Authentication(format!(
                "Managed identity endpoint ({}) is unreachable: {}",
                self.source_name(),
                e
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Managed identity request failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            Error::Authentication(format!("Failed to parse managed identity response: {}", e))
        })?;

        info!("Acquired managed identity token for {}", resource);
        Ok(AccessToken::new(
            token.access_token,
            token.expires_on.as_ref().and_then(parse_expires_on),
        ))
    }
}

/// `expires_on` arrives as epoch seconds, as a string from IMDS and sometimes as a number
fn parse_expires_on(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    DateTime::from_timestamp(seconds, 0)
}
