use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const IDENTITY_ENDPOINT_VAR: &str = "IDENTITY_ENDPOINT";
const IDENTITY_HEADER_VAR: &str = "IDENTITY_HEADER";
const AUTHORITY_HOST_VAR: &str = "AZURE_POD_IDENTITY_AUTHORITY_HOST";

const DEFAULT_IMDS_HOST: &str = "http://169.254.169.254";

/// Where the managed identity token comes from, as advertised by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// App Service and Functions publish a local token endpoint and a shared secret header
    AppService { endpoint: String, header: String },
    /// Instance Metadata Service, reachable from VMs, scale sets and AKS nodes
    Imds { authority_host: String },
}

/// Managed identity settings detected from the hosting environment
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub source: IdentitySource,
    /// Client id of a user-assigned identity; `None` selects the system-assigned one
    pub client_id: Option<String>,
}

impl IdentityConfig {
    /// Detect the identity source from environment variables
    pub fn from_env(client_id: Option<String>) -> Self {
        Self::from_lookup(client_id, |name| std::env::var(name).ok())
    }

    /// Detect the identity source using `lookup` to resolve variable names
    pub fn from_lookup(client_id: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let source = match (var(IDENTITY_ENDPOINT_VAR), var(IDENTITY_HEADER_VAR)) {
            (Some(endpoint), Some(header)) => IdentitySource::AppService { endpoint, header },
            _ => IdentitySource::Imds {
                authority_host: var(AUTHORITY_HOST_VAR)
                    .unwrap_or_else(|| DEFAULT_IMDS_HOST.to_string()),
            },
        };

        Self {
            source,
            client_id: client_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

/// Validated arguments for a seed run
#[derive(Debug, Clone)]
pub struct SeedRequest {
    pub endpoint: String,
    pub database: String,
    pub container: String,
    pub data_file: PathBuf,
}

impl SeedRequest {
    pub fn new(
        endpoint: impl Into<String>,
        database: impl Into<String>,
        container: impl Into<String>,
        data_file: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: require("--cosmos-url", endpoint.into())?,
            database: require("--db-name", database.into())?,
            container: require("--container-name", container.into())?,
            data_file: data_file.into(),
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Validated arguments for a trigger run
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub function_url: String,
}

impl TriggerRequest {
    pub fn new(function_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            function_url: require("--function-url", function_url.into())?,
        })
    }
}

fn require(flag: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", flag)));
    }
    Ok(trimmed.to_string())
}
