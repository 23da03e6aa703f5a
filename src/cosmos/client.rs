use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::container::{ContainerProperties, DocumentContainer, PartitionKeyDefinition};
use crate::error::{Error, Result};
use crate::identity::{AccessToken, TokenCredential};

// Hierarchical (MultiHash) partition keys need 2020-07-15 or later
const API_VERSION: &str = "2020-07-15";

/// Cosmos DB account client speaking the SQL API over REST
#[derive(Clone)]
pub struct CosmosClient {
    client: Client,
    endpoint: Url,
    authorization: String,
}

impl CosmosClient {
    /// Create a client from an account endpoint and an Entra ID token
    pub fn new(endpoint: Url, token: &AccessToken) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::connection(format!("Failed to create HTTP client: {}", e)))?;

        let authorization = url::form_urlencoded::byte_serialize(
            format!("type=aad&ver=1.0&sig={}", token.token).as_bytes(),
        )
        .collect();

        Ok(Self {
            client,
            endpoint,
            authorization,
        })
    }

    /// Acquire a token scoped to the account and create a client with it
    pub async fn with_credential(endpoint: &str, credential: &dyn TokenCredential) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let token = credential.get_token(&account_scope(&endpoint)).await?;
        Self::new(endpoint, &token)
    }

    pub fn database_client(&self, name: &str) -> DatabaseClient {
        DatabaseClient {
            account: self.clone(),
            name: name.to_string(),
        }
    }

    fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::InvalidInput(format!("Cosmos DB endpoint cannot be a base URL: {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("authorization", &self.authorization)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-date", Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    }
}

/// Parse and sanity check an account endpoint such as `https://acct.documents.azure.com:443/`
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::InvalidInput(format!("Invalid Cosmos DB URL '{}': {}", endpoint, e)))?;

    if url.host_str().is_none() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "Cosmos DB URL must be an http(s) address: {}",
            endpoint
        )));
    }

    Ok(url)
}

/// Token scope for an account, e.g. `https://acct.documents.azure.com/.default`
pub fn account_scope(endpoint: &Url) -> String {
    format!(
        "{}://{}/.default",
        endpoint.scheme(),
        endpoint.host_str().unwrap_or_default()
    )
}

/// Handle to a database inside an account
pub struct DatabaseClient {
    account: CosmosClient,
    name: String,
}

impl DatabaseClient {
    pub fn container_client(&self, name: &str) -> ContainerClient {
        ContainerClient {
            account: self.account.clone(),
            database: self.name.clone(),
            name: name.to_string(),
            partition_key: OnceCell::new(),
        }
    }
}

/// Handle to a container; partition key paths are read once on first write
pub struct ContainerClient {
    account: CosmosClient,
    database: String,
    name: String,
    partition_key: OnceCell<PartitionKeyDefinition>,
}

impl ContainerClient {
    /// Read the container resource
    pub async fn read_properties(&self) -> Result<ContainerProperties> {
        let url = self
            .account
            .resource_url(&["dbs", &self.database, "colls", &self.name])?;
        debug!("Reading container properties from: {}", url);

        let response = self
            .account
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| Error::connection(format!("Failed to reach Cosmos DB: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::connection(format!(
                "Reading container '{}/{}' failed with status {}: {}",
                self.database, self.name, status, body
            )));
        }

        response.json().await.map_err(|e| {
            Error::connection(format!("Failed to parse container properties: {}", e))
        })
    }

    async fn partition_key(&self) -> Result<&PartitionKeyDefinition> {
        self.partition_key
            .get_or_try_init(|| async {
                let properties = self.read_properties().await?;
                let definition = properties.partition_key.unwrap_or_default();
                info!(
                    "Container '{}' partition key paths: {:?}",
                    properties.id, definition.paths
                );
                Ok::<_, Error>(definition)
            })
            .await
    }
}

#[async_trait::async_trait]
impl DocumentContainer for ContainerClient {
    async fn upsert_item(&self, item: &Value) -> Result<()> {
        let partition_key = self.partition_key().await?.header_value(item);
        let url = self
            .account
            .resource_url(&["dbs", &self.database, "colls", &self.name, "docs"])?;
        let id = item.get("id").and_then(Value::as_str).unwrap_or("<no id>");
        debug!("Upserting item '{}' to: {}", id, url);

        let mut request = self
            .account
            .request(Method::POST, url)
            .header("x-ms-documentdb-is-upsert", "True")
            .json(item);
        if let Some(value) = partition_key {
            request = request.header("x-ms-documentdb-partitionkey", value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::connection(format!("Failed to reach Cosmos DB: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::connection(format!(
                "Upsert of item '{}' failed with status {}: {}",
                id, status, body
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
