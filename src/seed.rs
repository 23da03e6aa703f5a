use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::SeedRequest;
use crate::cosmos::{CosmosClient, DocumentContainer};
use crate::error::{Error, Result};
use crate::identity::TokenCredential;

/// Result of a completed seed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub container: String,
    /// Items the service acknowledged
    pub written: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully seeded {} items to container '{}'.",
            self.written, self.container
        )
    }
}

/// Load the records to seed from a file whose root is a JSON array
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path).map_err(|e| Error::file(path, e))?;

    match serde_json::from_str::<Value>(&contents).map_err(|e| Error::file(path, e))? {
        Value::Array(records) => Ok(records),
        other => Err(Error::file(
            path,
            format!("expected a JSON array at the root, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Upsert every record in order, stopping at the first failure.
///
/// Returns the number of records written. On failure the error carries the
/// number of records the service confirmed before it.
pub async fn upsert_all(container: &dyn DocumentContainer, records: &[Value]) -> Result<usize> {
    for (index, record) in records.iter().enumerate() {
        container
            .upsert_item(record)
            .await
            .map_err(|e| e.with_written(index))?;
        debug!(
            "Upserted item {}/{} into '{}'",
            index + 1,
            records.len(),
            container.name()
        );
    }

    Ok(records.len())
}

/// Seed a container from a JSON file
pub async fn seed(credential: &dyn TokenCredential, request: &SeedRequest) -> Result<SeedSummary> {
    let records = load_records(request.data_file())?;
    info!(
        "Loaded {} record(s) from {}",
        records.len(),
        request.data_file().display()
    );

    let client = CosmosClient::with_credential(&request.endpoint, credential).await?;
    let container = client
        .database_client(&request.database)
        .container_client(&request.container);

    let written = upsert_all(&container, &records).await?;
    info!(
        "Seeded {} record(s) into {}/{}",
        written, request.database, request.container
    );

    Ok(SeedSummary {
        container: request.container.clone(),
        written,
    })
}
