//! Cosmos DB client
//!
//! A minimal SQL API client: account, database and container handles plus the
//! container abstraction the seed handler writes through.

mod client;
mod container;

pub use client::{account_scope, parse_endpoint, ContainerClient, CosmosClient, DatabaseClient};
pub use container::{ContainerProperties, DocumentContainer, PartitionKeyDefinition};
