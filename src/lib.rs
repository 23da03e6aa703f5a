//! Cosmos DB seeding and Azure Function triggering
//!
//! A library for pushing JSON records into a Cosmos DB container and calling
//! Azure Functions, authenticated with Managed Identity.

pub mod cli;
pub mod config;
pub mod cosmos;
pub mod error;
pub mod identity;
pub mod seed;
pub mod trigger;

pub use config::{IdentityConfig, SeedRequest, TriggerRequest};
pub use error::{Error, Result};
pub use identity::{ManagedIdentityCredential, TokenCredential};
pub use seed::{seed, SeedSummary};
pub use trigger::{trigger, TriggerOutcome};
