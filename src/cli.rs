//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and routes commands to the seed and trigger handlers.

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{IdentityConfig, SeedRequest, TriggerRequest};
use crate::identity::{ManagedIdentityCredential, TokenCredential};
use crate::seed;
use crate::trigger;

#[derive(Parser)]
#[command(name = "azs")]
#[command(about = "CLI tool to seed Cosmos DB and trigger Azure Function", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Client id of a user-assigned managed identity (system-assigned when omitted)
    #[arg(long, env = "AZURE_CLIENT_ID", global = true)]
    pub managed_identity_client_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed data into Cosmos DB
    Seed {
        /// The URL of the Cosmos DB account
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        cosmos_url: String,

        /// The name of the database
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        db_name: String,

        /// The name of the container
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        container_name: String,

        /// Path to the JSON file containing data
        #[arg(long, value_parser = existing_file)]
        data_file: PathBuf,
    },

    /// Trigger the Azure serverless function
    Trigger {
        /// The URL of the Azure serverless function
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        function_url: String,
    },
}

fn existing_file(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Path '{}' does not exist.", value))
    }
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let identity = IdentityConfig::from_env(cli.managed_identity_client_id);
    if let Some(ref client_id) = identity.client_id {
        info!("Using user-assigned managed identity {}", client_id);
    }

    let credential = ManagedIdentityCredential::new(identity)
        .context("Failed to create managed identity credential")?;

    let message = run(cli.command, &credential).await?;
    println!("{}", message);
    Ok(())
}

/// Run a command against the given credential and return the line to print
pub async fn run(command: Commands, credential: &dyn TokenCredential) -> Result<String> {
    match command {
        Commands::Seed {
            cosmos_url,
            db_name,
            container_name,
            data_file,
        } => {
            let request = SeedRequest::new(cosmos_url, db_name, container_name, data_file)?;
            let summary = seed::seed(credential, &request)
                .await
                .with_context(|| format!("Failed to seed container '{}'", request.container))?;
            Ok(summary.to_string())
        }

        Commands::Trigger { function_url } => {
            let request = TriggerRequest::new(function_url)?;
            let outcome = trigger::trigger(credential, &request)
                .await
                .context("Failed to trigger the Azure Function")?;
            if !outcome.is_success() {
                warn!("Function at {} did not accept the trigger", request.function_url);
            }
            Ok(outcome.to_string())
        }
    }
}
