//! Credential providers
//!
//! This module provides the token credential abstraction and the managed identity implementation.

mod credential;
mod managed;
#[cfg(test)]
pub(crate) mod testing;

pub use credential::{resource_for_scope, AccessToken, TokenCredential};
pub use managed::ManagedIdentityCredential;

/// Audience used when calling Azure Resource Manager protected endpoints
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
