//! Azure API interaction module
//!
//! Core functionality for talking to Azure Resource Manager: service
//! principal authentication, the HTTP layer, and long-running operations.
//!
//! # Module Structure
//!
//! - [`auth`] - Service principal credentials and token caching
//! - [`client`] - Main client: URL building, requests, operation polling
//! - [`http`] - HTTP utilities and ARM error classification
//!
//! # Example
//!
//! ```ignore
//! use tanf::azure::{auth::ServicePrincipal, client::AzureClient};
//!
//! async fn example() -> tanf::Result<()> {
//!     let principal = ServicePrincipal::from_env()?;
//!     let client = AzureClient::from_service_principal(principal, "my-subscription")?;
//!     let accounts = client.get(&client.resource_group_url("my-rg", "providers/Microsoft.NetApp/netAppAccounts")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
