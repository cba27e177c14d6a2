//! Reqwest-based client for the Cloud Storage JSON API.
//!
//! # Example
//!
//! ```rust,ignore
//! use stowage_gcs::client::ReqwestClient;
//! use stowage_gcs::{GcsConfig, GcsLocation};
//!
//! let config = GcsConfig::new("my-project");
//! let client = ReqwestClient::new(config.clone())?;
//! let location = GcsLocation::new(config, client);
//! ```

mod client;
mod resource;

pub use client::ReqwestClient;

/// Tracing target for JSON API requests.
pub const TRACING_TARGET: &str = "stowage_gcs::reqwest";
