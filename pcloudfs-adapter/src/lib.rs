//! pCloud adapter for the `pcloudfs-common` filesystem contract.

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod path;
pub mod upload;

#[cfg(test)]
mod testing;

pub use adapter::PCloudAdapter;
pub use client::RemoteStorageClient;
pub use config::{AdapterConfig, Region};
pub use error::ClientError;
