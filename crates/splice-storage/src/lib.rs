//! S3-compatible object storage for the splice pipeline.
//!
//! This crate provides:
//! - The [`ObjectStore`] capability trait the pipeline stages depend on
//! - An S3-compatible client (AWS S3, MinIO, R2)
//! - Presigned GET URLs for handing sources to external tools
//! - File and byte uploads for segment artifacts and manifests

pub mod client;
pub mod error;
pub mod store;

pub use client::{S3Store, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use store::ObjectStore;
