//! # Merkl S3 Adapter
//!
//! Implements the `DagService` port on top of AWS S3 (or any S3-compatible
//! store such as MinIO).

pub mod infrastructure;

pub use infrastructure::S3DagService;
