//! # Merkl Domain Layer
//!
//! This crate contains the pure business logic for adding content to a
//! Merkl cluster. It follows hexagonal architecture principles:
//!
//! - **Values**: content identifiers ([`Cid`]), DAG nodes ([`Node`]), add
//!   parameters and progress events
//! - **Ports**: trait definitions for the node store, the content DAG builder
//!   and file sources
//! - **Services**: the [`Adder`], which drives one add from files to a
//!   cluster root
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (S3, HTTP,
//! filesystem). Chunking and storage are expressed as traits that adapter
//! crates implement.
//!
//! ## Example
//!
//! ```rust
//! use merkl_domain::adder::{Adder, MemoryFileSource};
//! use merkl_domain::ports::{BuilderFactory, ClusterDagService};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example<D, B>(adder: Adder<D, B>)
//! where
//!     D: ClusterDagService,
//!     B: BuilderFactory<D>,
//! {
//!     let files = MemoryFileSource::from_files([("a.txt", "hello"), ("b.txt", "world")]);
//!     let root = adder.ingest(&CancellationToken::new(), files).await.unwrap();
//!     println!("Added: {}", root);
//! }
//! ```

pub mod adder;
pub mod cid;
pub mod dag;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use adder::{AddParams, AddedOutput, Adder, FileEntry, Layout};
pub use cid::{Cid, HashFunction, Prefix};
pub use dag::{Link, Node, NodeKind};
pub use error::{AddError, ErrorKind, Result};
pub use ports::{BuilderFactory, ClusterDagService, ContentDagBuilder, DagService, FileSource};
