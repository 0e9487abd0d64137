//! # Merkl DAG
//!
//! Local implementations of the Merkl domain ports:
//!
//! - [`UnixfsBuilderFactory`] / [`UnixfsBuilder`]: the content DAG builder
//!   (fixed-size chunking, balanced and trickle layouts, raw leaves,
//!   directory trees)
//! - [`MemoryDagService`]: a process-local node store
//! - [`LocalClusterDagService`]: finalizes an add by pinning its root
//! - [`DirectoryFileSource`]: adds a local file tree
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use merkl_dag::{new_adder, LocalClusterDagService, MemoryDagService};
//! use merkl_domain::adder::MemoryFileSource;
//! use merkl_domain::AddParams;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> merkl_domain::Result<()> {
//! let dag = Arc::new(LocalClusterDagService::new(MemoryDagService::new()));
//! let adder = new_adder(dag, AddParams::default(), None);
//!
//! let files = MemoryFileSource::from_files([("a.txt", "hello")]);
//! let root = adder.ingest(&CancellationToken::new(), files).await?;
//! println!("Added: {}", root);
//! # Ok(())
//! # }
//! ```

mod builder;
mod chunker;
mod cluster;
mod layout;
mod memory;
mod source;

use std::sync::Arc;

use merkl_domain::adder::{Adder, OutputSender};
use merkl_domain::ports::ClusterDagService;
use merkl_domain::AddParams;

pub use builder::{UnixfsBuilder, UnixfsBuilderFactory};
pub use chunker::{Chunker, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
pub use cluster::{LocalClusterDagService, Pin};
pub use layout::{MAX_LINKS, TRICKLE_DEPTH_REPEAT};
pub use memory::MemoryDagService;
pub use source::DirectoryFileSource;

/// An adder using the UnixFS builder
pub fn new_adder<D: ClusterDagService>(
    dag: Arc<D>,
    params: AddParams,
    output: Option<OutputSender>,
) -> Adder<D, UnixfsBuilderFactory> {
    Adder::new(dag, UnixfsBuilderFactory::default(), params, output)
}
