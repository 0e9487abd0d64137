//! Ports (trait definitions) for external dependencies
//!
//! The adder depends on three capabilities it does not implement itself:
//!
//! - a node store with a cluster-specific finalize step ([`ClusterDagService`])
//! - a content DAG builder that chunks and links files ([`ContentDagBuilder`],
//!   created per run through a [`BuilderFactory`])
//! - an ordered stream of inputs ([`FileSource`])
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` so every adapter is monomorphized into the adder.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adder::{AddedOutput, FileEntry, Layout};
use crate::cid::{Cid, Prefix};
use crate::dag::Node;
use crate::error::Result;

/// Port for content-addressed node storage
///
/// Implementations must be safe for concurrent use: one store is shared by
/// every adder of a process.
pub trait DagService: Send + Sync {
    /// Store a node under its identifier. Storing an existing node is a no-op.
    fn add(&self, node: Node) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a node
    ///
    /// # Errors
    ///
    /// Returns `AddError::NotFound` if the store does not hold `cid`
    fn get(&self, cid: &Cid) -> impl Future<Output = Result<Node>> + Send;

    /// Remove a node. Removing a missing node is not an error.
    fn remove(&self, cid: &Cid) -> impl Future<Output = Result<()>> + Send;

    /// Check whether a node is stored
    fn has(&self, cid: &Cid) -> impl Future<Output = Result<bool>> + Send;
}

/// A [`DagService`] plus the cluster-level finalize step
///
/// Swapping the implementation changes how the content root is wrapped,
/// re-rooted or pinned without touching the adder.
pub trait ClusterDagService: DagService {
    /// Receive the content root produced by the DAG builder and return the
    /// cluster root. Called once per successful add, after the builder has
    /// finalized.
    fn finalize(
        &self,
        cancel: &CancellationToken,
        root: Cid,
    ) -> impl Future<Output = Result<Cid>> + Send;
}

/// Per-run settings handed to a [`BuilderFactory`]
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    pub hidden: bool,
    pub layout: Layout,
    pub raw_leaves: bool,
    pub wrap: bool,
    pub chunker: String,
    /// Fixed for the whole run
    pub prefix: Prefix,
    pub output: tokio::sync::mpsc::Sender<AddedOutput>,
    pub progress: bool,
}

/// Incremental content DAG construction
pub trait ContentDagBuilder: Send {
    /// Chunk, link and store one entry
    fn add_file(&mut self, file: FileEntry) -> impl Future<Output = Result<()>> + Send;

    /// Close the run and return the content root. Callable once.
    fn finalize(&mut self) -> impl Future<Output = Result<Node>> + Send;
}

/// Creates a fresh [`ContentDagBuilder`] for each run
pub trait BuilderFactory<D>: Send + Sync {
    type Builder: ContentDagBuilder;

    /// # Errors
    ///
    /// Returns `AddError::ConfigError` when the options are unusable
    /// (e.g. an unknown chunker)
    fn new_builder(&self, dag: Arc<D>, options: BuilderOptions) -> Result<Self::Builder>;
}

/// A finite, ordered, non-restartable stream of inputs
pub trait FileSource: Send {
    /// The next entry, or `None` once the source is exhausted
    fn next_file(&mut self) -> impl Future<Output = Result<Option<FileEntry>>> + Send;
}
