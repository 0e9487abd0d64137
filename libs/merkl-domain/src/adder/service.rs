//! The adder - ingestion orchestration
//!
//! An [`Adder`] drives one content DAG builder over a file source and hands
//! the resulting content root to a [`ClusterDagService`] for finalization.
//!
//! ## Lifecycle
//!
//! An adder is single-use: `Idle -> Running -> Done | Failed | Cancelled`.
//! Any further call to [`Adder::ingest`] fails with `AddError::Cancelled`
//! without touching the builder or the cluster service, including calls that
//! race with the first one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{output_channel, AddParams, FileEntry, MemoryFileSource, OutputSender};
use crate::cid::Cid;
use crate::error::{AddError, Result};
use crate::ports::{
    BuilderFactory, BuilderOptions, ClusterDagService, ContentDagBuilder, FileSource,
};

/// Where an adder is in its single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdderState {
    Idle,
    Running,
    Done,
    Failed,
    Cancelled,
}

/// Adds content to the cluster through a [`ClusterDagService`]
///
/// The service is shared and never owned; the adder owns its cancellation
/// token and the write side of its output channel for the duration of one run.
pub struct Adder<D, B> {
    dag: Arc<D>,
    builder: B,
    params: AddParams,
    output: Mutex<Option<OutputSender>>,
    started: AtomicBool,
    cancel: OnceLock<CancellationToken>,
    state: Mutex<AdderState>,
}

impl<D, B> Adder<D, B>
where
    D: ClusterDagService,
    B: BuilderFactory<D>,
{
    /// Create an adder
    ///
    /// Progress events go to `output`. When it is `None` the adder creates
    /// its own channel and drains it in a background task, so callers that
    /// ignore progress never block on channel capacity. That task ends when
    /// the run closes the channel (or the adder is dropped unused). Must be
    /// called within a Tokio runtime.
    pub fn new(dag: Arc<D>, builder: B, params: AddParams, output: Option<OutputSender>) -> Self {
        let output = output.unwrap_or_else(|| {
            let (tx, mut rx) = output_channel();
            tokio::spawn(async move { while rx.recv().await.is_some() {} });
            tx
        });

        Self {
            dag,
            builder,
            params,
            output: Mutex::new(Some(output)),
            started: AtomicBool::new(false),
            cancel: OnceLock::new(),
            state: Mutex::new(AdderState::Idle),
        }
    }

    pub fn params(&self) -> &AddParams {
        &self.params
    }

    pub fn state(&self) -> AdderState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: AdderState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Add in-memory entries. The adder is spent afterwards.
    pub async fn from_entries(
        &self,
        cancel: &CancellationToken,
        entries: impl IntoIterator<Item = FileEntry>,
    ) -> Result<Cid> {
        self.ingest(cancel, MemoryFileSource::new(entries)).await
    }

    /// Add every entry of `source` and return the cluster root
    ///
    /// Files are added in source order. Cancellation is observed between
    /// files. On every exit path the run's token is cancelled and the output
    /// channel is closed.
    ///
    /// # Errors
    ///
    /// - `AddError::Cancelled` if the adder was already used or `cancel` fires
    /// - `AddError::ConfigError` for unusable params, before any file is read
    /// - any error of the source, the builder or the cluster service, as is
    pub async fn ingest<S: FileSource>(&self, cancel: &CancellationToken, source: S) -> Result<Cid> {
        debug!(params = ?self.params, "adding from files");

        if self.started.swap(true, Ordering::AcqRel) {
            warn!("adder already used");
            return Err(AddError::Cancelled);
        }

        // Only the first call's token is ever honored.
        let token = self.cancel.get_or_init(|| cancel.child_token()).clone();
        let _spent = token.clone().drop_guard();
        let output = self
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        self.set_state(AdderState::Running);
        let result = match output {
            Some(output) if !token.is_cancelled() => self.run(&token, output, source).await,
            _ => Err(AddError::Cancelled),
        };

        self.set_state(match &result {
            Ok(_) => AdderState::Done,
            Err(AddError::Cancelled) => AdderState::Cancelled,
            Err(_) => AdderState::Failed,
        });
        result
    }

    async fn run<S: FileSource>(
        &self,
        token: &CancellationToken,
        output: OutputSender,
        mut source: S,
    ) -> Result<Cid> {
        let prefix = match self.params.prefix() {
            Ok(prefix) => prefix,
            Err(err) => {
                error!(error = %err, "invalid add params");
                return Err(err);
            }
        };

        let options = BuilderOptions {
            hidden: self.params.hidden,
            layout: self.params.layout,
            raw_leaves: self.params.raw_leaves,
            wrap: self.params.wrap,
            chunker: self.params.chunker.clone(),
            prefix,
            output,
            progress: self.params.progress,
        };

        let mut builder = match self.builder.new_builder(Arc::clone(&self.dag), options) {
            Ok(builder) => builder,
            Err(err) => {
                error!(error = %err, "failed to create DAG builder");
                return Err(err);
            }
        };

        loop {
            if token.is_cancelled() {
                warn!("add cancelled");
                return Err(AddError::Cancelled);
            }

            let file = match source.next_file().await {
                Ok(Some(file)) => file,
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "error reading next file");
                    return Err(err);
                }
            };

            let path = file.path().to_string();
            debug!(path = %path, "builder add_file");
            if let Err(err) = builder.add_file(file).await {
                error!(path = %path, error = %err, "error adding to cluster");
                return Err(err);
            }
        }

        let root = match builder.finalize().await {
            Ok(root) => root,
            Err(err) => {
                error!(error = %err, "error finalizing DAG");
                return Err(err);
            }
        };

        let cluster_root = match self.dag.finalize(token, root.cid().clone()).await {
            Ok(cid) => cid,
            Err(err) => {
                error!(root = %root.cid(), error = %err, "error finalizing adder");
                return Err(err);
            }
        };

        info!(cid = %cluster_root, "successfully added to cluster");
        Ok(cluster_root)
    }
}

impl<D, B> fmt::Debug for Adder<D, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adder")
            .field("params", &self.params)
            .field("started", &self.started.load(Ordering::Acquire))
            .finish()
    }
}
