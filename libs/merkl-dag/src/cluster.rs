//! Single-node cluster DAG service
//!
//! [`LocalClusterDagService`] stores nodes through any [`DagService`] and
//! finalizes an add by pinning its root locally. The root is returned
//! unchanged.

use std::future::Future;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use merkl_domain::ports::{ClusterDagService, DagService};
use merkl_domain::{AddError, Cid, Node, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A pinned root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    pub cid: Cid,
    pub pinned_at: DateTime<Utc>,
}

/// Cluster DAG service that pins roots on the local node
#[derive(Debug)]
pub struct LocalClusterDagService<D> {
    store: D,
    pins: RwLock<Vec<Pin>>,
}

impl<D: DagService> LocalClusterDagService<D> {
    pub fn new(store: D) -> Self {
        Self {
            store,
            pins: RwLock::new(Vec::new()),
        }
    }

    /// The underlying node store
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Pinned roots, oldest first
    pub fn pins(&self) -> Vec<Pin> {
        self.pins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_pinned(&self, cid: &Cid) -> bool {
        self.pins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|pin| &pin.cid == cid)
    }
}

impl<D: DagService> DagService for LocalClusterDagService<D> {
    fn add(&self, node: Node) -> impl Future<Output = Result<()>> + Send {
        self.store.add(node)
    }

    fn get(&self, cid: &Cid) -> impl Future<Output = Result<Node>> + Send {
        self.store.get(cid)
    }

    fn remove(&self, cid: &Cid) -> impl Future<Output = Result<()>> + Send {
        self.store.remove(cid)
    }

    fn has(&self, cid: &Cid) -> impl Future<Output = Result<bool>> + Send {
        self.store.has(cid)
    }
}

impl<D: DagService> ClusterDagService for LocalClusterDagService<D> {
    async fn finalize(&self, cancel: &CancellationToken, root: Cid) -> Result<Cid> {
        if cancel.is_cancelled() {
            return Err(AddError::Cancelled);
        }
        if !self.store.has(&root).await? {
            return Err(AddError::NotFound(root));
        }

        {
            let mut pins = self.pins.write().unwrap_or_else(PoisonError::into_inner);
            if !pins.iter().any(|pin| pin.cid == root) {
                pins.push(Pin {
                    cid: root.clone(),
                    pinned_at: Utc::now(),
                });
            }
        }

        info!(cid = %root, "root pinned");
        Ok(root)
    }
}
