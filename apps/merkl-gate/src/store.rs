//! Node store selected at startup

use merkl_dag::MemoryDagService;
use merkl_domain::ports::DagService;
use merkl_domain::{Cid, Node, Result};
use merkl_s3::S3DagService;

/// Where the gate keeps blocks
///
/// `Memory` loses everything on restart; it exists for local runs and tests.
pub enum NodeStore {
    S3(S3DagService),
    Memory(MemoryDagService),
}

impl DagService for NodeStore {
    async fn add(&self, node: Node) -> Result<()> {
        match self {
            Self::S3(store) => store.add(node).await,
            Self::Memory(store) => store.add(node).await,
        }
    }

    async fn get(&self, cid: &Cid) -> Result<Node> {
        match self {
            Self::S3(store) => store.get(cid).await,
            Self::Memory(store) => store.get(cid).await,
        }
    }

    async fn remove(&self, cid: &Cid) -> Result<()> {
        match self {
            Self::S3(store) => store.remove(cid).await,
            Self::Memory(store) => store.remove(cid).await,
        }
    }

    async fn has(&self, cid: &Cid) -> Result<bool> {
        match self {
            Self::S3(store) => store.has(cid).await,
            Self::Memory(store) => store.has(cid).await,
        }
    }
}
