//! In-memory node store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use merkl_domain::ports::DagService;
use merkl_domain::{AddError, Cid, Node, Result};

/// A [`DagService`] keeping every node in a process-local map
#[derive(Debug, Default)]
pub struct MemoryDagService {
    nodes: RwLock<HashMap<Cid, Node>>,
}

impl MemoryDagService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes
    pub fn len(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DagService for MemoryDagService {
    async fn add(&self, node: Node) -> Result<()> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node.cid().clone(), node);
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> Result<Node> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cid)
            .cloned()
            .ok_or_else(|| AddError::NotFound(cid.clone()))
    }

    async fn remove(&self, cid: &Cid) -> Result<()> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(cid);
        Ok(())
    }

    async fn has(&self, cid: &Cid) -> Result<bool> {
        Ok(self
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(cid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use merkl_domain::Prefix;

    fn node(data: &'static str) -> Node {
        Node::raw(&Prefix::for_cid_version(1).unwrap(), Bytes::from_static(data.as_bytes()))
    }

    #[tokio::test]
    async fn test_add_get_remove() {
        let store = MemoryDagService::new();
        let node = node("block");
        let cid = node.cid().clone();

        store.add(node.clone()).await.unwrap();
        assert!(store.has(&cid).await.unwrap());
        assert_eq!(store.get(&cid).await.unwrap(), node);

        store.remove(&cid).await.unwrap();
        assert!(!store.has(&cid).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_node() {
        let store = MemoryDagService::new();
        let cid = node("absent").cid().clone();

        let err = store.get(&cid).await.unwrap_err();
        assert!(matches!(err, AddError::NotFound(_)));
        // Removing a missing node is fine.
        store.remove(&cid).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let store = MemoryDagService::new();
        store.add(node("same")).await.unwrap();
        store.add(node("same")).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
