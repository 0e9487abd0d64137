//! Content-addressed DAG nodes
//!
//! A [`Node`] is an immutable block together with its identifier. Raw leaves
//! hold file bytes verbatim; structured nodes (file trees and directories)
//! carry a small JSON body with their links.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cid::{Cid, Codec, Prefix};
use crate::error::{AddError, Result};

/// What a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Raw,
    File,
    Directory,
}

/// A named edge to another node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Entry name, empty for file chunks
    pub name: String,
    pub cid: Cid,
    /// Cumulative size of the linked sub-DAG
    pub size: u64,
}

#[derive(Serialize, Deserialize)]
struct NodeBody {
    kind: NodeKind,
    #[serde(with = "hex::serde")]
    data: Vec<u8>,
    file_size: u64,
    links: Vec<Link>,
}

/// An immutable, content-addressed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    cid: Cid,
    kind: NodeKind,
    data: Bytes,
    file_size: u64,
    links: Vec<Link>,
    encoded: Bytes,
}

impl Node {
    /// A leaf holding `data` without framing
    pub fn raw(prefix: &Prefix, data: Bytes) -> Self {
        let cid = prefix.with_codec(Codec::Raw).sum(&data);
        Self {
            cid,
            kind: NodeKind::Raw,
            file_size: data.len() as u64,
            data: data.clone(),
            links: Vec::new(),
            encoded: data,
        }
    }

    /// A structured node
    pub fn structured(
        prefix: &Prefix,
        kind: NodeKind,
        data: Bytes,
        file_size: u64,
        links: Vec<Link>,
    ) -> Result<Self> {
        if kind == NodeKind::Raw {
            return Err(AddError::internal_error(
                "raw nodes cannot be built as structured nodes",
            ));
        }
        let body = NodeBody {
            kind,
            data: data.to_vec(),
            file_size,
            links,
        };
        let encoded = serde_json::to_vec(&body)
            .map_err(|e| AddError::internal_error(format!("failed to encode node: {e}")))?;
        let cid = prefix.with_codec(Codec::DagJson).sum(&encoded);

        Ok(Self {
            cid,
            kind,
            data,
            file_size,
            links: body.links,
            encoded: Bytes::from(encoded),
        })
    }

    /// Rebuild a node from its stored bytes, verifying them against `cid`
    pub fn decode(cid: Cid, encoded: Bytes) -> Result<Self> {
        if !cid.hash().verify(&encoded) {
            return Err(AddError::storage_failure(format!(
                "block content does not match {cid}"
            )));
        }

        match cid.codec() {
            Codec::Raw => Ok(Self {
                cid,
                kind: NodeKind::Raw,
                file_size: encoded.len() as u64,
                data: encoded.clone(),
                links: Vec::new(),
                encoded,
            }),
            Codec::DagJson => {
                let body: NodeBody = serde_json::from_slice(&encoded).map_err(|e| {
                    AddError::storage_failure(format!("malformed node {cid}: {e}"))
                })?;
                Ok(Self {
                    cid,
                    kind: body.kind,
                    data: Bytes::from(body.data),
                    file_size: body.file_size,
                    links: body.links,
                    encoded,
                })
            }
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Inline file bytes (leaves only)
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of file bytes under this node
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// The bytes the identifier was computed over
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    /// Encoded size of this node plus everything it links to
    pub fn size(&self) -> u64 {
        self.encoded.len() as u64 + self.links.iter().map(|l| l.size).sum::<u64>()
    }

    /// A link to this node under `name`
    pub fn link(&self, name: impl Into<String>) -> Link {
        Link {
            name: name.into(),
            cid: self.cid.clone(),
            size: self.size(),
        }
    }
}
