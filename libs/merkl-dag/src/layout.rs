//! File DAG layouts
//!
//! Both layouts take the leaves of one file, in order, and return the
//! internal nodes linking them. The root is always the last node returned;
//! a single leaf needs no internal nodes and is its own root.
//!
//! - **Balanced**: leaves are grouped bottom-up, `max_links` per parent,
//!   until one node remains. All leaves sit at the same depth.
//! - **Trickle**: each node takes up to `max_links` leaves directly, then
//!   grows subtrees of depth 1, 2, ... with [`TRICKLE_DEPTH_REPEAT`] subtrees
//!   per depth. Suited to streaming reads from the front of the file.

use std::collections::VecDeque;

use bytes::Bytes;
use merkl_domain::{AddError, Cid, Layout, Link, Node, NodeKind, Prefix, Result};

/// Maximum links per internal node
pub const MAX_LINKS: usize = 174;

/// Subtrees of equal depth per trickle layer
pub const TRICKLE_DEPTH_REPEAT: usize = 4;

/// A built sub-DAG, as seen from its parent
#[derive(Debug, Clone)]
pub(crate) struct Part {
    cid: Cid,
    size: u64,
    file_size: u64,
}

impl Part {
    pub(crate) fn of(node: &Node) -> Self {
        Self {
            cid: node.cid().clone(),
            size: node.size(),
            file_size: node.file_size(),
        }
    }
}

/// Link `leaves` with the given layout
pub(crate) fn build(
    layout: Layout,
    prefix: &Prefix,
    leaves: Vec<Part>,
    max_links: usize,
) -> Result<Vec<Node>> {
    if leaves.is_empty() {
        return Err(AddError::internal_error("a file DAG needs at least one leaf"));
    }
    if max_links < 2 {
        return Err(AddError::config_error("nodes must allow at least 2 links"));
    }

    let mut nodes = Vec::new();
    if leaves.len() > 1 {
        match layout {
            Layout::Balanced => balanced(prefix, leaves, max_links, &mut nodes)?,
            Layout::Trickle => {
                let mut leaves = VecDeque::from(leaves);
                fill_trickle(prefix, &mut leaves, max_links, None, &mut nodes)?;
            }
        }
    }
    Ok(nodes)
}

fn parent(prefix: &Prefix, children: &[Part]) -> Result<Node> {
    let file_size = children.iter().map(|c| c.file_size).sum();
    let links = children
        .iter()
        .map(|c| Link {
            name: String::new(),
            cid: c.cid.clone(),
            size: c.size,
        })
        .collect();
    Node::structured(prefix, NodeKind::File, Bytes::new(), file_size, links)
}

fn balanced(
    prefix: &Prefix,
    mut level: Vec<Part>,
    max_links: usize,
    nodes: &mut Vec<Node>,
) -> Result<()> {
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(max_links));
        for group in level.chunks(max_links) {
            let node = parent(prefix, group)?;
            next.push(Part::of(&node));
            nodes.push(node);
        }
        level = next;
    }
    Ok(())
}

fn fill_trickle(
    prefix: &Prefix,
    leaves: &mut VecDeque<Part>,
    max_links: usize,
    max_depth: Option<usize>,
    nodes: &mut Vec<Node>,
) -> Result<Part> {
    let take = max_links.min(leaves.len());
    let mut children: Vec<Part> = leaves.drain(..take).collect();

    let mut depth = 1;
    while !leaves.is_empty() && max_depth.map_or(true, |max| depth < max) {
        for _ in 0..TRICKLE_DEPTH_REPEAT {
            if leaves.is_empty() {
                break;
            }
            children.push(fill_trickle(prefix, leaves, max_links, Some(depth), nodes)?);
        }
        depth += 1;
    }

    let node = parent(prefix, &children)?;
    let part = Part::of(&node);
    nodes.push(node);
    Ok(part)
}
