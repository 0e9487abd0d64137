//! UnixFS-style content DAG builder
//!
//! Files are chunked, their leaves stored as they are read, and the leaves
//! linked with the configured layout. Added entries are kept in an in-memory
//! directory tree until [`finalize`](ContentDagBuilder::finalize) writes the
//! directory nodes and picks the root.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use merkl_domain::adder::{AddedOutput, FileContent, FileEntry, FileReader};
use merkl_domain::ports::{BuilderFactory, BuilderOptions, ContentDagBuilder, DagService};
use merkl_domain::{AddError, Node, NodeKind, Result};
use tracing::debug;

use crate::chunker::Chunker;
use crate::layout::{self, Part, MAX_LINKS};

/// Creates a [`UnixfsBuilder`] per add
#[derive(Debug, Clone, Copy)]
pub struct UnixfsBuilderFactory {
    max_links: usize,
}

impl UnixfsBuilderFactory {
    /// A factory whose builders put at most `max_links` links in a file node
    pub fn with_max_links(max_links: usize) -> Self {
        Self { max_links }
    }
}

impl Default for UnixfsBuilderFactory {
    fn default() -> Self {
        Self {
            max_links: MAX_LINKS,
        }
    }
}

impl<D: DagService> BuilderFactory<D> for UnixfsBuilderFactory {
    type Builder = UnixfsBuilder<D>;

    fn new_builder(&self, dag: Arc<D>, options: BuilderOptions) -> Result<UnixfsBuilder<D>> {
        let chunker = Chunker::parse(&options.chunker)?;
        Ok(UnixfsBuilder {
            dag,
            options,
            chunker,
            max_links: self.max_links,
            root: Directory::default(),
            finalized: false,
        })
    }
}

#[derive(Default)]
struct Directory {
    entries: BTreeMap<String, Entry>,
}

enum Entry {
    File(Node),
    Dir(Directory),
}

impl Directory {
    /// Walk to the directory at `components`, creating missing ones
    fn mkdir(&mut self, components: &[String]) -> Result<&mut Directory> {
        let mut dir = self;
        for name in components {
            let entry = dir
                .entries
                .entry(name.clone())
                .or_insert_with(|| Entry::Dir(Directory::default()));
            dir = match entry {
                Entry::Dir(sub) => sub,
                Entry::File(_) => {
                    return Err(AddError::source_failure(format!(
                        "'{name}' is a file, not a directory"
                    )))
                }
            };
        }
        Ok(dir)
    }

    fn insert_file(&mut self, components: &[String], node: Node) -> Result<()> {
        let Some((name, parents)) = components.split_last() else {
            return Err(AddError::source_failure("empty path"));
        };
        let dir = self.mkdir(parents)?;
        if dir.entries.contains_key(name) {
            return Err(AddError::source_failure(format!(
                "'{}' was added twice",
                components.join("/")
            )));
        }
        dir.entries.insert(name.clone(), Entry::File(node));
        Ok(())
    }
}

/// Builds file and directory DAGs into a [`DagService`]
pub struct UnixfsBuilder<D> {
    dag: Arc<D>,
    options: BuilderOptions,
    chunker: Chunker,
    max_links: usize,
    root: Directory,
    finalized: bool,
}

impl<D: DagService> UnixfsBuilder<D> {
    fn leaf(&self, chunk: Bytes) -> Result<Node> {
        if self.options.raw_leaves {
            return Ok(Node::raw(&self.options.prefix, chunk));
        }
        let len = chunk.len() as u64;
        Node::structured(&self.options.prefix, NodeKind::File, chunk, len, Vec::new())
    }

    /// Chunk and store one file, returning its root node
    async fn add_file_data(&self, reader: &mut FileReader) -> Result<Node> {
        let mut leaves = Vec::new();
        let mut first = None;

        while let Some(chunk) = self.chunker.next_chunk(reader).await? {
            let leaf = self.leaf(chunk)?;
            leaves.push(Part::of(&leaf));
            if first.is_none() {
                first = Some(leaf.clone());
            }
            self.dag.add(leaf).await?;
        }

        let first = match first {
            Some(leaf) => leaf,
            None => {
                let leaf = self.leaf(Bytes::new())?;
                leaves.push(Part::of(&leaf));
                self.dag.add(leaf.clone()).await?;
                leaf
            }
        };

        let nodes = layout::build(
            self.options.layout,
            &self.options.prefix,
            leaves,
            self.max_links,
        )?;
        let root = nodes.last().cloned().unwrap_or(first);
        for node in nodes {
            self.dag.add(node).await?;
        }
        Ok(root)
    }

    /// Build the directory nodes under `dir`, children first
    fn build_directory(&self, dir: Directory, nodes: &mut Vec<Node>) -> Result<Node> {
        let mut links = Vec::with_capacity(dir.entries.len());
        for (name, entry) in dir.entries {
            let child = match entry {
                Entry::File(node) => node,
                Entry::Dir(sub) => self.build_directory(sub, nodes)?,
            };
            links.push(child.link(name));
        }

        let node = Node::structured(
            &self.options.prefix,
            NodeKind::Directory,
            Bytes::new(),
            0,
            links,
        )?;
        nodes.push(node.clone());
        Ok(node)
    }

    async fn store_directory(&self, dir: Directory) -> Result<Node> {
        let mut nodes = Vec::new();
        let root = self.build_directory(dir, &mut nodes)?;
        for node in nodes {
            self.dag.add(node).await?;
        }
        Ok(root)
    }
}

impl<D: DagService> ContentDagBuilder for UnixfsBuilder<D> {
    async fn add_file(&mut self, file: FileEntry) -> Result<()> {
        if self.finalized {
            return Err(AddError::internal_error("builder already finalized"));
        }

        let (path, content) = file.into_parts();
        let components = split_path(&path)?;

        if !self.options.hidden && components.iter().any(|c| c.starts_with('.')) {
            debug!(path = %path, "skipping hidden entry");
            return Ok(());
        }

        let mut reader = match content {
            FileContent::Directory => {
                self.root.mkdir(&components)?;
                return Ok(());
            }
            FileContent::File(reader) => reader,
        };

        let node = self.add_file_data(&mut reader).await?;
        let event = AddedOutput {
            name: components.join("/"),
            cid: node.cid().clone(),
            size: node.size(),
            bytes: node.file_size(),
        };
        self.root.insert_file(&components, node)?;

        debug!(path = %event.name, cid = %event.cid, "file added");
        if self.options.progress && self.options.output.send(event).await.is_err() {
            debug!("progress listener went away");
        }
        Ok(())
    }

    async fn finalize(&mut self) -> Result<Node> {
        if self.finalized {
            return Err(AddError::internal_error("builder already finalized"));
        }
        self.finalized = true;

        let root = std::mem::take(&mut self.root);
        if !self.options.wrap && root.entries.len() == 1 {
            if let Some((_, entry)) = root.entries.into_iter().next() {
                return match entry {
                    Entry::File(node) => Ok(node),
                    Entry::Dir(dir) => self.store_directory(dir).await,
                };
            }
            return Err(AddError::internal_error("root directory emptied"));
        }

        self.store_directory(root).await
    }
}

/// Split a `/` separated path, dropping empty and `.` components
fn split_path(path: &str) -> Result<Vec<String>> {
    let mut components = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                return Err(AddError::source_failure(format!(
                    "path '{path}' leaves its root"
                )))
            }
            other => components.push(other.to_string()),
        }
    }

    if components.is_empty() {
        return Err(AddError::source_failure(format!("invalid path '{path}'")));
    }
    Ok(components)
}
