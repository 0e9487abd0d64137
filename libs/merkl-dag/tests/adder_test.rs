//! Integration tests for adding content end to end
//!
//! These tests verify that:
//! 1. The cluster root equals the builder's content root for a pass-through
//!    cluster service, with one progress event per file in input order
//! 2. Bad params fail before any node is stored
//! 3. Failed or cancelled adds never pin anything
//! 4. Roots depend only on content and params (hash, layout, version)
//! 5. Local directory trees add as a single directory root

use std::sync::Arc;

use merkl_dag::{
    new_adder, DirectoryFileSource, LocalClusterDagService, MemoryDagService,
    UnixfsBuilderFactory,
};
use merkl_domain::adder::{output_channel, Adder, FileEntry, Layout, MemoryFileSource};
use merkl_domain::cid::Version;
use merkl_domain::ports::{BuilderFactory, BuilderOptions, ContentDagBuilder, DagService, FileSource};
use merkl_domain::{AddError, AddParams, Cid, HashFunction, NodeKind, Result};
use tokio_util::sync::CancellationToken;

type Cluster = LocalClusterDagService<MemoryDagService>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn cluster() -> Arc<Cluster> {
    Arc::new(LocalClusterDagService::new(MemoryDagService::new()))
}

fn params_v1() -> AddParams {
    AddParams {
        cid_version: 1,
        hash_fun: "sha2-256".to_string(),
        ..Default::default()
    }
}

/// Run the builder directly, without an adder or cluster service
async fn content_root(params: &AddParams, files: &[(&str, &str)]) -> Cid {
    let (output, _rx) = output_channel();
    let options = BuilderOptions {
        hidden: params.hidden,
        layout: params.layout,
        raw_leaves: params.raw_leaves,
        wrap: params.wrap,
        chunker: params.chunker.clone(),
        prefix: params.prefix().unwrap(),
        output,
        progress: false,
    };
    let mut builder = UnixfsBuilderFactory::default()
        .new_builder(Arc::new(MemoryDagService::new()), options)
        .unwrap();

    for (path, data) in files {
        builder
            .add_file(FileEntry::from_bytes(*path, data.to_string()))
            .await
            .unwrap();
    }
    builder.finalize().await.unwrap().cid().clone()
}

async fn add(dag: Arc<Cluster>, params: AddParams, files: &[(&str, &str)]) -> Result<Cid> {
    let source = MemoryFileSource::from_files(files.iter().map(|(p, d)| (*p, d.to_string())));
    new_adder(dag, params, None)
        .ingest(&CancellationToken::new(), source)
        .await
}

/// Yields one file, then fails
struct BrokenSource {
    yielded: bool,
}

impl FileSource for BrokenSource {
    async fn next_file(&mut self) -> Result<Option<FileEntry>> {
        if self.yielded {
            return Err(AddError::source_failure("connection reset"));
        }
        self.yielded = true;
        Ok(Some(FileEntry::from_bytes("first.txt", "first")))
    }
}

#[tokio::test]
async fn test_two_files_end_to_end() {
    init_tracing();
    let dag = cluster();
    let (tx, mut rx) = output_channel();
    let params = AddParams {
        progress: true,
        ..params_v1()
    };
    let files = [("a.txt", "hello"), ("b.txt", "world")];

    let adder = new_adder(Arc::clone(&dag), params.clone(), Some(tx));
    let source = MemoryFileSource::from_files(files);
    let root = adder
        .ingest(&CancellationToken::new(), source)
        .await
        .expect("add should succeed");

    assert_eq!(root, content_root(&params, &files).await);
    assert!(dag.is_pinned(&root));

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(events[0].bytes, 5);

    // Two top-level files: the root is a directory listing both.
    let root_node = dag.get(&root).await.unwrap();
    assert_eq!(root_node.kind(), NodeKind::Directory);
    assert_eq!(root_node.links()[0].cid, events[0].cid);
    assert_eq!(root_node.links()[1].cid, events[1].cid);

    let hello = dag.get(&events[0].cid).await.unwrap();
    assert_eq!(hello.data().as_ref(), b"hello");
}

#[tokio::test]
async fn test_unknown_hash_stores_nothing() {
    let dag = cluster();
    let params = AddParams {
        hash_fun: "whirlpool".to_string(),
        ..Default::default()
    };

    let err = add(Arc::clone(&dag), params, &[("a.txt", "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, AddError::ConfigError(_)));
    assert!(dag.store().is_empty());
    assert!(dag.pins().is_empty());
}

#[tokio::test]
async fn test_bad_chunker_stores_nothing() {
    let dag = cluster();
    let params = AddParams {
        chunker: "rabin-262144".to_string(),
        ..Default::default()
    };

    let err = add(Arc::clone(&dag), params, &[("a.txt", "hello")])
        .await
        .unwrap_err();

    assert!(matches!(err, AddError::ConfigError(_)));
    assert!(dag.store().is_empty());
}

#[tokio::test]
async fn test_source_failure_pins_nothing() {
    let dag = cluster();
    let adder = new_adder(Arc::clone(&dag), params_v1(), None);

    let err = adder
        .ingest(&CancellationToken::new(), BrokenSource { yielded: false })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("connection reset"));
    assert!(dag.pins().is_empty());
    // The first file's blocks were written before the failure.
    assert!(!dag.store().is_empty());
}

#[tokio::test]
async fn test_cancelled_add_pins_nothing() {
    let dag = cluster();
    let token = CancellationToken::new();
    token.cancel();

    let adder = new_adder(Arc::clone(&dag), params_v1(), None);
    let err = adder
        .ingest(&token, MemoryFileSource::from_files([("a.txt", "hello")]))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(dag.pins().is_empty());
    assert!(dag.store().is_empty());
}

#[tokio::test]
async fn test_roots_are_deterministic() {
    let files = [("x", "same content")];
    let first = add(cluster(), params_v1(), &files).await.unwrap();
    let second = add(cluster(), params_v1(), &files).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_hash_function_applies_to_root() {
    let files = [("x", "same content")];
    let params = AddParams {
        hash_fun: "BLAKE3".to_string(),
        ..params_v1()
    };

    let sha = add(cluster(), params_v1(), &files).await.unwrap();
    let blake = add(cluster(), params, &files).await.unwrap();

    assert_ne!(sha, blake);
    assert_eq!(blake.hash().function(), HashFunction::Blake3);
}

#[tokio::test]
async fn test_layout_shapes_large_files() {
    let data = "0123456789".repeat(4);
    let run = |layout: Layout| {
        let data = data.clone();
        async move {
            let params = AddParams {
                layout,
                chunker: "size-1".to_string(),
                ..params_v1()
            };
            let adder = Adder::new(
                cluster(),
                UnixfsBuilderFactory::with_max_links(3),
                params,
                None,
            );
            adder
                .ingest(
                    &CancellationToken::new(),
                    MemoryFileSource::from_files([("big.bin", data)]),
                )
                .await
                .unwrap()
        }
    };

    assert_ne!(run(Layout::Balanced).await, run(Layout::Trickle).await);
}

#[tokio::test]
async fn test_cid_version_0_defaults() {
    let dag = cluster();
    let root = add(Arc::clone(&dag), AddParams::default(), &[("a.txt", "hello")])
        .await
        .unwrap();
    assert_eq!(root.version(), Version::V0);

    let params = AddParams {
        raw_leaves: true,
        ..Default::default()
    };
    let leaf = add(cluster(), params, &[("a.txt", "hello")]).await.unwrap();
    // A single raw leaf cannot be named with version 0.
    assert_eq!(leaf.version(), Version::V1);
}

#[tokio::test]
async fn test_wrap_single_file() {
    let dag = cluster();
    let params = AddParams {
        wrap: true,
        ..params_v1()
    };

    let root = add(Arc::clone(&dag), params, &[("only.txt", "x")])
        .await
        .unwrap();

    let node = dag.get(&root).await.unwrap();
    assert_eq!(node.kind(), NodeKind::Directory);
    assert_eq!(node.links()[0].name, "only.txt");
}

#[tokio::test]
async fn test_add_local_directory() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let site = tmp.path().join("site");
    std::fs::create_dir_all(site.join("css")).unwrap();
    std::fs::write(site.join("index.html"), "<h1>hi</h1>").unwrap();
    std::fs::write(site.join("css/main.css"), "h1 {}").unwrap();
    std::fs::write(site.join(".env"), "SECRET=1").unwrap();

    let dag = cluster();
    let adder = new_adder(Arc::clone(&dag), params_v1(), None);
    let source = DirectoryFileSource::open(&site).await.unwrap();
    let root = adder
        .ingest(&CancellationToken::new(), source)
        .await
        .unwrap();

    let node = dag.get(&root).await.unwrap();
    let names: Vec<&str> = node.links().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["css", "index.html"]);
    assert!(dag.is_pinned(&root));
}
