//! Local file tree source
//!
//! [`DirectoryFileSource`] walks a directory once when opened and yields its
//! entries depth-first in name order. Paths are relative to the parent of the
//! walked directory, so the directory's own name is the first component.
//! Files are only opened when they are yielded.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use merkl_domain::adder::FileEntry;
use merkl_domain::ports::FileSource;
use merkl_domain::{AddError, Result};
use tokio::fs;
use tracing::debug;

struct Pending {
    path: String,
    fs_path: PathBuf,
    is_dir: bool,
}

/// A file source over a local directory tree (or a single file)
pub struct DirectoryFileSource {
    pending: VecDeque<Pending>,
}

impl DirectoryFileSource {
    /// Walk `root`. Symbolic links are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AddError::SourceFailure` if `root` or one of its directories
    /// cannot be read
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AddError::source_failure(format!("'{}' has no usable name", root.display()))
            })?
            .to_string();
        let is_dir = fs::metadata(root).await?.is_dir();

        let mut pending = VecDeque::new();
        let mut stack = vec![Pending {
            path: name,
            fs_path: root.to_path_buf(),
            is_dir,
        }];

        while let Some(item) = stack.pop() {
            if item.is_dir {
                let mut children = Vec::new();
                let mut dir = fs::read_dir(&item.fs_path).await?;
                while let Some(entry) = dir.next_entry().await? {
                    let file_type = entry.file_type().await?;
                    if file_type.is_symlink() {
                        debug!(path = %entry.path().display(), "skipping symlink");
                        continue;
                    }
                    let Some(child) = entry.file_name().to_str().map(str::to_string) else {
                        return Err(AddError::source_failure(format!(
                            "'{}' is not valid UTF-8",
                            entry.path().display()
                        )));
                    };
                    children.push(Pending {
                        path: format!("{}/{}", item.path, child),
                        fs_path: entry.path(),
                        is_dir: file_type.is_dir(),
                    });
                }
                children.sort_by(|a, b| a.path.cmp(&b.path));
                stack.extend(children.into_iter().rev());
            }
            pending.push_back(item);
        }

        Ok(Self { pending })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FileSource for DirectoryFileSource {
    async fn next_file(&mut self) -> Result<Option<FileEntry>> {
        let Some(item) = self.pending.pop_front() else {
            return Ok(None);
        };

        if item.is_dir {
            return Ok(Some(FileEntry::directory(item.path)));
        }

        let file = fs::File::open(&item.fs_path).await.map_err(|e| {
            AddError::source_failure(format!("cannot open '{}': {e}", item.fs_path.display()))
        })?;
        Ok(Some(FileEntry::file(item.path, file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn paths(mut source: DirectoryFileSource) -> Vec<(String, bool)> {
        let mut out = Vec::new();
        while let Some(entry) = source.next_file().await.unwrap() {
            out.push((entry.path().to_string(), entry.is_directory()));
        }
        out
    }

    #[tokio::test]
    async fn test_walk_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("site");
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("b.txt"), "b").unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();
        std::fs::write(root.join(".hidden"), "h").unwrap();
        std::fs::write(root.join("sub/c.txt"), "c").unwrap();

        let source = DirectoryFileSource::open(&root).await.unwrap();
        assert_eq!(source.remaining(), 6);

        assert_eq!(
            paths(source).await,
            vec![
                ("site".to_string(), true),
                ("site/.hidden".to_string(), false),
                ("site/a.txt".to_string(), false),
                ("site/b.txt".to_string(), false),
                ("site/sub".to_string(), true),
                ("site/sub/c.txt".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("note.md");
        std::fs::write(&file, "# note").unwrap();

        let source = DirectoryFileSource::open(&file).await.unwrap();
        assert_eq!(paths(source).await, vec![("note.md".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let result = DirectoryFileSource::open(tmp.path().join("nope")).await;
        assert!(matches!(result, Err(AddError::SourceFailure(_))));
    }
}
