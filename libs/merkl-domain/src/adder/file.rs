//! File entries and the in-memory file source

use std::collections::VecDeque;
use std::fmt;
use std::io::Cursor;
use std::pin::Pin;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::ports::FileSource;

/// Byte stream of a file entry
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// What an entry holds
pub enum FileContent {
    Directory,
    File(FileReader),
}

/// One named input yielded by a [`FileSource`]
pub struct FileEntry {
    path: String,
    content: FileContent,
}

impl FileEntry {
    /// A file streamed from `reader`
    pub fn file(path: impl Into<String>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            path: path.into(),
            content: FileContent::File(Box::pin(reader)),
        }
    }

    /// A file whose content is already in memory
    pub fn from_bytes(path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::file(path, Cursor::new(data.into()))
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: FileContent::Directory,
        }
    }

    /// Full path of the entry, `/` separated
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.content, FileContent::Directory)
    }

    pub fn into_parts(self) -> (String, FileContent) {
        (self.path, self.content)
    }
}

impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry")
            .field("path", &self.path)
            .field("directory", &self.is_directory())
            .finish()
    }
}

/// A file source over entries held in memory
#[derive(Debug, Default)]
pub struct MemoryFileSource {
    entries: VecDeque<FileEntry>,
}

impl MemoryFileSource {
    pub fn new(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Build a source of in-memory files from `(path, content)` pairs
    pub fn from_files<P, D>(files: impl IntoIterator<Item = (P, D)>) -> Self
    where
        P: Into<String>,
        D: Into<Bytes>,
    {
        Self::new(
            files
                .into_iter()
                .map(|(path, data)| FileEntry::from_bytes(path, data)),
        )
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl FileSource for MemoryFileSource {
    async fn next_file(&mut self) -> Result<Option<FileEntry>> {
        Ok(self.entries.pop_front())
    }
}
