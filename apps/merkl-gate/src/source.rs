//! Multipart file source
//!
//! Each part of a `multipart/form-data` body is one entry. The part's
//! filename is the entry path, falling back to the field name; parts typed
//! `application/x-directory` are directories.
//!
//! A background task walks the body. It hands over one entry at a time and
//! streams the part's chunks into that entry's reader, so no part is held
//! in memory whole.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::extract::Multipart;
use bytes::{Buf, Bytes};
use merkl_domain::adder::FileEntry;
use merkl_domain::ports::FileSource;
use merkl_domain::{AddError, Result};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;
use tracing::debug;

/// Content type marking a directory part
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// Chunks read ahead of the consumer, per part
const PART_BUFFER: usize = 4;

pub struct MultipartFileSource {
    entries: mpsc::Receiver<Result<FileEntry>>,
}

impl MultipartFileSource {
    /// Start reading `multipart`. Must be called within a Tokio runtime.
    pub fn new(multipart: Multipart) -> Self {
        let (tx, entries) = mpsc::channel(1);
        tokio::spawn(read_parts(multipart, tx));
        Self { entries }
    }
}

impl FileSource for MultipartFileSource {
    async fn next_file(&mut self) -> Result<Option<FileEntry>> {
        self.entries.recv().await.transpose()
    }
}

async fn read_parts(mut multipart: Multipart, entries: mpsc::Sender<Result<FileEntry>>) {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return,
            Err(e) => {
                let err = AddError::source_failure(format!("malformed multipart body: {e}"));
                let _ = entries.send(Err(err)).await;
                return;
            }
        };

        let Some(path) = field.file_name().or_else(|| field.name()).map(str::to_string) else {
            let err = AddError::source_failure("multipart part without a name");
            let _ = entries.send(Err(err)).await;
            return;
        };

        if field.content_type() == Some(DIRECTORY_CONTENT_TYPE) {
            if entries.send(Ok(FileEntry::directory(path))).await.is_err() {
                return;
            }
            continue;
        }

        let (chunks, rx) = mpsc::channel(PART_BUFFER);
        let reader = PartReader {
            chunks: rx,
            current: Bytes::new(),
        };
        if entries.send(Ok(FileEntry::file(path.clone(), reader))).await.is_err() {
            return;
        }

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    // A consumer that drops the reader early (e.g. a skipped
                    // hidden file) leaves the rest of the part unread.
                    if chunks.send(Ok(chunk)).await.is_err() {
                        debug!(path = %path, "part reader dropped");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let err = io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("failed to read part '{path}': {e}"),
                    );
                    let _ = chunks.send(Err(err)).await;
                    return;
                }
            }
        }
    }
}

/// Reads one part's chunks as they arrive
struct PartReader {
    chunks: mpsc::Receiver<io::Result<Bytes>>,
    current: Bytes,
}

impl AsyncRead for PartReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        while self.current.is_empty() {
            match ready!(self.chunks.poll_recv(cx)) {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(())),
            }
        }

        let n = self.current.len().min(buf.remaining());
        buf.put_slice(&self.current[..n]);
        self.current.advance(n);
        Poll::Ready(Ok(()))
    }
}
