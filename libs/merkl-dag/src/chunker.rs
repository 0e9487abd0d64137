//! Fixed-size chunking
//!
//! The chunker descriptor is `size-<bytes>`; an empty descriptor or
//! `default` selects 256 KiB blocks.

use bytes::Bytes;
use merkl_domain::{AddError, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Block size used when no chunker is given
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

/// Largest block a chunker may produce
pub const MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// Splits a byte stream into fixed-size blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
}

impl Chunker {
    /// Parse a chunker descriptor
    ///
    /// # Errors
    ///
    /// Returns `AddError::ConfigError` for unknown algorithms and for sizes
    /// that are zero, malformed or above [`MAX_BLOCK_SIZE`]
    pub fn parse(descriptor: &str) -> Result<Self> {
        if descriptor.is_empty() || descriptor == "default" {
            return Ok(Self {
                size: DEFAULT_BLOCK_SIZE,
            });
        }

        let Some(size) = descriptor.strip_prefix("size-") else {
            return Err(AddError::config_error(format!(
                "unrecognized chunker option: {descriptor}"
            )));
        };

        let size: usize = size
            .parse()
            .map_err(|_| AddError::config_error(format!("bad chunk size: {size}")))?;

        if size == 0 {
            return Err(AddError::config_error("chunk size must be greater than 0"));
        }
        if size > MAX_BLOCK_SIZE {
            return Err(AddError::config_error(format!(
                "chunk size {size} exceeds the maximum block size of {MAX_BLOCK_SIZE}"
            )));
        }

        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Read the next block. Every block is full-size except the last one;
    /// `None` once the reader is exhausted.
    pub async fn next_chunk<R>(&self, reader: &mut R) -> Result<Option<Bytes>>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let mut buf = vec![0u8; self.size];
        let mut filled = 0;

        while filled < self.size {
            let n = reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            size: DEFAULT_BLOCK_SIZE,
        }
    }
}
