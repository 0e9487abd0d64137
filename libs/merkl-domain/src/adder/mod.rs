//! Adder domain module
//!
//! This module contains the ingestion orchestrator and the values that flow
//! through it: parameters in, file entries through, progress events out.

mod file;
mod output;
mod params;
mod service;

pub use file::{FileContent, FileEntry, FileReader, MemoryFileSource};
pub use output::{output_channel, AddedOutput, OutputReceiver, OutputSender, OUTPUT_BUFFER};
pub use params::{AddParams, Layout, DEFAULT_CHUNKER, DEFAULT_HASH_FUN};
pub use service::{Adder, AdderState};
