//! Progress output
//!
//! The adder streams [`AddedOutput`] events on a bounded channel while it
//! works. Listening is optional: when no sender is handed to the adder, it
//! drains its own channel in the background.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::cid::Cid;

/// Capacity of the output channel
pub const OUTPUT_BUFFER: usize = 100;

/// One processed unit of an add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedOutput {
    /// Path of the added entry
    pub name: String,
    pub cid: Cid,
    /// Cumulative DAG size
    pub size: u64,
    /// File bytes consumed
    pub bytes: u64,
}

pub type OutputSender = mpsc::Sender<AddedOutput>;
pub type OutputReceiver = mpsc::Receiver<AddedOutput>;

/// Create an output channel of the standard capacity
pub fn output_channel() -> (OutputSender, OutputReceiver) {
    mpsc::channel(OUTPUT_BUFFER)
}
