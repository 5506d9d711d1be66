//! Durable per-transaction outcomes.
use alloy_primitives::{Address, Bytes, B256};

/// Receipt status byte of a successful transaction.
pub const SUCCESS: u8 = 1;

/// Receipt status byte of a failed or rejected transaction.
pub const FAILURE: u8 = 0;

/// A log record emitted by executing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Account that emitted the log.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<B256>,
    /// Opaque payload.
    pub data: Bytes,
}

/// Outcome of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// [`SUCCESS`] or [`FAILURE`].
    pub status: u8,
    /// Gas the transaction consumed. Zero for pipeline rejections.
    pub gas_used: u64,
    /// Logs emitted during a successful execution.
    pub logs: Vec<LogEntry>,
    /// State root after the transaction, captured only when the tracer
    /// asks for state tracing.
    pub post_state_root: Option<B256>,
}
