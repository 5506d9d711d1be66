//! The narrow seam to the bytecode execution engine.
use crate::receipt::LogEntry;
use alloy_primitives::{Address, Bytes, B256, U256};

/// Call-scoped inputs handed to the engine.
#[derive(Debug, Clone)]
pub struct CallScope {
    /// Recovered transaction sender.
    pub caller: Address,
    /// Callee, or the address of the contract being created.
    pub target: Address,
    /// Code hash of the callee at call time.
    pub code_hash: B256,
    /// Value the transaction transfers.
    pub value: U256,
    /// Call data or creation code.
    pub input: Bytes,
    /// Gas left after the intrinsic charge.
    pub gas_available: u64,
}

/// Block-scoped environment visible to executing code.
#[derive(Debug, Clone)]
pub struct ExecutionEnv {
    /// Block number.
    pub number: u64,
    /// Fee recipient of the block.
    pub beneficiary: Address,
    /// Block timestamp.
    pub timestamp: u64,
    /// Chain identifier.
    pub chain_id: u64,
}

/// One storage write the engine wants applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWrite {
    /// Account whose storage is written.
    pub address: Address,
    /// Slot index.
    pub slot: U256,
    /// New value; zero deletes the slot.
    pub value: U256,
}

/// Outcome reported by the engine. Storage writes and logs are applied
/// by the processor only when `success` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Gas the code consumed, on top of the intrinsic charge.
    pub gas_used: u64,
    /// Whether execution completed without reverting.
    pub success: bool,
    /// Return data, or the deployed code for a creation.
    pub output: Bytes,
    /// Storage effects to apply.
    pub storage_writes: Vec<StorageWrite>,
    /// Logs emitted.
    pub logs: Vec<LogEntry>,
}

impl ExecutionResult {
    /// A successful run that did nothing.
    pub fn noop() -> Self {
        Self {
            gas_used: 0,
            success: true,
            output: Bytes::new(),
            storage_writes: Vec::new(),
            logs: Vec::new(),
        }
    }
}

/// Executes the code a transaction targets. The processor owns every
/// state transition around the call; the engine only reports what the
/// code did.
pub trait ExecutionEngine {
    /// Runs `call` within `env`.
    fn run(&mut self, call: CallScope, env: &ExecutionEnv) -> ExecutionResult;
}

/// An engine that executes nothing: every call succeeds immediately and
/// consumes no gas. Lets the pipeline around the engine be exercised in
/// isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl ExecutionEngine for NullEngine {
    fn run(&mut self, _call: CallScope, _env: &ExecutionEnv) -> ExecutionResult {
        ExecutionResult::noop()
    }
}
