//! Transaction validation and application against ledger state.
//!
//! [`TransactionProcessor::execute`] runs a fixed validation pipeline
//! (sender recovery, intrinsic gas, balance, block gas) ahead of the
//! pluggable [`ExecutionEngine`], charges gas, applies state effects and
//! produces a [`Receipt`] per transaction. [`Tracer`] implementations
//! observe the run without influencing it.

mod config;
mod engine;
mod processor;
mod receipt;
pub mod testing;
mod tracer;
mod transaction;

pub use config::ChainConfig;
pub use engine::{CallScope, ExecutionEngine, ExecutionEnv, ExecutionResult, NullEngine, StorageWrite};
pub use processor::{BlockHeader, TransactionProcessor};
pub use receipt::{LogEntry, Receipt, FAILURE, SUCCESS};
pub use tracer::{
    BlockReceiptsTracer, MultiTracer, NoopTracer, StateDiffTracer, StepTracer, Tracer,
};
pub use transaction::{create_address, Transaction};
