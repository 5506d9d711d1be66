//! Execution observers.
//!
//! Tracers are notified of reads, state deltas and receipts as the
//! processor works; they never influence the outcome. Every hook
//! defaults to a no-op so implementations override only what they
//! record.
use crate::receipt::Receipt;
use alloy_primitives::{Address, B256, U256};
use std::collections::BTreeMap;
use std::fmt;

/// Observer of transaction processing.
pub trait Tracer {
    /// True when the processor should snapshot a post-execution state
    /// root into the receipt.
    fn is_tracing_state(&self) -> bool {
        false
    }

    /// Processing of the transaction identified by `tx_hash` starts.
    fn start_transaction(&mut self, _tx_hash: B256) {}

    /// An account was read during validation.
    fn account_read(&mut self, _address: Address, _balance: U256, _nonce: u64) {}

    /// An account balance changed.
    fn balance_change(&mut self, _address: Address, _old: U256, _new: U256) {}

    /// An account nonce changed.
    fn nonce_change(&mut self, _address: Address, _old: u64, _new: u64) {}

    /// A storage slot changed.
    fn storage_change(&mut self, _address: Address, _slot: U256, _old: U256, _new: U256) {}

    /// The engine is about to run with this much gas.
    fn execution_step(&mut self, _gas_available: u64) {}

    /// Processing finished with `receipt`.
    fn end_transaction(&mut self, _receipt: &Receipt) {}
}

/// A tracer that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Fans every notification out to an ordered list of tracers.
#[derive(Default)]
pub struct MultiTracer {
    tracers: Vec<Box<dyn Tracer>>,
}

impl MultiTracer {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tracer; it is notified after all earlier ones.
    pub fn push(&mut self, tracer: Box<dyn Tracer>) {
        self.tracers.push(tracer);
    }

    /// Whether no tracers are registered.
    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }
}

impl fmt::Debug for MultiTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTracer")
            .field("tracers", &self.tracers.len())
            .finish()
    }
}

impl Tracer for MultiTracer {
    fn is_tracing_state(&self) -> bool {
        self.tracers.iter().any(|tracer| tracer.is_tracing_state())
    }

    fn start_transaction(&mut self, tx_hash: B256) {
        for tracer in &mut self.tracers {
            tracer.start_transaction(tx_hash);
        }
    }

    fn account_read(&mut self, address: Address, balance: U256, nonce: u64) {
        for tracer in &mut self.tracers {
            tracer.account_read(address, balance, nonce);
        }
    }

    fn balance_change(&mut self, address: Address, old: U256, new: U256) {
        for tracer in &mut self.tracers {
            tracer.balance_change(address, old, new);
        }
    }

    fn nonce_change(&mut self, address: Address, old: u64, new: u64) {
        for tracer in &mut self.tracers {
            tracer.nonce_change(address, old, new);
        }
    }

    fn storage_change(&mut self, address: Address, slot: U256, old: U256, new: U256) {
        for tracer in &mut self.tracers {
            tracer.storage_change(address, slot, old, new);
        }
    }

    fn execution_step(&mut self, gas_available: u64) {
        for tracer in &mut self.tracers {
            tracer.execution_step(gas_available);
        }
    }

    fn end_transaction(&mut self, receipt: &Receipt) {
        for tracer in &mut self.tracers {
            tracer.end_transaction(receipt);
        }
    }
}

/// Accumulates per-account balance, nonce and storage deltas. For a key
/// touched repeatedly the first old and the last new value are kept.
#[derive(Debug, Default)]
pub struct StateDiffTracer {
    /// Balance deltas as `(old, new)` per account.
    pub balances: BTreeMap<Address, (U256, U256)>,
    /// Nonce deltas as `(old, new)` per account.
    pub nonces: BTreeMap<Address, (u64, u64)>,
    /// Storage deltas as `(old, new)` per `(account, slot)`.
    pub storage: BTreeMap<(Address, U256), (U256, U256)>,
}

impl Tracer for StateDiffTracer {
    fn is_tracing_state(&self) -> bool {
        true
    }

    fn balance_change(&mut self, address: Address, old: U256, new: U256) {
        self.balances
            .entry(address)
            .and_modify(|delta| delta.1 = new)
            .or_insert((old, new));
    }

    fn nonce_change(&mut self, address: Address, old: u64, new: u64) {
        self.nonces
            .entry(address)
            .and_modify(|delta| delta.1 = new)
            .or_insert((old, new));
    }

    fn storage_change(&mut self, address: Address, slot: U256, old: U256, new: U256) {
        self.storage
            .entry((address, slot))
            .and_modify(|delta| delta.1 = new)
            .or_insert((old, new));
    }
}

/// Records the gas handed to the engine at each execution step.
#[derive(Debug, Default)]
pub struct StepTracer {
    /// Gas available at each recorded step, in order.
    pub steps: Vec<u64>,
}

impl Tracer for StepTracer {
    fn execution_step(&mut self, gas_available: u64) {
        self.steps.push(gas_available);
    }
}

/// Wraps another tracer and additionally captures the ordered receipts
/// of a block.
pub struct BlockReceiptsTracer {
    inner: Box<dyn Tracer>,
    receipts: Vec<Receipt>,
}

impl BlockReceiptsTracer {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn Tracer>) -> Self {
        Self { inner, receipts: Vec::new() }
    }

    /// Receipts observed so far, in execution order.
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }
}

impl fmt::Debug for BlockReceiptsTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockReceiptsTracer")
            .field("receipts", &self.receipts)
            .finish_non_exhaustive()
    }
}

impl Tracer for BlockReceiptsTracer {
    fn is_tracing_state(&self) -> bool {
        self.inner.is_tracing_state()
    }

    fn start_transaction(&mut self, tx_hash: B256) {
        self.inner.start_transaction(tx_hash);
    }

    fn account_read(&mut self, address: Address, balance: U256, nonce: u64) {
        self.inner.account_read(address, balance, nonce);
    }

    fn balance_change(&mut self, address: Address, old: U256, new: U256) {
        self.inner.balance_change(address, old, new);
    }

    fn nonce_change(&mut self, address: Address, old: u64, new: u64) {
        self.inner.nonce_change(address, old, new);
    }

    fn storage_change(&mut self, address: Address, slot: U256, old: U256, new: U256) {
        self.inner.storage_change(address, slot, old, new);
    }

    fn execution_step(&mut self, gas_available: u64) {
        self.inner.execution_step(gas_available);
    }

    fn end_transaction(&mut self, receipt: &Receipt) {
        self.receipts.push(receipt.clone());
        self.inner.end_transaction(receipt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(status: u8) -> Receipt {
        Receipt {
            status,
            gas_used: 21_000,
            logs: Vec::new(),
            post_state_root: None,
        }
    }

    #[test]
    fn multi_tracer_fans_out_in_order() {
        #[derive(Debug, Default)]
        struct Order(std::rc::Rc<std::cell::RefCell<Vec<u8>>>, u8);
        impl Tracer for Order {
            fn execution_step(&mut self, _gas: u64) {
                self.0.borrow_mut().push(self.1);
            }
        }

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut multi = MultiTracer::new();
        multi.push(Box::new(Order(seen.clone(), 1)));
        multi.push(Box::new(Order(seen.clone(), 2)));
        multi.execution_step(100);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn multi_tracer_traces_state_when_any_member_does() {
        let mut multi = MultiTracer::new();
        multi.push(Box::new(NoopTracer));
        assert!(!multi.is_tracing_state());
        multi.push(Box::new(StateDiffTracer::default()));
        assert!(multi.is_tracing_state());
    }

    #[test]
    fn state_diff_merges_repeated_changes() {
        let mut diff = StateDiffTracer::default();
        let addr = Address::repeat_byte(1);
        diff.balance_change(addr, U256::from(10), U256::from(5));
        diff.balance_change(addr, U256::from(5), U256::from(8));
        assert_eq!(diff.balances[&addr], (U256::from(10), U256::from(8)));
    }

    #[test]
    fn receipts_tracer_keeps_order() {
        let mut tracer = BlockReceiptsTracer::new(Box::new(NoopTracer));
        tracer.end_transaction(&receipt(1));
        tracer.end_transaction(&receipt(0));
        let statuses: Vec<u8> = tracer.receipts().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![1, 0]);
    }
}
