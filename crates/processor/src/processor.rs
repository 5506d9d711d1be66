//! The ordered transaction validation and application pipeline.
use crate::config::ChainConfig;
use crate::engine::{CallScope, ExecutionEngine, ExecutionEnv};
use crate::receipt::{Receipt, FAILURE, SUCCESS};
use crate::tracer::Tracer;
use crate::transaction::{create_address, Transaction};
use alloy_primitives::{keccak256, Address, U256};
use ledger_state::{StateError, StateView};
use ledger_trie::KeyValueStore;
use log::debug;

/// Block-level inputs to transaction processing.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,
    /// Fee recipient.
    pub beneficiary: Address,
    /// Gas budget of the whole block.
    pub gas_limit: u64,
    /// Block timestamp.
    pub timestamp: u64,
}

/// Validates transactions and applies them to a [`StateView`].
///
/// The validation pipeline runs in a fixed order: sender recovery,
/// intrinsic gas, sender balance, block gas budget. A transaction
/// rejected by any of these consumes no gas and touches no state; only
/// transactions that pass all four are charged and executed.
#[derive(Debug)]
pub struct TransactionProcessor<S, E> {
    config: ChainConfig,
    state: StateView<S>,
    engine: E,
    block_gas_used: u64,
}

impl<S: KeyValueStore, E: ExecutionEngine> TransactionProcessor<S, E> {
    /// Creates a processor over `state` with `engine`.
    pub fn new(config: ChainConfig, state: StateView<S>, engine: E) -> Self {
        Self { config, state, engine, block_gas_used: 0 }
    }

    /// Resets the block gas accumulator for a new block.
    pub fn begin_block(&mut self) {
        self.block_gas_used = 0;
    }

    /// Gas consumed by the transactions of the current block so far.
    pub fn block_gas_used(&self) -> u64 {
        self.block_gas_used
    }

    /// The state the processor works against.
    pub fn state_mut(&mut self) -> &mut StateView<S> {
        &mut self.state
    }

    /// Consumes the processor and returns its state.
    pub fn into_state(self) -> StateView<S> {
        self.state
    }

    /// Validates `tx` and, when it passes, executes it against the state.
    ///
    /// Errors are reserved for faults of the state itself (missing or
    /// malformed store data); an invalid transaction is not an error but
    /// a [`FAILURE`] receipt with zero gas used.
    pub fn execute(
        &mut self,
        tx: &Transaction,
        header: &BlockHeader,
        tracer: &mut dyn Tracer,
    ) -> Result<Receipt, StateError> {
        // 1. The signature must resolve to a sender.
        let Some(sender) = tx.recover_sender() else {
            debug!("rejected: signature does not resolve to a sender");
            return self.rejection(tracer);
        };

        // 2. The gas limit must cover the intrinsic cost.
        let intrinsic_gas = self.config.intrinsic_gas(tx);
        if tx.gas_limit < intrinsic_gas {
            debug!(
                "rejected {sender}: gas limit {} below intrinsic gas {intrinsic_gas}",
                tx.gas_limit
            );
            return self.rejection(tracer);
        }

        // 3. The sender must afford the worst-case gas plus the value.
        let sender_balance = self.state.balance(sender)?;
        let sender_nonce = self.state.nonce(sender)?;
        tracer.account_read(sender, sender_balance, sender_nonce);
        let gas_cost = U256::from(tx.gas_limit) * U256::from(tx.gas_price);
        if sender_balance < gas_cost + tx.value {
            debug!("rejected {sender}: balance {sender_balance} cannot cover the transaction");
            return self.rejection(tracer);
        }

        // 4. The transaction must fit in what is left of the block.
        if tx.gas_limit > header.gas_limit.saturating_sub(self.block_gas_used) {
            debug!(
                "rejected {sender}: block gas used {} + limit {} exceeds block budget {}",
                self.block_gas_used, tx.gas_limit, header.gas_limit
            );
            return self.rejection(tracer);
        }

        // The transaction is in: charge the full gas limit up front and
        // bump the nonce, whatever the execution outcome.
        self.state.sub_balance(sender, gas_cost)?;
        tracer.balance_change(sender, sender_balance, sender_balance - gas_cost);
        self.state.increment_nonce(sender)?;
        tracer.nonce_change(sender, sender_nonce, sender_nonce + 1);

        let target = tx.to.unwrap_or_else(|| create_address(sender, sender_nonce));
        let gas_available = tx.gas_limit - intrinsic_gas;
        tracer.execution_step(gas_available);
        let call = CallScope {
            caller: sender,
            target,
            code_hash: self.state.code_hash(target)?,
            value: tx.value,
            input: tx.data.clone(),
            gas_available,
        };
        let env = ExecutionEnv {
            number: header.number,
            beneficiary: header.beneficiary,
            timestamp: header.timestamp,
            chain_id: self.config.chain_id,
        };
        let result = self.engine.run(call, &env);

        let gas_used = intrinsic_gas.saturating_add(result.gas_used).min(tx.gas_limit);
        let mut logs = Vec::new();
        let status = if result.success {
            // Value transfer and engine effects land only on success.
            if !tx.value.is_zero() {
                self.transfer(sender, target, tx.value, tracer)?;
            }
            if tx.to.is_none() && !result.output.is_empty() {
                self.state.set_code_hash(target, keccak256(&result.output))?;
            }
            for write in &result.storage_writes {
                let old = self.state.storage(write.address, write.slot)?;
                self.state.set_storage(write.address, write.slot, write.value)?;
                tracer.storage_change(write.address, write.slot, old, write.value);
            }
            logs = result.logs;
            SUCCESS
        } else {
            debug!("execution failed for {sender}, gas charged, effects dropped");
            FAILURE
        };

        // Refund what the execution did not use and pay the beneficiary.
        let refund = U256::from(tx.gas_limit - gas_used) * U256::from(tx.gas_price);
        if !refund.is_zero() {
            let before = self.state.balance(sender)?;
            self.state.add_balance(sender, refund)?;
            tracer.balance_change(sender, before, before + refund);
        }
        let fee = U256::from(gas_used) * U256::from(tx.gas_price);
        if !fee.is_zero() {
            let before = self.state.balance(header.beneficiary)?;
            self.state.add_balance(header.beneficiary, fee)?;
            tracer.balance_change(header.beneficiary, before, before + fee);
        }

        self.block_gas_used += gas_used;
        Ok(Receipt {
            status,
            gas_used,
            logs,
            post_state_root: self.post_state_root(tracer)?,
        })
    }

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        tracer: &mut dyn Tracer,
    ) -> Result<(), StateError> {
        let from_before = self.state.balance(from)?;
        self.state.sub_balance(from, value)?;
        tracer.balance_change(from, from_before, from_before - value);
        let to_before = self.state.balance(to)?;
        self.state.add_balance(to, value)?;
        tracer.balance_change(to, to_before, to_before + value);
        Ok(())
    }

    // A pipeline rejection: no gas charged, no state touched.
    fn rejection(&mut self, tracer: &mut dyn Tracer) -> Result<Receipt, StateError> {
        Ok(Receipt {
            status: FAILURE,
            gas_used: 0,
            logs: Vec::new(),
            post_state_root: self.post_state_root(tracer)?,
        })
    }

    fn post_state_root(
        &mut self,
        tracer: &mut dyn Tracer,
    ) -> Result<Option<alloy_primitives::B256>, StateError> {
        if tracer.is_tracing_state() {
            Ok(Some(self.state.state_root()?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ExecutionResult, NullEngine};
    use crate::testing::{address_of, test_key, TransactionBuilder};
    use crate::tracer::{NoopTracer, StateDiffTracer};
    use alloy_primitives::Bytes;
    use ledger_trie::MemoryStore;

    fn header() -> BlockHeader {
        BlockHeader {
            number: 1,
            beneficiary: Address::repeat_byte(0xbe),
            gas_limit: 8_000_000,
            timestamp: 1,
        }
    }

    fn funded_processor(
        sender: Address,
        balance: u64,
    ) -> TransactionProcessor<MemoryStore, NullEngine> {
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(balance)).unwrap();
        TransactionProcessor::new(ChainConfig::default(), state, NullEngine)
    }

    #[test]
    fn state_diff_covers_gas_and_value_flows() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let recipient = Address::repeat_byte(0x99);
        let mut processor = funded_processor(sender, 1_000_000);
        let tx = TransactionBuilder::new()
            .to(recipient)
            .value(U256::from(100))
            .signed(&key);

        let mut diff = StateDiffTracer::default();
        let receipt = processor.execute(&tx, &header(), &mut diff).unwrap();

        assert_eq!(receipt.status, SUCCESS);
        assert_eq!(receipt.gas_used, 21_000);
        assert!(receipt.post_state_root.is_some());

        // Sender: the whole journey from pre-charge to post-value.
        assert_eq!(
            diff.balances[&sender],
            (U256::from(1_000_000), U256::from(1_000_000 - 21_000 - 100))
        );
        assert_eq!(diff.nonces[&sender], (0, 1));
        assert_eq!(
            diff.balances[&header().beneficiary],
            (U256::ZERO, U256::from(21_000))
        );
        assert_eq!(diff.balances[&recipient], (U256::ZERO, U256::from(100)));
    }

    #[test]
    fn block_gas_accumulates_and_resets() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let mut processor = funded_processor(sender, 10_000_000);

        for nonce in 0..3 {
            let tx = TransactionBuilder::new().nonce(nonce).signed(&key);
            processor.execute(&tx, &header(), &mut NoopTracer).unwrap();
        }
        assert_eq!(processor.block_gas_used(), 63_000);

        processor.begin_block();
        assert_eq!(processor.block_gas_used(), 0);
    }

    #[test]
    fn creation_deploys_code_at_the_derived_address() {
        #[derive(Debug)]
        struct Deployer;
        impl ExecutionEngine for Deployer {
            fn run(&mut self, _call: CallScope, _env: &ExecutionEnv) -> ExecutionResult {
                ExecutionResult {
                    output: Bytes::from_static(b"runtime code"),
                    ..ExecutionResult::noop()
                }
            }
        }

        let key = test_key(0x42);
        let sender = address_of(&key);
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(10_000_000)).unwrap();
        let mut processor = TransactionProcessor::new(ChainConfig::default(), state, Deployer);

        let tx = TransactionBuilder::new()
            .creation()
            .gas_limit(60_000)
            .signed(&key);
        let receipt = processor.execute(&tx, &header(), &mut NoopTracer).unwrap();
        assert_eq!(receipt.status, SUCCESS);

        let deployed = create_address(sender, 0);
        assert_eq!(
            processor.state_mut().code_hash(deployed).unwrap(),
            keccak256(b"runtime code")
        );
        // The creation moved the 1-wei default value too.
        assert_eq!(
            processor.state_mut().balance(deployed).unwrap(),
            U256::from(1)
        );
    }

    #[test]
    fn free_gas_huge_limit_is_rejected_by_block_budget() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let mut processor = funded_processor(sender, 1_000_000);

        // Fill part of the block first.
        let tx = TransactionBuilder::new().signed(&key);
        let receipt = processor.execute(&tx, &header(), &mut NoopTracer).unwrap();
        assert_eq!(receipt.status, SUCCESS);
        assert_eq!(processor.block_gas_used(), 21_000);

        // A zero gas price passes the balance check, so the oversized
        // limit must be caught by the block budget.
        let tx = TransactionBuilder::new()
            .nonce(1)
            .gas_price(0)
            .gas_limit(u64::MAX)
            .signed(&key);
        let receipt = processor.execute(&tx, &header(), &mut NoopTracer).unwrap();

        assert_eq!(receipt.status, FAILURE);
        assert_eq!(receipt.gas_used, 0);
        assert_eq!(processor.block_gas_used(), 21_000);
        assert_eq!(processor.state_mut().nonce(sender).unwrap(), 1);
    }

    #[test]
    fn runaway_engine_gas_is_clamped_to_the_limit() {
        #[derive(Debug)]
        struct GasBurner;
        impl ExecutionEngine for GasBurner {
            fn run(&mut self, _call: CallScope, _env: &ExecutionEnv) -> ExecutionResult {
                ExecutionResult { gas_used: u64::MAX, ..ExecutionResult::noop() }
            }
        }

        let key = test_key(0x42);
        let sender = address_of(&key);
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(1_000_000)).unwrap();
        let mut processor = TransactionProcessor::new(ChainConfig::default(), state, GasBurner);

        let tx = TransactionBuilder::new().gas_limit(50_000).signed(&key);
        let receipt = processor.execute(&tx, &header(), &mut NoopTracer).unwrap();

        assert_eq!(receipt.status, SUCCESS);
        assert_eq!(receipt.gas_used, 50_000);
        assert_eq!(processor.block_gas_used(), 50_000);
    }

    #[test]
    fn rejection_charges_nothing() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let mut processor = funded_processor(sender, 1_000_000);

        let tx = TransactionBuilder::new().gas_limit(20_000).signed(&key);
        let receipt = processor.execute(&tx, &header(), &mut NoopTracer).unwrap();

        assert_eq!(receipt.status, FAILURE);
        assert_eq!(receipt.gas_used, 0);
        assert_eq!(receipt.post_state_root, None);
        assert_eq!(
            processor.state_mut().balance(sender).unwrap(),
            U256::from(1_000_000)
        );
        assert_eq!(processor.state_mut().nonce(sender).unwrap(), 0);
        assert_eq!(processor.block_gas_used(), 0);
    }
}
