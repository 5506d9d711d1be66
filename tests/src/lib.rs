#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, Bytes, B256, U256};
    use k256::ecdsa::SigningKey;
    use ledger_processor::testing::{address_of, test_key, TransactionBuilder};
    use ledger_processor::{
        BlockHeader, BlockReceiptsTracer, CallScope, ChainConfig, ExecutionEngine, ExecutionEnv,
        ExecutionResult, LogEntry, MultiTracer, NoopTracer, NullEngine, Receipt, StateDiffTracer,
        StepTracer, StorageWrite, Tracer, Transaction, TransactionProcessor, FAILURE, SUCCESS,
    };
    use ledger_state::StateView;
    use ledger_trie::{MemoryStore, TreeVisitor, VisitContext};

    const ETHER: u64 = 1_000_000_000_000_000;

    fn setup() -> (TransactionProcessor<MemoryStore, NullEngine>, SigningKey, Address) {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let state = StateView::empty(MemoryStore::new());
        let processor = TransactionProcessor::new(ChainConfig::default(), state, NullEngine);
        (processor, key, sender)
    }

    fn fund(
        processor: &mut TransactionProcessor<MemoryStore, NullEngine>,
        address: Address,
    ) {
        processor
            .state_mut()
            .create_account(address, U256::from(ETHER))
            .unwrap();
    }

    fn header(gas_limit: u64) -> BlockHeader {
        BlockHeader {
            number: 1,
            beneficiary: Address::repeat_byte(0xbe),
            gas_limit,
            timestamp: 1_600_000_000,
        }
    }

    // Composes the tracer stack the way a block-level caller would: the
    // requested tracers fanned out behind a receipts collector.
    fn build_tracer(with_state_diff: bool, with_steps: bool) -> BlockReceiptsTracer {
        let mut multi = MultiTracer::new();
        if with_state_diff {
            multi.push(Box::new(StateDiffTracer::default()));
        }
        if with_steps {
            multi.push(Box::new(StepTracer::default()));
        }
        let inner: Box<dyn Tracer> = if multi.is_empty() {
            Box::new(NoopTracer)
        } else {
            Box::new(multi)
        };
        BlockReceiptsTracer::new(inner)
    }

    fn execute(
        processor: &mut TransactionProcessor<MemoryStore, NullEngine>,
        tx: &Transaction,
        header: &BlockHeader,
        tracer: &mut BlockReceiptsTracer,
    ) -> Receipt {
        tracer.start_transaction(tx.hash());
        let receipt = processor
            .execute(tx, header, tracer)
            .expect("processing should not fault");
        tracer.end_transaction(&receipt);
        receipt
    }

    const TRACER_COMBINATIONS: [(bool, bool); 4] =
        [(false, false), (false, true), (true, false), (true, true)];

    #[test]
    fn processes_simple_transfer() {
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            let (mut processor, key, sender) = setup();
            fund(&mut processor, sender);
            let recipient = Address::repeat_byte(0x99);
            let tx = TransactionBuilder::new()
                .to(recipient)
                .value(U256::from(1))
                .signed(&key);

            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(8_000_000), &mut tracer);

            assert_eq!(receipt.status, SUCCESS);
            assert_eq!(receipt.gas_used, 21_000);
            assert_eq!(receipt.post_state_root.is_some(), with_state_diff);
            assert_eq!(tracer.receipts(), &[receipt]);

            let state = processor.state_mut();
            assert_eq!(state.nonce(sender).unwrap(), 1);
            assert_eq!(state.balance(recipient).unwrap(), U256::from(1));
            assert_eq!(
                state.balance(sender).unwrap(),
                U256::from(ETHER - 21_000 - 1)
            );
            assert_eq!(
                state.balance(Address::repeat_byte(0xbe)).unwrap(),
                U256::from(21_000)
            );
        }
    }

    #[test]
    fn quick_fail_when_gas_limit_below_intrinsic() {
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            let (mut processor, key, sender) = setup();
            fund(&mut processor, sender);
            let tx = TransactionBuilder::new().gas_limit(20_000).signed(&key);

            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(8_000_000), &mut tracer);

            assert_eq!(receipt.status, FAILURE);
            assert_eq!(receipt.gas_used, 0);

            let state = processor.state_mut();
            assert_eq!(state.nonce(sender).unwrap(), 0);
            assert_eq!(state.balance(sender).unwrap(), U256::from(ETHER));
        }
    }

    #[test]
    fn quick_fail_when_sender_does_not_resolve() {
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            let (mut processor, _key, sender) = setup();
            fund(&mut processor, sender);
            let tx = TransactionBuilder::new().unresolvable();

            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(8_000_000), &mut tracer);

            assert_eq!(receipt.status, FAILURE);
            assert_eq!(receipt.gas_used, 0);
            assert_eq!(processor.block_gas_used(), 0);
        }
    }

    #[test]
    fn quick_fail_when_balance_is_insufficient() {
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            // No funding at all.
            let (mut processor, key, sender) = setup();
            let tx = TransactionBuilder::new().signed(&key);

            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(8_000_000), &mut tracer);

            assert_eq!(receipt.status, FAILURE);
            assert_eq!(receipt.gas_used, 0);
            assert_eq!(processor.state_mut().nonce(sender).unwrap(), 0);
        }
    }

    #[test]
    fn quick_fail_when_block_gas_budget_is_exceeded() {
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            let (mut processor, key, sender) = setup();
            fund(&mut processor, sender);
            let tx = TransactionBuilder::new().signed(&key);

            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(20_000), &mut tracer);

            assert_eq!(receipt.status, FAILURE);
            assert_eq!(receipt.gas_used, 0);
            assert_eq!(processor.state_mut().nonce(sender).unwrap(), 0);
            assert_eq!(processor.state_mut().balance(sender).unwrap(), U256::from(ETHER));
        }
    }

    #[test]
    fn block_gas_budget_spans_transactions() {
        let (mut processor, key, sender) = setup();
        fund(&mut processor, sender);
        processor.begin_block();
        let block = header(40_000);

        let first = TransactionBuilder::new().nonce(0).signed(&key);
        let second = TransactionBuilder::new().nonce(1).signed(&key);
        let mut tracer = build_tracer(false, false);

        let receipt = execute(&mut processor, &first, &block, &mut tracer);
        assert_eq!(receipt.status, SUCCESS);
        // 19 000 gas left in the block, not enough for another transfer.
        let receipt = execute(&mut processor, &second, &block, &mut tracer);
        assert_eq!(receipt.status, FAILURE);
        assert_eq!(receipt.gas_used, 0);

        // A fresh block accepts it again.
        processor.begin_block();
        let receipt = execute(&mut processor, &second, &block, &mut tracer);
        assert_eq!(receipt.status, SUCCESS);

        let statuses: Vec<u8> = tracer.receipts().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![SUCCESS, FAILURE, SUCCESS]);
    }

    #[test]
    fn tracers_do_not_change_the_outcome() {
        let run = |with_state_diff: bool, with_steps: bool| -> (u8, u64, Vec<LogEntry>, U256) {
            let (mut processor, key, sender) = setup();
            fund(&mut processor, sender);
            let tx = TransactionBuilder::new()
                .to(Address::repeat_byte(0x99))
                .value(U256::from(123))
                .signed(&key);
            let mut tracer = build_tracer(with_state_diff, with_steps);
            let receipt = execute(&mut processor, &tx, &header(8_000_000), &mut tracer);
            let sender_balance = processor.state_mut().balance(sender).unwrap();
            (receipt.status, receipt.gas_used, receipt.logs, sender_balance)
        };

        let baseline = run(false, false);
        for (with_state_diff, with_steps) in TRACER_COMBINATIONS {
            assert_eq!(run(with_state_diff, with_steps), baseline);
        }
    }

    // An engine that burns gas, writes a slot and emits a log, or fails
    // outright, depending on the flag.
    #[derive(Debug)]
    struct ScriptedEngine {
        succeed: bool,
    }

    impl ExecutionEngine for ScriptedEngine {
        fn run(&mut self, call: CallScope, _env: &ExecutionEnv) -> ExecutionResult {
            ExecutionResult {
                gas_used: 5_000,
                success: self.succeed,
                output: Bytes::new(),
                storage_writes: vec![StorageWrite {
                    address: call.target,
                    slot: U256::from(1),
                    value: U256::from(7),
                }],
                logs: vec![LogEntry {
                    address: call.target,
                    topics: vec![B256::repeat_byte(0x0a)],
                    data: Bytes::from_static(b"ping"),
                }],
            }
        }
    }

    #[test]
    fn engine_success_applies_effects() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let contract = Address::repeat_byte(0xc0);
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(ETHER)).unwrap();
        let mut processor = TransactionProcessor::new(
            ChainConfig::default(),
            state,
            ScriptedEngine { succeed: true },
        );

        let tx = TransactionBuilder::new()
            .to(contract)
            .gas_limit(50_000)
            .signed(&key);
        let receipt = processor
            .execute(&tx, &header(8_000_000), &mut NoopTracer)
            .unwrap();

        assert_eq!(receipt.status, SUCCESS);
        assert_eq!(receipt.gas_used, 26_000);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(
            processor.state_mut().storage(contract, U256::from(1)).unwrap(),
            U256::from(7)
        );
        // Unused gas was refunded.
        assert_eq!(
            processor.state_mut().balance(sender).unwrap(),
            U256::from(ETHER - 26_000 - 1)
        );
    }

    #[test]
    fn engine_failure_charges_gas_and_drops_effects() {
        let key = test_key(0x42);
        let sender = address_of(&key);
        let contract = Address::repeat_byte(0xc0);
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(ETHER)).unwrap();
        let mut processor = TransactionProcessor::new(
            ChainConfig::default(),
            state,
            ScriptedEngine { succeed: false },
        );

        let tx = TransactionBuilder::new()
            .to(contract)
            .gas_limit(50_000)
            .signed(&key);
        let receipt = processor
            .execute(&tx, &header(8_000_000), &mut NoopTracer)
            .unwrap();

        assert_eq!(receipt.status, FAILURE);
        assert_eq!(receipt.gas_used, 26_000);
        assert!(receipt.logs.is_empty());

        let state = processor.state_mut();
        // Gas charged, nonce bumped, but no value moved and no storage
        // written.
        assert_eq!(state.nonce(sender).unwrap(), 1);
        assert_eq!(state.balance(sender).unwrap(), U256::from(ETHER - 26_000));
        assert_eq!(state.balance(contract).unwrap(), U256::ZERO);
        assert_eq!(state.storage(contract, U256::from(1)).unwrap(), U256::ZERO);
    }

    #[test]
    fn step_tracer_sees_the_post_intrinsic_gas() {
        let (mut processor, key, sender) = setup();
        fund(&mut processor, sender);
        let tx = TransactionBuilder::new().gas_limit(30_000).signed(&key);

        let mut steps = StepTracer::default();
        processor
            .execute(&tx, &header(8_000_000), &mut steps)
            .unwrap();
        assert_eq!(steps.steps, vec![9_000]);
    }

    // End to end: process transactions, commit, reopen from the root and
    // walk the committed state.
    #[test]
    fn committed_state_survives_reopen_and_walk() {
        #[derive(Debug, Default)]
        struct Counter {
            accounts: usize,
            storage_values: usize,
            missing: usize,
        }
        impl TreeVisitor for Counter {
            fn visit_leaf(
                &mut self,
                _node: &ledger_trie::LeafNode,
                ctx: &VisitContext,
                _value: &[u8],
            ) {
                if ctx.is_storage {
                    self.storage_values += 1;
                } else {
                    self.accounts += 1;
                }
            }
            fn visit_missing_node(&mut self, _hash: B256, _ctx: &VisitContext) {
                self.missing += 1;
            }
        }

        let key = test_key(0x42);
        let sender = address_of(&key);
        let contract = Address::repeat_byte(0xc0);
        let mut state = StateView::empty(MemoryStore::new());
        state.create_account(sender, U256::from(ETHER)).unwrap();
        let mut processor = TransactionProcessor::new(
            ChainConfig::default(),
            state,
            ScriptedEngine { succeed: true },
        );

        let tx = TransactionBuilder::new()
            .to(contract)
            .gas_limit(50_000)
            .signed(&key);
        processor
            .execute(&tx, &header(8_000_000), &mut NoopTracer)
            .unwrap();

        let mut state = processor.into_state();
        let root = state.commit().unwrap();
        let store = state.into_store();

        let mut reopened = StateView::new(store, root);
        assert_eq!(reopened.nonce(sender).unwrap(), 1);
        assert_eq!(
            reopened.storage(contract, U256::from(1)).unwrap(),
            U256::from(7)
        );
        assert_eq!(reopened.state_root().unwrap(), root);

        let mut counter = Counter::default();
        reopened.accept(&mut counter).unwrap();
        // Sender, contract and the beneficiary, plus one storage slot.
        assert_eq!(counter.accounts, 3);
        assert_eq!(counter.storage_values, 1);
        assert_eq!(counter.missing, 0);
    }
}
