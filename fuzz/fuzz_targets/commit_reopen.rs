#![no_main]

use std::collections::BTreeMap;

use alloy_primitives::{B256, Bytes};
use arbitrary::Arbitrary;
use ledger_trie::{MemoryStore, Trie};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { key: [u8; 32], value: Vec<u8> },
    Remove { key: [u8; 32] },
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<Op>,
    later_ops: Vec<Op>,
}

fn apply(
    trie: &mut Trie,
    model: &mut BTreeMap<B256, Bytes>,
    store: &MemoryStore,
    ops: &[Op],
) {
    for op in ops {
        match op {
            Op::Insert { key, value } => {
                if value.is_empty() {
                    continue;
                }
                let key = B256::from(*key);
                let value = Bytes::copy_from_slice(value);
                trie.insert(key, value.clone(), store).unwrap();
                model.insert(key, value);
            }
            Op::Remove { key } => {
                let key = B256::from(*key);
                trie.remove(key, store).unwrap();
                model.remove(&key);
            }
        }
    }
}

fuzz_target!(|input: Input| {
    let mut store = MemoryStore::new();
    let mut trie = Trie::new();
    let mut model = BTreeMap::<B256, Bytes>::new();

    apply(&mut trie, &mut model, &store, &input.ops);
    let root = trie.commit(&mut store);

    // Reopen from the bare root hash and resolve everything lazily.
    let mut reopened = Trie::from_root(root);
    for (key, value) in &model {
        let found = reopened.get(*key, &store).unwrap();
        assert_eq!(found.as_ref(), Some(value), "committed value lost on reopen");
    }
    assert_eq!(reopened.hash(), root);

    // Mutations over the lazily resolved trie must track the model.
    apply(&mut reopened, &mut model, &store, &input.later_ops);
    let mut fresh = Trie::new();
    for (key, value) in &model {
        fresh.insert(*key, value.clone(), &store).unwrap();
    }
    assert_eq!(reopened.hash(), fresh.hash(), "lazy trie diverged from rebuilt trie");
});
