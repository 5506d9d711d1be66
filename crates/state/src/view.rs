//! Account-level view over the state trie and per-account storage tries.
use crate::error::StateError;
use alloy_primitives::{keccak256, Address, B256, KECCAK256_EMPTY, U256};
use alloy_trie::{TrieAccount, EMPTY_ROOT_HASH};
use ledger_trie::{B256Map, KeyValueStore, TreeVisitor, Trie, TrieError, VisitContext};

/// Account state over a backing store.
///
/// The account trie is opened at a state root; storage tries are opened
/// lazily, keyed by the hashed owner address, and their roots are folded
/// back into the owning accounts by [`StateView::state_root`].
#[derive(Debug)]
pub struct StateView<S> {
    store: S,
    state: Trie,
    storages: B256Map<Trie>,
}

impl<S: KeyValueStore> StateView<S> {
    /// Opens the state at `state_root`.
    pub fn new(store: S, state_root: B256) -> Self {
        Self {
            store,
            state: Trie::from_root(state_root),
            storages: B256Map::default(),
        }
    }

    /// Opens an empty state.
    pub fn empty(store: S) -> Self {
        Self::new(store, EMPTY_ROOT_HASH)
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the view and returns the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the account under `address`, if it exists.
    pub fn account(&mut self, address: Address) -> Result<Option<TrieAccount>, StateError> {
        self.account_by_hash(keccak256(address))
    }

    /// Balance of `address`; zero for a nonexistent account.
    pub fn balance(&mut self, address: Address) -> Result<U256, StateError> {
        Ok(self.account(address)?.map_or(U256::ZERO, |acc| acc.balance))
    }

    /// Nonce of `address`; zero for a nonexistent account.
    pub fn nonce(&mut self, address: Address) -> Result<u64, StateError> {
        Ok(self.account(address)?.map_or(0, |acc| acc.nonce))
    }

    /// Code hash of `address`; the empty-code hash for a nonexistent
    /// account or one without code.
    pub fn code_hash(&mut self, address: Address) -> Result<B256, StateError> {
        Ok(self
            .account(address)?
            .map_or(KECCAK256_EMPTY, |acc| acc.code_hash))
    }

    /// Creates a fresh account with `balance`, overriding any existing
    /// account under `address`.
    pub fn create_account(&mut self, address: Address, balance: U256) -> Result<(), StateError> {
        let account = TrieAccount { balance, ..blank_account() };
        self.set_account(keccak256(address), &account)
    }

    /// Adds `amount` to the balance of `address`, creating the account
    /// when absent.
    pub fn add_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        let hashed = keccak256(address);
        let mut account = self.account_by_hash(hashed)?.unwrap_or_else(blank_account);
        account.balance = account.balance.saturating_add(amount);
        self.set_account(hashed, &account)
    }

    /// Subtracts `amount` from the balance of `address`.
    pub fn sub_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError> {
        let hashed = keccak256(address);
        let mut account = self.account_by_hash(hashed)?.unwrap_or_else(blank_account);
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(StateError::BalanceUnderflow(address))?;
        self.set_account(hashed, &account)
    }

    /// Increments the nonce of `address`, creating the account when
    /// absent.
    pub fn increment_nonce(&mut self, address: Address) -> Result<(), StateError> {
        let hashed = keccak256(address);
        let mut account = self.account_by_hash(hashed)?.unwrap_or_else(blank_account);
        account.nonce += 1;
        self.set_account(hashed, &account)
    }

    /// Sets the code hash of `address`, creating the account when absent.
    pub fn set_code_hash(&mut self, address: Address, code_hash: B256) -> Result<(), StateError> {
        let hashed = keccak256(address);
        let mut account = self.account_by_hash(hashed)?.unwrap_or_else(blank_account);
        account.code_hash = code_hash;
        self.set_account(hashed, &account)
    }

    /// Reads storage slot `slot` of `address`; zero when unset.
    pub fn storage(&mut self, address: Address, slot: U256) -> Result<U256, StateError> {
        let hashed = keccak256(address);
        self.ensure_storage_loaded(hashed)?;
        let slot_key = keccak256(B256::from(slot));
        let Some(trie) = self.storages.get_mut(&hashed) else {
            return Ok(U256::ZERO);
        };
        match trie.get(slot_key, &self.store)? {
            None => Ok(U256::ZERO),
            Some(bytes) => {
                alloy_rlp::decode_exact::<U256>(&bytes).map_err(|err| StateError::Malformed {
                    hashed: slot_key,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Writes storage slot `slot` of `address`. Writing zero deletes the
    /// slot.
    pub fn set_storage(
        &mut self,
        address: Address,
        slot: U256,
        value: U256,
    ) -> Result<(), StateError> {
        let hashed = keccak256(address);
        self.ensure_storage_loaded(hashed)?;
        let slot_key = keccak256(B256::from(slot));
        let Some(trie) = self.storages.get_mut(&hashed) else {
            return Ok(());
        };
        if value.is_zero() {
            trie.remove(slot_key, &self.store)?;
        } else {
            trie.insert(slot_key, alloy_rlp::encode(value).into(), &self.store)?;
        }
        Ok(())
    }

    /// Folds the storage roots into their accounts and returns the state
    /// root.
    pub fn state_root(&mut self) -> Result<B256, StateError> {
        let mut roots = Vec::with_capacity(self.storages.len());
        for (hashed, trie) in &mut self.storages {
            roots.push((*hashed, trie.hash()));
        }
        for (hashed, root) in roots {
            // Storage of a deleted account is dropped with the account.
            let Some(mut account) = self.account_by_hash(hashed)? else {
                continue;
            };
            if account.storage_root != root {
                account.storage_root = root;
                self.set_account(hashed, &account)?;
            }
        }
        Ok(self.state.hash())
    }

    /// Persists the account trie and every opened storage trie to the
    /// store and returns the state root.
    pub fn commit(&mut self) -> Result<B256, StateError> {
        self.state_root()?;
        for trie in self.storages.values_mut() {
            trie.commit(&mut self.store);
        }
        Ok(self.state.commit(&mut self.store))
    }

    /// Walks the committed state, accounts first and storage tries off
    /// their account leaves.
    pub fn accept(&mut self, visitor: &mut dyn TreeVisitor) -> Result<(), TrieError> {
        let mut ctx = VisitContext::new(true);
        self.state.accept(visitor, &self.store, &mut ctx)
    }

    fn account_by_hash(&mut self, hashed: B256) -> Result<Option<TrieAccount>, StateError> {
        match self.state.get(hashed, &self.store)? {
            None => Ok(None),
            Some(bytes) => alloy_rlp::decode_exact::<TrieAccount>(&bytes)
                .map(Some)
                .map_err(|err| StateError::Malformed {
                    hashed,
                    reason: err.to_string(),
                }),
        }
    }

    fn set_account(&mut self, hashed: B256, account: &TrieAccount) -> Result<(), StateError> {
        self.state
            .insert(hashed, alloy_rlp::encode(account).into(), &self.store)?;
        Ok(())
    }

    // Opens the storage trie of `hashed` at the root recorded in its
    // account, once.
    fn ensure_storage_loaded(&mut self, hashed: B256) -> Result<(), StateError> {
        if self.storages.contains_key(&hashed) {
            return Ok(());
        }
        let root = self
            .account_by_hash(hashed)?
            .map_or(EMPTY_ROOT_HASH, |acc| acc.storage_root);
        self.storages.insert(hashed, Trie::from_root(root));
        Ok(())
    }
}

fn blank_account() -> TrieAccount {
    TrieAccount {
        nonce: 0,
        balance: U256::ZERO,
        storage_root: EMPTY_ROOT_HASH,
        code_hash: KECCAK256_EMPTY,
    }
}
