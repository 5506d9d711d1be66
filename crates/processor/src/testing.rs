//! Builders and keys for tests.
use crate::transaction::Transaction;
use alloy_primitives::{Address, Bytes, Signature, B256, U256};
use k256::ecdsa::SigningKey;

/// A deterministic secp256k1 key derived from `seed`. Seeds up to `0xba`
/// stay below the curve order.
pub fn test_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&B256::repeat_byte(seed).0.into()).expect("seed is a valid scalar")
}

/// The address controlled by `key`.
pub fn address_of(key: &SigningKey) -> Address {
    Address::from_private_key(key)
}

/// Builder for signed transactions.
///
/// Defaults describe the simplest valid transfer: nonce 0, gas price 1,
/// gas limit 21 000, value 1 wei, empty call data.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: Option<Address>,
    value: U256,
    data: Bytes,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self {
            nonce: 0,
            gas_price: 1,
            gas_limit: 21_000,
            to: Some(Address::ZERO),
            value: U256::from(1),
            data: Bytes::new(),
        }
    }
}

impl TransactionBuilder {
    /// Starts from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the gas price.
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Sets the gas limit.
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sets the recipient.
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Makes the transaction a contract creation.
    pub fn creation(mut self) -> Self {
        self.to = None;
        self
    }

    /// Sets the transferred value.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the call data.
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Signs the payload with `key`, producing a transaction whose
    /// sender recovers to [`address_of`]`(key)`.
    pub fn signed(self, key: &SigningKey) -> Transaction {
        let mut tx = self.unresolvable();
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(tx.signing_hash().as_slice())
            .expect("signing with a valid key cannot fail");
        tx.signature = Signature::new(
            U256::from_be_slice(signature.r().to_bytes().as_slice()),
            U256::from_be_slice(signature.s().to_bytes().as_slice()),
            recovery_id.is_y_odd(),
        );
        tx
    }

    /// Attaches an all-zero signature that resolves to no sender.
    pub fn unresolvable(self) -> Transaction {
        Transaction {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data,
            signature: Signature::new(U256::ZERO, U256::ZERO, false),
        }
    }
}
