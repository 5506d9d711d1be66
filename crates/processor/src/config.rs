//! Gas schedule and chain parameters, passed to the processor explicitly.
use crate::transaction::Transaction;

/// Chain parameters of the processor.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Chain identifier exposed to the execution engine.
    pub chain_id: u64,
    /// Flat gas cost of any transaction.
    pub base_tx_gas: u64,
    /// Gas per zero byte of call data.
    pub data_zero_gas: u64,
    /// Gas per non-zero byte of call data.
    pub data_nonzero_gas: u64,
    /// Extra gas for a contract-creating transaction.
    pub creation_gas: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            base_tx_gas: 21_000,
            data_zero_gas: 4,
            data_nonzero_gas: 16,
            creation_gas: 32_000,
        }
    }
}

impl ChainConfig {
    /// Gas a transaction consumes before any code runs: the flat cost,
    /// per-byte call-data cost and the creation surcharge.
    pub fn intrinsic_gas(&self, tx: &Transaction) -> u64 {
        let data_gas: u64 = tx
            .data
            .iter()
            .map(|byte| {
                if *byte == 0 {
                    self.data_zero_gas
                } else {
                    self.data_nonzero_gas
                }
            })
            .sum();
        let creation_gas = if tx.to.is_none() { self.creation_gas } else { 0 };
        self.base_tx_gas + data_gas + creation_gas
    }
}
