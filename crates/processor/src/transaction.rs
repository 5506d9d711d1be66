//! Signed transaction model: payload encoding, hashing, sender recovery.
use alloy_primitives::{keccak256, Address, Bytes, Signature, B256, U256};
use alloy_rlp::{Encodable, Header, EMPTY_STRING_CODE};

/// A signed, state-mutating transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender-declared sequence number.
    pub nonce: u64,
    /// Price per unit of gas, in wei.
    pub gas_price: u128,
    /// Gas the sender is willing to spend.
    pub gas_limit: u64,
    /// Recipient; `None` makes this a contract creation.
    pub to: Option<Address>,
    /// Value transferred to the recipient, in wei.
    pub value: U256,
    /// Call data or creation code.
    pub data: Bytes,
    /// Secp256k1 signature over [`Transaction::signing_hash`].
    pub signature: Signature,
}

impl Transaction {
    /// Hash of the unsigned payload, the message the signature commits to.
    pub fn signing_hash(&self) -> B256 {
        let payload_length = self.payload_length();
        let mut out = Vec::with_capacity(payload_length + 4);
        Header { list: true, payload_length }.encode(&mut out);
        self.encode_payload(&mut out);
        keccak256(&out)
    }

    /// Hash identifying the signed transaction.
    pub fn hash(&self) -> B256 {
        let v = 27_u64 + u64::from(self.signature.v());
        let r = self.signature.r();
        let s = self.signature.s();
        let payload_length = self.payload_length() + v.length() + r.length() + s.length();
        let mut out = Vec::with_capacity(payload_length + 4);
        Header { list: true, payload_length }.encode(&mut out);
        self.encode_payload(&mut out);
        v.encode(&mut out);
        r.encode(&mut out);
        s.encode(&mut out);
        keccak256(&out)
    }

    /// Recovers the sender address; `None` when the signature does not
    /// resolve to one.
    pub fn recover_sender(&self) -> Option<Address> {
        self.signature
            .recover_address_from_prehash(&self.signing_hash())
            .ok()
    }

    fn payload_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.as_ref().map_or(1, Encodable::length)
            + self.value.length()
            + self.data.length()
    }

    fn encode_payload(&self, out: &mut Vec<u8>) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        match &self.to {
            Some(to) => to.encode(out),
            None => out.push(EMPTY_STRING_CODE),
        }
        self.value.encode(out);
        self.data.encode(out);
    }
}

/// Address of the contract created by `sender` with its account at
/// `nonce`: the low 20 bytes of `keccak(rlp([sender, nonce]))`.
pub fn create_address(sender: Address, nonce: u64) -> Address {
    let payload_length = sender.length() + nonce.length();
    let mut out = Vec::with_capacity(payload_length + 1);
    Header { list: true, payload_length }.encode(&mut out);
    sender.encode(&mut out);
    nonce.encode(&mut out);
    Address::from_slice(&keccak256(&out)[12..])
}
