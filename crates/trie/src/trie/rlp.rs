//! Trie node RLP decoding and list-header encoding helpers.
use super::nodes::{BranchNode, ExtensionNode, LeafNode, TrieNode};
use crate::trie::children::BranchNodeChildrenArray;
use crate::trie::TrieNode::{Branch, Digest, Extension, Leaf};
use alloy_primitives::{Bytes, B256};
use alloy_rlp::{Decodable, EMPTY_STRING_CODE, Header, PayloadView};
use alloy_trie::Nibbles;

impl TrieNode {
    /// Decodes a node from its RLP representation.
    ///
    /// A 32-byte string decodes to a digest reference, a 17-element list
    /// to a branch, and a 2-element list to a leaf or an extension
    /// depending on the hex-prefix flag of its path. An empty string
    /// decodes to `None`.
    pub(crate) fn decode(rlp_rep: &mut &[u8]) -> Result<Option<Self>, alloy_rlp::Error> {
        match Header::decode_raw(rlp_rep)? {
            PayloadView::String(payload) => {
                if payload.is_empty() {
                    Ok(None)
                } else if payload.len() == 32 {
                    Ok(Some(Self::digest(B256::from_slice(payload))))
                } else {
                    Err(alloy_rlp::Error::Custom("MPT: Invalid RLP string length"))
                }
            }
            PayloadView::List(list) => {
                if list.len() == 17 {
                    let mut children = BranchNodeChildrenArray::new();
                    for (idx, element) in list[..16].iter().enumerate() {
                        if element.len() != 1 || element[0] != EMPTY_STRING_CODE {
                            let mut element_ref = element.as_ref();
                            let child = Self::decode(&mut element_ref)?.ok_or(
                                alloy_rlp::Error::Custom("MPT: Empty branch child node"),
                            )?;
                            children.insert(idx, Box::new(child));
                        }
                    }
                    let value = list[16];
                    if value.len() != 1 || value[0] != EMPTY_STRING_CODE {
                        return Err(alloy_rlp::Error::Custom("MPT: Value in a branch node"));
                    }
                    Ok(Some(Branch(BranchNode { children, hash: None })))
                } else if list.len() == 2 {
                    let [encoded_path, value] = list.as_slice() else {
                        return Err(alloy_rlp::Error::Custom("MPT: Invalid RLP list length"));
                    };
                    let mut encoded_path_ref = encoded_path.as_ref();
                    let (path, is_leaf) = decode_path(&mut encoded_path_ref)?;
                    let mut value_ref = value.as_ref();
                    if is_leaf {
                        Ok(Some(Leaf(LeafNode {
                            path,
                            value: Bytes::decode(&mut value_ref)?,
                            hash: None,
                        })))
                    } else {
                        let child = Self::decode(&mut value_ref)?
                            .ok_or(alloy_rlp::Error::Custom("MPT: Empty extension child"))?;
                        match child {
                            Branch(_) | Digest(_) => Ok(Some(Extension(ExtensionNode {
                                path,
                                child: Box::new(child),
                                hash: None,
                            }))),
                            Extension(_) | Leaf(_) => {
                                Err(alloy_rlp::Error::Custom("MPT: Invalid extension child"))
                            }
                        }
                    }
                } else {
                    Err(alloy_rlp::Error::Custom("MPT: Invalid RLP list length"))
                }
            }
        }
    }
}

#[inline]
fn decode_path(buf: &mut &[u8]) -> alloy_rlp::Result<(Nibbles, bool)> {
    let path = Nibbles::unpack(Header::decode_bytes(buf, false)?);
    if path.len() < 2 {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let (is_leaf, odd_nibbles) = match path.at(0) {
        0b0000 => (false, false),
        0b0001 => (false, true),
        0b0010 => (true, false),
        0b0011 => (true, true),
        _ => return Err(alloy_rlp::Error::Custom("node is not an extension or leaf")),
    };
    let path = if odd_nibbles {
        path.slice(1..)
    } else {
        path.slice(2..)
    };
    Ok((path, is_leaf))
}

// Encodes list header for known payload length. Reserves memory.
#[inline]
pub(crate) fn encode_list_header(payload_length: usize) -> Vec<u8> {
    debug_assert!(payload_length > 1);
    let header = Header { list: true, payload_length };
    let mut out = Vec::with_capacity(header.length() + payload_length);
    header.encode(&mut out);
    out
}
