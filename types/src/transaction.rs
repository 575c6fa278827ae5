// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::account::Address;
use crate::hash::HashValue;
use arcadia_codec::Value;
use std::collections::BTreeSet;

/// The signable portion of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: i64,
    pub signer: Address,
    pub updated_addresses: BTreeSet<Address>,
    pub timestamp: i64,
    pub actions: Vec<Value>,
    pub genesis_hash: Option<HashValue>,
}

/// A signed transaction: the unsigned body plus the signer's signature
/// over the body's canonical encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub unsigned: UnsignedTransaction,
    pub signature: Vec<u8>,
}

impl Transaction {
    pub fn new(unsigned: UnsignedTransaction, signature: Vec<u8>) -> Self {
        Self {
            unsigned,
            signature,
        }
    }

    pub fn signer(&self) -> &Address {
        &self.unsigned.signer
    }

    pub fn nonce(&self) -> i64 {
        self.unsigned.nonce
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}
