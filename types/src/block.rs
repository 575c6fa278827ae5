// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::account::Address;
use crate::hash::HashValue;
use crate::transaction::Transaction;

/// Header of a block prepared for action execution, before any per-action
/// results are attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreEvaluationBlockHeader {
    pub index: i64,
    pub miner: Address,
    pub timestamp: i64,
    pub previous_hash: Option<HashValue>,
    pub protocol_version: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreEvaluationBlock {
    pub header: PreEvaluationBlockHeader,
    pub transactions: Vec<Transaction>,
}

impl PreEvaluationBlock {
    pub fn new(header: PreEvaluationBlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn index(&self) -> i64 {
        self.header.index
    }

    /// `None` only for the genesis block.
    pub fn previous_hash(&self) -> Option<&HashValue> {
        self.header.previous_hash.as_ref()
    }
}
