// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use arcadia_codec::Value;
use arcadia_state_api::AccountStateDelta;
use arcadia_types::{Address, HashValue};

/// The execution context one action ran under, including the causal
/// pre-state view.
#[derive(Clone, Debug)]
pub struct ActionContext {
    pub signer: Address,
    pub miner: Address,
    pub block_index: i64,
    pub rehearsal: bool,
    pub block_action: bool,
    pub random_seed: i64,
    pub tx_id: Option<HashValue>,
    pub genesis_hash: Option<HashValue>,
    pub previous_state_root_hash: Option<HashValue>,
    pub previous_states: AccountStateDelta,
}

/// The result of executing one action in a block: the raw action value,
/// the input context and the resulting output states, plus any terminal
/// exception message and the service-side logs.
#[derive(Clone, Debug)]
pub struct ActionEvaluation {
    pub action: Value,
    pub input_context: ActionContext,
    pub output_states: AccountStateDelta,
    pub exception: Option<String>,
    pub logs: Vec<String>,
}

impl ActionEvaluation {
    pub fn signer(&self) -> &Address {
        &self.input_context.signer
    }
}
