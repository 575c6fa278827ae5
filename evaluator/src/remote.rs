// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::EvaluatorError;
use crate::evaluation::ActionEvaluation;
use crate::marshal;
use anyhow::Result;
use arcadia_state_api::{
    AccountStateReader, BlockChainStates, NullStateReader, OracleStateReader,
};
use arcadia_types::{HashValue, PreEvaluationBlock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize, Deserialize)]
struct RemoteEvaluationRequest {
    #[serde(rename = "PreEvaluationBlock", with = "base64_bytes")]
    pre_evaluation_block: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct RemoteEvaluationResponse {
    #[serde(rename = "Evaluations", with = "base64_list")]
    evaluations: Vec<Vec<u8>>,
}

/// RPC client against one state service's evaluation endpoint. The
/// response payloads carry per-action results in block order; this client
/// restores the causal getter chain across them before returning.
pub struct RemoteEvaluator {
    endpoint: String,
    chain_states: Arc<dyn BlockChainStates>,
    client: reqwest::Client,
}

impl RemoteEvaluator {
    pub fn new(endpoint: impl Into<String>, chain_states: Arc<dyn BlockChainStates>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("http client construction cannot fail with static options");
        Self {
            endpoint: endpoint.into(),
            chain_states,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Evaluate every action of `block` on the remote service. Transport
    /// failure or a malformed response fails the whole block; any retry
    /// policy belongs to the caller.
    pub async fn evaluate(
        &self,
        block: &PreEvaluationBlock,
        _base_state_root_hash: Option<HashValue>,
    ) -> Result<Vec<ActionEvaluation>> {
        let request = RemoteEvaluationRequest {
            pre_evaluation_block: marshal::block::serialize(block),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                EvaluatorError::transport(format!("POST {} failed: {}", self.endpoint, e))
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(EvaluatorError::transport(format!(
                "{} answered {}",
                self.endpoint, status
            ))
            .into());
        }
        let envelope: RemoteEvaluationResponse = response.json().await.map_err(|e| {
            EvaluatorError::transport(format!("malformed evaluation envelope: {}", e))
        })?;

        let mut evaluations = envelope
            .evaluations
            .iter()
            .map(|payload| marshal::evaluation::deserialize(payload))
            .collect::<Result<Vec<_>, _>>()?;
        chain_evaluations(&mut evaluations, block.previous_hash(), &self.chain_states);
        Ok(evaluations)
    }
}

/// Restore the causal state chain across the ordered evaluations of one
/// block: evaluation 0 reads through the oracle at the previous hash (or
/// the null getters at genesis), evaluation `i` reads through evaluation
/// `i-1`'s output, and every output answers untouched keys through its own
/// input view.
pub fn chain_evaluations(
    evaluations: &mut [ActionEvaluation],
    previous_hash: Option<&HashValue>,
    chain_states: &Arc<dyn BlockChainStates>,
) {
    let mut parent: Arc<dyn AccountStateReader> = match previous_hash {
        Some(previous_hash) => Arc::new(OracleStateReader::new(
            chain_states.clone(),
            *previous_hash,
        )),
        None => Arc::new(NullStateReader),
    };
    for evaluation in evaluations.iter_mut() {
        evaluation.input_context.previous_states.set_base(parent);
        evaluation
            .output_states
            .set_base(Arc::new(evaluation.input_context.previous_states.clone()));
        parent = Arc::new(evaluation.output_states.clone());
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        payloads: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(payloads.iter().map(|payload| base64::encode(payload)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|payload| base64::decode(payload).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ActionContext;
    use arcadia_codec::Value;
    use arcadia_state_api::mock::MockChainStates;
    use arcadia_state_api::{AccountStateDelta, StateError};
    use arcadia_types::{Address, Currency};

    fn evaluation(signer: Address) -> ActionEvaluation {
        ActionEvaluation {
            action: Value::Null,
            input_context: ActionContext {
                signer,
                miner: Address::from_low_u8(0xee),
                block_index: 1,
                rehearsal: false,
                block_action: false,
                random_seed: 0,
                tx_id: None,
                genesis_hash: None,
                previous_state_root_hash: None,
                previous_states: AccountStateDelta::new(),
            },
            output_states: AccountStateDelta::new(),
            exception: None,
            logs: vec![],
        }
    }

    #[test]
    fn test_chaining_threads_outputs_into_inputs() {
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);
        let previous = HashValue::from_low_u8(0x11);
        let oracle: Arc<dyn BlockChainStates> = Arc::new(
            MockChainStates::new().with_state(previous, a, Value::text("from-oracle")),
        );

        let mut first = evaluation(a);
        first.output_states.set_state(a, Value::text("after-0"));
        let mut second = evaluation(b);
        second.output_states.set_state(b, Value::text("after-1"));
        let mut evaluations = vec![first, second];

        chain_evaluations(&mut evaluations, Some(&previous), &oracle);

        // Evaluation 0 reads the oracle at the previous hash.
        assert_eq!(
            evaluations[0]
                .input_context
                .previous_states
                .get_state(&a)
                .unwrap(),
            Some(Value::text("from-oracle"))
        );
        // Evaluation 1's pre-state getters answer like evaluation 0's
        // post-state getters, address by address.
        for address in [a, b, Address::from_low_u8(9)] {
            assert_eq!(
                evaluations[1]
                    .input_context
                    .previous_states
                    .get_state(&address)
                    .unwrap(),
                evaluations[0].output_states.get_state(&address).unwrap(),
            );
        }
        // Its own update still wins over the chained view.
        assert_eq!(
            evaluations[1].output_states.get_state(&b).unwrap(),
            Some(Value::text("after-1"))
        );
        // And untouched keys fall through all the way to the oracle.
        assert_eq!(
            evaluations[1].output_states.get_state(&a).unwrap(),
            Some(Value::text("after-0"))
        );
    }

    #[test]
    fn test_chaining_does_not_requery_oracle_per_action() {
        // The oracle state is shadowed by action 0's output; action 1 must
        // see the shadowing value, not the oracle's.
        let a = Address::from_low_u8(1);
        let previous = HashValue::from_low_u8(0x11);
        let oracle: Arc<dyn BlockChainStates> =
            Arc::new(MockChainStates::new().with_state(previous, a, Value::text("stale")));

        let mut first = evaluation(a);
        first.output_states.set_state(a, Value::text("fresh"));
        let mut evaluations = vec![first, evaluation(a)];
        chain_evaluations(&mut evaluations, Some(&previous), &oracle);

        assert_eq!(
            evaluations[1]
                .input_context
                .previous_states
                .get_state(&a)
                .unwrap(),
            Some(Value::text("fresh"))
        );
    }

    #[test]
    fn test_genesis_chain_uses_null_getters() {
        let a = Address::from_low_u8(1);
        let oracle: Arc<dyn BlockChainStates> = Arc::new(MockChainStates::new());
        let mut evaluations = vec![evaluation(a)];
        chain_evaluations(&mut evaluations, None, &oracle);

        let pre = &evaluations[0].input_context.previous_states;
        assert!(pre.get_state(&a).unwrap().is_none());

        let gold = Currency::legacy("GOLD", 2);
        let balance = pre.get_balance(&a, &gold).unwrap();
        assert!(balance.is_zero());
        assert_eq!(balance.currency(), &gold);

        let crystal = Currency::trackable("CRYSTAL", 18);
        assert!(pre.get_total_supply(&crystal).unwrap().is_zero());
        let err = pre.get_total_supply(&gold).unwrap_err();
        assert!(err.downcast_ref::<StateError>().is_some());

        assert!(pre.get_validator_set().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_encoding() {
        let request = RemoteEvaluationRequest {
            pre_evaluation_block: vec![0x64, 0x65], // "de"
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"PreEvaluationBlock":"ZGU="}"#);
        let parsed: RemoteEvaluationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pre_evaluation_block, request.pre_evaluation_block);

        let response: RemoteEvaluationResponse =
            serde_json::from_str(r#"{"Evaluations":["ZGU=","bg=="]}"#).unwrap();
        assert_eq!(response.evaluations, vec![b"de".to_vec(), b"n".to_vec()]);
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"Evaluations":["ZGU=","bg=="]}"#
        );

        let bad: Result<RemoteEvaluationRequest, _> =
            serde_json::from_str(r#"{"PreEvaluationBlock":"not base64!"}"#);
        assert!(bad.is_err());
    }
}
