// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::evaluation::ActionContext;
use crate::marshal::delta;
use anyhow::Result;
use arcadia_codec::{decode, encode, DecodeError, Key, Value};
use arcadia_types::{Address, HashValue};

const BLOCK_ACTION: &str = "block_action";
const MINER: &str = "miner";
const REHEARSAL: &str = "rehearsal";
const BLOCK_INDEX: &str = "block_index";
const RANDOM_SEED: &str = "random_seed";
const SIGNER: &str = "signer";
const PREVIOUS_STATES: &str = "previous_states";
const GENESIS_HASH: &str = "genesis_hash";
const TX_ID: &str = "tx_id";
const PREVIOUS_STATE_ROOT_HASH: &str = "previous_state_root_hash";

pub fn marshal(context: &ActionContext) -> Result<Value> {
    let mut entries = vec![
        (Key::text(BLOCK_ACTION), Value::Bool(context.block_action)),
        (Key::text(MINER), Value::text(context.miner.to_hex())),
        (Key::text(REHEARSAL), Value::Bool(context.rehearsal)),
        (
            Key::text(BLOCK_INDEX),
            Value::Integer(i128::from(context.block_index)),
        ),
        (
            Key::text(RANDOM_SEED),
            Value::Integer(i128::from(context.random_seed)),
        ),
        (Key::text(SIGNER), Value::text(context.signer.to_hex())),
        (
            Key::text(PREVIOUS_STATES),
            delta::marshal(&context.previous_states)?,
        ),
    ];
    if let Some(genesis_hash) = &context.genesis_hash {
        entries.push((
            Key::text(GENESIS_HASH),
            Value::binary(genesis_hash.to_vec()),
        ));
    }
    if let Some(tx_id) = &context.tx_id {
        entries.push((Key::text(TX_ID), Value::binary(tx_id.to_vec())));
    }
    if let Some(root) = &context.previous_state_root_hash {
        entries.push((
            Key::text(PREVIOUS_STATE_ROOT_HASH),
            Value::binary(root.to_vec()),
        ));
    }
    Ok(Value::dict(entries))
}

pub fn unmarshal(value: &Value) -> Result<ActionContext, DecodeError> {
    Ok(ActionContext {
        signer: address_from_hex(value.field(&Key::text(SIGNER))?.as_text()?)?,
        miner: address_from_hex(value.field(&Key::text(MINER))?.as_text()?)?,
        block_index: integer_field(value, BLOCK_INDEX)?,
        rehearsal: value.field(&Key::text(REHEARSAL))?.as_bool()?,
        block_action: value.field(&Key::text(BLOCK_ACTION))?.as_bool()?,
        random_seed: integer_field(value, RANDOM_SEED)?,
        tx_id: optional_hash(value, TX_ID)?,
        genesis_hash: optional_hash(value, GENESIS_HASH)?,
        previous_state_root_hash: optional_hash(value, PREVIOUS_STATE_ROOT_HASH)?,
        previous_states: delta::unmarshal(value.field(&Key::text(PREVIOUS_STATES))?)?,
    })
}

pub fn serialize(context: &ActionContext) -> Result<Vec<u8>> {
    Ok(encode(&marshal(context)?))
}

pub fn deserialize(bytes: &[u8]) -> Result<ActionContext, DecodeError> {
    unmarshal(&decode(bytes)?)
}

fn integer_field(value: &Value, key: &str) -> Result<i64, DecodeError> {
    i64::try_from(value.field(&Key::text(key))?.as_integer()?).map_err(|_| {
        DecodeError::UnexpectedShape {
            expected: "64-bit integer",
            found: "integer",
        }
    })
}

fn optional_hash(value: &Value, key: &str) -> Result<Option<HashValue>, DecodeError> {
    value
        .field_opt(&Key::text(key))?
        .map(|v| {
            HashValue::try_from(v.as_binary()?).map_err(|_| DecodeError::UnexpectedShape {
                expected: "32-byte hash",
                found: "binary",
            })
        })
        .transpose()
}

fn address_from_hex(literal: &str) -> Result<Address, DecodeError> {
    Address::from_hex(literal).map_err(|_| DecodeError::UnexpectedShape {
        expected: "hex-encoded address",
        found: "text",
    })
}
