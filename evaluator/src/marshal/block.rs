// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::marshal::transaction;
use arcadia_codec::{decode, encode, DecodeError, Key, Value};
use arcadia_types::{
    Address, HashValue, PreEvaluationBlock, PreEvaluationBlockHeader,
};

const INDEX: &str = "index";
const MINER: &str = "miner";
const TIMESTAMP: &str = "timestamp";
const PREVIOUS_HASH: &str = "previous_hash";
const PROTOCOL_VERSION: &str = "protocol_version";
const TRANSACTIONS: &str = "transactions";

pub fn marshal(block: &PreEvaluationBlock) -> Value {
    let header = &block.header;
    let mut entries = vec![
        (Key::text(INDEX), Value::Integer(i128::from(header.index))),
        (Key::text(MINER), Value::binary(header.miner.to_vec())),
        (
            Key::text(TIMESTAMP),
            Value::Integer(i128::from(header.timestamp)),
        ),
        (
            Key::text(PROTOCOL_VERSION),
            Value::Integer(i128::from(header.protocol_version)),
        ),
        (
            Key::text(TRANSACTIONS),
            Value::list(block.transactions.iter().map(transaction::marshal)),
        ),
    ];
    if let Some(previous_hash) = &header.previous_hash {
        entries.push((
            Key::text(PREVIOUS_HASH),
            Value::binary(previous_hash.to_vec()),
        ));
    }
    Value::dict(entries)
}

pub fn unmarshal(value: &Value) -> Result<PreEvaluationBlock, DecodeError> {
    let index = integer_field(value, INDEX)?;
    let miner = Address::try_from(value.field(&Key::text(MINER))?.as_binary()?).map_err(|_| {
        DecodeError::UnexpectedShape {
            expected: "20-byte miner address",
            found: "binary",
        }
    })?;
    let timestamp = integer_field(value, TIMESTAMP)?;
    let protocol_version = integer_field(value, PROTOCOL_VERSION)?;
    let previous_hash = value
        .field_opt(&Key::text(PREVIOUS_HASH))?
        .map(|v| {
            HashValue::try_from(v.as_binary()?).map_err(|_| DecodeError::UnexpectedShape {
                expected: "32-byte previous hash",
                found: "binary",
            })
        })
        .transpose()?;
    let transactions = value
        .field(&Key::text(TRANSACTIONS))?
        .as_list()?
        .iter()
        .map(transaction::unmarshal)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PreEvaluationBlock::new(
        PreEvaluationBlockHeader {
            index,
            miner,
            timestamp,
            previous_hash,
            protocol_version,
        },
        transactions,
    ))
}

pub fn serialize(block: &PreEvaluationBlock) -> Vec<u8> {
    encode(&marshal(block))
}

pub fn deserialize(bytes: &[u8]) -> Result<PreEvaluationBlock, DecodeError> {
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
