// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transaction marshalling. Historical single-byte binary keys; the
//! signed form is the unsigned dictionary plus key `0x53` ("S") holding
//! the signature.

use anyhow::Result;
use arcadia_codec::{decode, encode, DecodeError, Key, Value};
use arcadia_types::{Address, HashValue, Transaction, UnsignedTransaction};
use std::collections::BTreeSet;

const NONCE: u8 = b'n';
const SIGNER: u8 = b's';
const UPDATED_ADDRESSES: u8 = b'u';
const TIMESTAMP: u8 = b't';
const ACTIONS: u8 = b'a';
const GENESIS_HASH: u8 = b'g';
pub const SIGNATURE: u8 = 0x53; // "S"

fn key(byte: u8) -> Key {
    Key::binary(vec![byte])
}

pub fn marshal_unsigned(tx: &UnsignedTransaction) -> Value {
    let mut entries = vec![
        (key(NONCE), Value::Integer(i128::from(tx.nonce))),
        (key(SIGNER), Value::binary(tx.signer.to_vec())),
        (
            key(UPDATED_ADDRESSES),
            Value::list(
                tx.updated_addresses
                    .iter()
                    .map(|address| Value::binary(address.to_vec())),
            ),
        ),
        (key(TIMESTAMP), Value::Integer(i128::from(tx.timestamp))),
        (key(ACTIONS), Value::List(tx.actions.clone())),
    ];
    if let Some(genesis_hash) = &tx.genesis_hash {
        entries.push((key(GENESIS_HASH), Value::binary(genesis_hash.to_vec())));
    }
    Value::dict(entries)
}

pub fn marshal(tx: &Transaction) -> Value {
    let mut dict = match marshal_unsigned(&tx.unsigned) {
        Value::Dict(dict) => dict,
        _ => unreachable!("unsigned transaction marshals to a dict"),
    };
    dict.insert(key(SIGNATURE), Value::binary(tx.signature.clone()));
    Value::Dict(dict)
}

pub fn unmarshal_unsigned(value: &Value) -> Result<UnsignedTransaction, DecodeError> {
    let nonce = i64::try_from(value.field(&key(NONCE))?.as_integer()?).map_err(|_| {
        DecodeError::UnexpectedShape {
            expected: "64-bit nonce",
            found: "integer",
        }
    })?;
    let signer = address_from_bytes(value.field(&key(SIGNER))?.as_binary()?)?;
    let updated_addresses = value
        .field(&key(UPDATED_ADDRESSES))?
        .as_list()?
        .iter()
        .map(|address| address_from_bytes(address.as_binary()?))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let timestamp = i64::try_from(value.field(&key(TIMESTAMP))?.as_integer()?).map_err(|_| {
        DecodeError::UnexpectedShape {
            expected: "64-bit timestamp",
            found: "integer",
        }
    })?;
    let actions = value.field(&key(ACTIONS))?.as_list()?.to_vec();
    let genesis_hash = value
        .field_opt(&key(GENESIS_HASH))?
        .map(|v| {
            HashValue::try_from(v.as_binary()?).map_err(|_| DecodeError::UnexpectedShape {
                expected: "32-byte genesis hash",
                found: "binary",
            })
        })
        .transpose()?;
    Ok(UnsignedTransaction {
        nonce,
        signer,
        updated_addresses,
        timestamp,
        actions,
        genesis_hash,
    })
}

pub fn unmarshal(value: &Value) -> Result<Transaction, DecodeError> {
    let unsigned = unmarshal_unsigned(value)?;
    let signature = value.field(&key(SIGNATURE))?.as_binary()?.to_vec();
    Ok(Transaction::new(unsigned, signature))
}

pub fn serialize(tx: &Transaction) -> Vec<u8> {
    encode(&marshal(tx))
}

pub fn deserialize(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    unmarshal(&decode(bytes)?)
}

fn address_from_bytes(bytes: &[u8]) -> Result<Address, DecodeError> {
    Address::try_from(bytes).map_err(|_| DecodeError::UnexpectedShape {
        expected: "20-byte address",
        found: "binary",
    })
}
