// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use arcadia_codec::{decode, encode, DecodeError, Key, Value};
use arcadia_state_api::{AccountStateDelta, AccountStateReader};
use arcadia_types::{Address, Currency, ValidatorSet};
use std::collections::BTreeMap;

const STATES: &str = "states";
const BALANCES: &str = "balances";
const TOTAL_SUPPLIES: &str = "totalSupplies";
const VALIDATOR_SET: &str = "validatorSet";

const BALANCE_ADDRESS: &str = "address";
const BALANCE_CURRENCY: &str = "currency";
const BALANCE_AMOUNT: &str = "amount";

/// Point form: only what this delta actually updated. Addresses touched
/// through a balance update alone resolve to no state value and are not
/// encoded.
pub fn marshal(delta: &AccountStateDelta) -> Result<Value> {
    build_dict(
        delta.states(),
        delta.balances(),
        delta.total_supplies(),
        delta.get_validator_set()?,
    )
}

/// Cumulative form: output dict `k` reflects the union of updates from
/// deltas `0..=k` applied in order, later updates overriding earlier ones.
/// Used for within-block action-by-action audit export.
pub fn marshal_each(deltas: &[AccountStateDelta]) -> Result<Vec<Value>> {
    let mut states = BTreeMap::new();
    let mut balances = BTreeMap::new();
    let mut total_supplies = BTreeMap::new();
    let mut validator_set: Option<ValidatorSet> = None;
    let mut out = Vec::with_capacity(deltas.len());
    for delta in deltas {
        states.extend(delta.states().clone());
        balances.extend(delta.balances().clone());
        total_supplies.extend(delta.total_supplies().clone());
        if let Some(set) = delta.validator_set_update() {
            validator_set = Some(set.clone());
        }
        let effective_set = match &validator_set {
            Some(set) => set.clone(),
            None => delta.get_validator_set()?,
        };
        out.push(build_dict(&states, &balances, &total_supplies, effective_set)?);
    }
    Ok(out)
}

fn build_dict(
    states: &BTreeMap<Address, Value>,
    balances: &BTreeMap<(Address, Currency), i128>,
    total_supplies: &BTreeMap<Currency, i128>,
    validator_set: ValidatorSet,
) -> Result<Value> {
    let states = Value::Dict(
        states
            .iter()
            .map(|(address, value)| (Key::binary(address.to_vec()), value.clone()))
            .collect(),
    );
    let balances = Value::list(balances.iter().map(|((address, currency), amount)| {
        Value::dict([
            (
                Key::text(BALANCE_ADDRESS),
                Value::binary(address.to_vec()),
            ),
            (Key::text(BALANCE_CURRENCY), currency.to_value()),
            (Key::text(BALANCE_AMOUNT), Value::Integer(*amount)),
        ])
    }));
    let total_supplies = Value::Dict(
        total_supplies
            .iter()
            .map(|(currency, amount)| {
                (
                    Key::binary(encode(&currency.to_value())),
                    Value::Integer(*amount),
                )
            })
            .collect(),
    );
    Ok(Value::dict([
        (Key::text(STATES), states),
        (Key::text(BALANCES), balances),
        (Key::text(TOTAL_SUPPLIES), total_supplies),
        (Key::text(VALIDATOR_SET), validator_set.to_value()),
    ]))
}

pub fn unmarshal(value: &Value) -> Result<AccountStateDelta, DecodeError> {
    let mut delta = AccountStateDelta::new();

    for (key, state) in value.field(&Key::text(STATES))?.as_dict()? {
        let address = match key {
            Key::Binary(bytes) => address_from_bytes(bytes)?,
            Key::Text(_) => {
                return Err(DecodeError::UnexpectedShape {
                    expected: "binary address key",
                    found: "text",
                })
            }
        };
        delta.set_state(address, state.clone());
    }

    for entry in value.field(&Key::text(BALANCES))?.as_list()? {
        let address = address_from_bytes(entry.field(&Key::text(BALANCE_ADDRESS))?.as_binary()?)?;
        let currency = Currency::from_value(entry.field(&Key::text(BALANCE_CURRENCY))?)?;
        let amount = entry.field(&Key::text(BALANCE_AMOUNT))?.as_integer()?;
        delta.set_balance(address, currency, amount);
    }

    for (key, amount) in value.field(&Key::text(TOTAL_SUPPLIES))?.as_dict()? {
        let currency = match key {
            Key::Binary(bytes) => Currency::from_value(&decode(bytes)?)?,
            Key::Text(_) => {
                return Err(DecodeError::UnexpectedShape {
                    expected: "binary encoded-currency key",
                    found: "text",
                })
            }
        };
        delta.set_total_supply(currency, amount.as_integer()?);
    }

    delta.set_validator_set(ValidatorSet::from_value(
        value.field(&Key::text(VALIDATOR_SET))?,
    )?);

    Ok(delta)
}

pub fn serialize(delta: &AccountStateDelta) -> Result<Vec<u8>> {
    Ok(encode(&marshal(delta)?))
}

pub fn deserialize(bytes: &[u8]) -> Result<AccountStateDelta, DecodeError> {
    unmarshal(&decode(bytes)?)
}

fn address_from_bytes(bytes: &[u8]) -> Result<Address, DecodeError> {
    Address::try_from(bytes).map_err(|_| DecodeError::UnexpectedShape {
        expected: "20-byte address",
        found: "binary",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcadia_types::Validator;

    fn gold() -> Currency {
        Currency::legacy("GOLD", 2)
    }

    fn crystal() -> Currency {
        Currency::trackable("CRYSTAL", 18)
    }

    #[test]
    fn test_serialize_roundtrip() {
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);
        let mut delta = AccountStateDelta::new();
        delta
            .set_state(a, Value::text("foo"))
            .set_state(b, Value::list([Value::text("bar"), Value::Integer(3)]))
            .set_balance(a, gold(), 250)
            .set_balance(b, crystal(), 1_000_000_000_000_000_000)
            .set_total_supply(crystal(), 5_000_000_000_000_000_000)
            .set_validator_set(ValidatorSet::new(vec![Validator::new(vec![0x02; 33], 7)]));

        let decoded = deserialize(&serialize(&delta).unwrap()).unwrap();
        assert_eq!(decoded.states(), delta.states());
        assert_eq!(decoded.balances(), delta.balances());
        assert_eq!(decoded.total_supplies(), delta.total_supplies());
        assert_eq!(
            decoded.validator_set_update(),
            delta.validator_set_update()
        );
    }

    #[test]
    fn test_point_form_drops_balance_only_addresses() {
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);
        let mut delta = AccountStateDelta::new();
        delta
            .set_state(a, Value::text("present"))
            .set_balance(b, gold(), 10);

        let marshalled = marshal(&delta).unwrap();
        let states = marshalled
            .field(&Key::text(STATES))
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(states.contains_key(&Key::binary(a.to_vec())));
        assert!(!states.contains_key(&Key::binary(b.to_vec())));

        // The balance update itself is still encoded.
        let balances = marshalled
            .field(&Key::text(BALANCES))
            .unwrap()
            .as_list()
            .unwrap();
        assert_eq!(balances.len(), 1);
    }

    #[test]
    fn test_cumulative_marshal() {
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);

        let mut d0 = AccountStateDelta::new();
        d0.set_state(a, Value::text("first"));
        let mut d1 = AccountStateDelta::new();
        d1.set_state(a, Value::text("second"))
            .set_state(b, Value::text("new"));

        let dicts = marshal_each(&[d0, d1]).unwrap();
        assert_eq!(dicts.len(), 2);

        let states0 = dicts[0].field(&Key::text(STATES)).unwrap();
        assert_eq!(
            states0.field(&Key::binary(a.to_vec())).unwrap(),
            &Value::text("first")
        );
        assert!(states0
            .field_opt(&Key::binary(b.to_vec()))
            .unwrap()
            .is_none());

        let states1 = dicts[1].field(&Key::text(STATES)).unwrap();
        assert_eq!(
            states1.field(&Key::binary(a.to_vec())).unwrap(),
            &Value::text("second")
        );
        assert_eq!(
            states1.field(&Key::binary(b.to_vec())).unwrap(),
            &Value::text("new")
        );
    }

    #[test]
    fn test_cumulative_marshal_accumulates_supplies() {
        let mut d0 = AccountStateDelta::new();
        d0.set_total_supply(crystal(), 100);
        let mut d1 = AccountStateDelta::new();
        d1.set_state(Address::from_low_u8(3), Value::Null);

        let dicts = marshal_each(&[d0, d1]).unwrap();
        // The supply update from d0 is still visible in d1's dict.
        let supplies = dicts[1]
            .field(&Key::text(TOTAL_SUPPLIES))
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(supplies.len(), 1);
    }

    #[test]
    fn test_malformed_input_is_decode_error() {
        assert!(matches!(
            deserialize(b"\xffgarbage"),
            Err(DecodeError::UnexpectedByte { .. })
        ));
        // A well-formed container of the wrong shape.
        let wrong = encode(&Value::list([Value::Integer(1)]));
        assert!(matches!(
            deserialize(&wrong),
            Err(DecodeError::UnexpectedShape { .. })
        ));
        // Required key missing.
        let missing = encode(&Value::dict([(Key::text(STATES), Value::dict([]))]));
        assert!(matches!(
            deserialize(&missing),
            Err(DecodeError::MissingKey(_))
        ));
        // Address key of the wrong width.
        let bad_address = encode(&Value::dict([
            (
                Key::text(STATES),
                Value::dict([(Key::binary(vec![0x01]), Value::Null)]),
            ),
            (Key::text(BALANCES), Value::list([])),
            (Key::text(TOTAL_SUPPLIES), Value::dict([])),
            (Key::text(VALIDATOR_SET), Value::list([])),
        ]));
        assert!(matches!(
            deserialize(&bad_address),
            Err(DecodeError::UnexpectedShape { .. })
        ));
    }
}
