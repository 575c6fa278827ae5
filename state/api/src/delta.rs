// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{AccountStateReader, StateError};
use anyhow::Result;
use arcadia_codec::Value;
use arcadia_types::{Address, Currency, FungibleAssetValue, ValidatorSet};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// The account-state changes produced by evaluating one or more actions,
/// layered copy-on-write over a base reader: any address, balance or
/// currency the delta itself did not touch falls through to the base.
#[derive(Clone, Default)]
pub struct AccountStateDelta {
    states: BTreeMap<Address, Value>,
    balances: BTreeMap<(Address, Currency), i128>,
    total_supplies: BTreeMap<Currency, i128>,
    validator_set: Option<ValidatorSet>,
    base: Option<Arc<dyn AccountStateReader>>,
}

impl AccountStateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, address: Address, value: Value) -> &mut Self {
        self.states.insert(address, value);
        self
    }

    pub fn set_balance(&mut self, address: Address, currency: Currency, raw_value: i128) -> &mut Self {
        self.balances.insert((address, currency), raw_value);
        self
    }

    pub fn set_total_supply(&mut self, currency: Currency, raw_value: i128) -> &mut Self {
        self.total_supplies.insert(currency, raw_value);
        self
    }

    pub fn set_validator_set(&mut self, validator_set: ValidatorSet) -> &mut Self {
        self.validator_set = Some(validator_set);
        self
    }

    /// Install the causal parent this delta falls through to.
    pub fn set_base(&mut self, base: Arc<dyn AccountStateReader>) {
        self.base = Some(base);
    }

    pub fn states(&self) -> &BTreeMap<Address, Value> {
        &self.states
    }

    pub fn balances(&self) -> &BTreeMap<(Address, Currency), i128> {
        &self.balances
    }

    pub fn total_supplies(&self) -> &BTreeMap<Currency, i128> {
        &self.total_supplies
    }

    pub fn validator_set_update(&self) -> Option<&ValidatorSet> {
        self.validator_set.as_ref()
    }

    /// Every address this delta touched, whether through a state update or
    /// a balance update.
    pub fn updated_addresses(&self) -> BTreeSet<Address> {
        self.states
            .keys()
            .copied()
            .chain(self.balances.keys().map(|(address, _)| *address))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.balances.is_empty()
            && self.total_supplies.is_empty()
            && self.validator_set.is_none()
    }
}

impl fmt::Debug for AccountStateDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStateDelta")
            .field("states", &self.states)
            .field("balances", &self.balances)
            .field("total_supplies", &self.total_supplies)
            .field("validator_set", &self.validator_set)
            .field("has_base", &self.base.is_some())
            .finish()
    }
}

impl AccountStateReader for AccountStateDelta {
    fn get_state(&self, address: &Address) -> Result<Option<Value>> {
        if let Some(value) = self.states.get(address) {
            return Ok(Some(value.clone()));
        }
        match &self.base {
            Some(base) => base.get_state(address),
            None => Ok(None),
        }
    }

    fn get_balance(&self, address: &Address, currency: &Currency) -> Result<FungibleAssetValue> {
        if let Some(raw) = self.balances.get(&(*address, currency.clone())) {
            return Ok(FungibleAssetValue::from_raw(currency.clone(), *raw));
        }
        match &self.base {
            Some(base) => base.get_balance(address, currency),
            None => Ok(currency.zero()),
        }
    }

    fn get_total_supply(&self, currency: &Currency) -> Result<FungibleAssetValue> {
        if let Some(raw) = self.total_supplies.get(currency) {
            return Ok(FungibleAssetValue::from_raw(currency.clone(), *raw));
        }
        match &self.base {
            Some(base) => base.get_total_supply(currency),
            None => {
                if !currency.total_supply_trackable() {
                    return Err(StateError::TotalSupplyNotTrackable(currency.clone()).into());
                }
                Ok(currency.zero())
            }
        }
    }

    fn get_validator_set(&self) -> Result<ValidatorSet> {
        if let Some(set) = &self.validator_set {
            return Ok(set.clone());
        }
        match &self.base {
            Some(base) => base.get_validator_set(),
            None => Ok(ValidatorSet::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcadia_types::Validator;

    #[test]
    fn test_fall_through_layering() {
        let gold = Currency::legacy("GOLD", 2);
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);

        let mut lower = AccountStateDelta::new();
        lower
            .set_state(a, Value::text("from-lower"))
            .set_state(b, Value::text("shadowed"))
            .set_balance(a, gold.clone(), 100)
            .set_validator_set(ValidatorSet::new(vec![Validator::new(vec![0x02; 33], 1)]));

        let mut upper = AccountStateDelta::new();
        upper.set_state(b, Value::text("from-upper"));
        upper.set_base(Arc::new(lower));

        // Own update wins, untouched keys fall through.
        assert_eq!(
            upper.get_state(&b).unwrap(),
            Some(Value::text("from-upper"))
        );
        assert_eq!(
            upper.get_state(&a).unwrap(),
            Some(Value::text("from-lower"))
        );
        assert_eq!(upper.get_balance(&a, &gold).unwrap().raw_value(), 100);
        assert_eq!(upper.get_validator_set().unwrap().validators().len(), 1);
        assert!(upper
            .get_state(&Address::from_low_u8(99))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unbased_delta_answers_like_genesis() {
        let delta = AccountStateDelta::new();
        let gold = Currency::legacy("GOLD", 2);
        let a = Address::from_low_u8(1);
        assert!(delta.get_state(&a).unwrap().is_none());
        assert!(delta.get_balance(&a, &gold).unwrap().is_zero());
        assert!(delta.get_total_supply(&gold).is_err());
        assert!(delta.get_validator_set().unwrap().is_empty());
    }

    #[test]
    fn test_updated_addresses_unions_states_and_balances() {
        let gold = Currency::legacy("GOLD", 2);
        let a = Address::from_low_u8(1);
        let b = Address::from_low_u8(2);
        let mut delta = AccountStateDelta::new();
        delta.set_state(a, Value::Null).set_balance(b, gold, 5);
        let updated = delta.updated_addresses();
        assert!(updated.contains(&a) && updated.contains(&b));
        assert_eq!(updated.len(), 2);
    }
}
