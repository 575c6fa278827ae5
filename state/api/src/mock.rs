// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory [`BlockChainStates`] for tests.

use crate::{BlockChainStates, StateError};
use anyhow::Result;
use arcadia_codec::Value;
use arcadia_types::{Address, Currency, FungibleAssetValue, HashValue, ValidatorSet};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MockChainStates {
    states: BTreeMap<(HashValue, Address), Value>,
    balances: BTreeMap<(HashValue, Address, Currency), i128>,
    total_supplies: BTreeMap<(HashValue, Currency), i128>,
    validator_sets: BTreeMap<HashValue, ValidatorSet>,
}

impl MockChainStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, offset: HashValue, address: Address, value: Value) -> Self {
        self.states.insert((offset, address), value);
        self
    }

    pub fn with_balance(
        mut self,
        offset: HashValue,
        address: Address,
        currency: Currency,
        raw_value: i128,
    ) -> Self {
        self.balances.insert((offset, address, currency), raw_value);
        self
    }

    pub fn with_total_supply(
        mut self,
        offset: HashValue,
        currency: Currency,
        raw_value: i128,
    ) -> Self {
        self.total_supplies.insert((offset, currency), raw_value);
        self
    }

    pub fn with_validator_set(mut self, offset: HashValue, set: ValidatorSet) -> Self {
        self.validator_sets.insert(offset, set);
        self
    }
}

impl BlockChainStates for MockChainStates {
    fn get_state(&self, address: &Address, offset: &HashValue) -> Result<Option<Value>> {
        Ok(self.states.get(&(*offset, *address)).cloned())
    }

    fn get_balance(
        &self,
        address: &Address,
        currency: &Currency,
        offset: &HashValue,
    ) -> Result<FungibleAssetValue> {
        let raw = self
            .balances
            .get(&(*offset, *address, currency.clone()))
            .copied()
            .unwrap_or(0);
        Ok(FungibleAssetValue::from_raw(currency.clone(), raw))
    }

    fn get_total_supply(
        &self,
        currency: &Currency,
        offset: &HashValue,
    ) -> Result<FungibleAssetValue> {
        if !currency.total_supply_trackable() {
            return Err(StateError::TotalSupplyNotTrackable(currency.clone()).into());
        }
        let raw = self
            .total_supplies
            .get(&(*offset, currency.clone()))
            .copied()
            .unwrap_or(0);
        Ok(FungibleAssetValue::from_raw(currency.clone(), raw))
    }

    fn get_validator_set(&self, offset: &HashValue) -> Result<ValidatorSet> {
        Ok(self
            .validator_sets
            .get(offset)
            .cloned()
            .unwrap_or_else(ValidatorSet::empty))
    }
}
