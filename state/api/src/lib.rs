// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Account-state reader seams shared between the chain and the
//! action-evaluation subsystem.

use anyhow::Result;
use arcadia_codec::Value;
use arcadia_types::{Address, Currency, FungibleAssetValue, HashValue, ValidatorSet};
use std::sync::Arc;
use thiserror::Error;

mod delta;
pub mod mock;

pub use delta::AccountStateDelta;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(
        "the total supply of {0} is not trackable; it is a legacy currency established \
         before total supply tracking was introduced"
    )]
    TotalSupplyNotTrackable(Currency),
}

/// Read access to account state at one point of the causal chain.
pub trait AccountStateReader: Send + Sync {
    fn get_state(&self, address: &Address) -> Result<Option<Value>>;

    fn get_balance(&self, address: &Address, currency: &Currency) -> Result<FungibleAssetValue>;

    fn get_total_supply(&self, currency: &Currency) -> Result<FungibleAssetValue>;

    fn get_validator_set(&self) -> Result<ValidatorSet>;
}

/// The chain-side oracle: base getters at a given block hash offset.
/// Consumed only as the seed of the per-block causal chain.
pub trait BlockChainStates: Send + Sync {
    fn get_state(&self, address: &Address, offset: &HashValue) -> Result<Option<Value>>;

    fn get_balance(
        &self,
        address: &Address,
        currency: &Currency,
        offset: &HashValue,
    ) -> Result<FungibleAssetValue>;

    fn get_total_supply(&self, currency: &Currency, offset: &HashValue)
        -> Result<FungibleAssetValue>;

    fn get_validator_set(&self, offset: &HashValue) -> Result<ValidatorSet>;
}

/// An [`AccountStateReader`] view of a [`BlockChainStates`] pinned to one
/// previous-block hash.
pub struct OracleStateReader {
    states: Arc<dyn BlockChainStates>,
    offset: HashValue,
}

impl OracleStateReader {
    pub fn new(states: Arc<dyn BlockChainStates>, offset: HashValue) -> Self {
        Self { states, offset }
    }
}

impl AccountStateReader for OracleStateReader {
    fn get_state(&self, address: &Address) -> Result<Option<Value>> {
        self.states.get_state(address, &self.offset)
    }

    fn get_balance(&self, address: &Address, currency: &Currency) -> Result<FungibleAssetValue> {
        self.states.get_balance(address, currency, &self.offset)
    }

    fn get_total_supply(&self, currency: &Currency) -> Result<FungibleAssetValue> {
        self.states.get_total_supply(currency, &self.offset)
    }

    fn get_validator_set(&self) -> Result<ValidatorSet> {
        self.states.get_validator_set(&self.offset)
    }
}

/// Getters for a block with no previous block. Every state is absent, every
/// balance is zero and the validator set is empty; querying the total supply
/// of a non-trackable currency is a domain error.
pub struct NullStateReader;

impl AccountStateReader for NullStateReader {
    fn get_state(&self, _address: &Address) -> Result<Option<Value>> {
        Ok(None)
    }

    fn get_balance(&self, _address: &Address, currency: &Currency) -> Result<FungibleAssetValue> {
        Ok(currency.zero())
    }

    fn get_total_supply(&self, currency: &Currency) -> Result<FungibleAssetValue> {
        if !currency.total_supply_trackable() {
            return Err(StateError::TotalSupplyNotTrackable(currency.clone()).into());
        }
        Ok(currency.zero())
    }

    fn get_validator_set(&self) -> Result<ValidatorSet> {
        Ok(ValidatorSet::empty())
    }
}
