// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::account::Address;
use arcadia_codec::{DecodeError, Key, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A fungible currency definition. Identity is structural: two currencies
/// are interchangeable only when every field matches.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency {
    ticker: String,
    decimal_places: u8,
    minters: Option<BTreeSet<Address>>,
    total_supply_trackable: bool,
}

impl Currency {
    pub fn new(
        ticker: impl Into<String>,
        decimal_places: u8,
        minters: Option<BTreeSet<Address>>,
        total_supply_trackable: bool,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            decimal_places,
            minters,
            total_supply_trackable,
        }
    }

    /// A currency established before supply tracking existed; its total
    /// supply cannot be queried.
    pub fn legacy(ticker: impl Into<String>, decimal_places: u8) -> Self {
        Self::new(ticker, decimal_places, None, false)
    }

    /// A supply-tracked currency without minter restriction.
    pub fn trackable(ticker: impl Into<String>, decimal_places: u8) -> Self {
        Self::new(ticker, decimal_places, None, true)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn decimal_places(&self) -> u8 {
        self.decimal_places
    }

    pub fn minters(&self) -> Option<&BTreeSet<Address>> {
        self.minters.as_ref()
    }

    pub fn total_supply_trackable(&self) -> bool {
        self.total_supply_trackable
    }

    pub fn zero(&self) -> FungibleAssetValue {
        FungibleAssetValue::from_raw(self.clone(), 0)
    }

    pub fn to_value(&self) -> Value {
        Value::dict([
            (Key::text("ticker"), Value::text(self.ticker.clone())),
            (
                Key::text("decimals"),
                Value::Integer(i128::from(self.decimal_places)),
            ),
            (
                Key::text("minters"),
                match &self.minters {
                    None => Value::Null,
                    Some(minters) => Value::list(
                        minters.iter().map(|minter| Value::binary(minter.to_vec())),
                    ),
                },
            ),
            (
                Key::text("totalSupplyTrackable"),
                Value::Bool(self.total_supply_trackable),
            ),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let ticker = value.field(&Key::text("ticker"))?.as_text()?.to_string();
        let decimal_places = u8::try_from(value.field(&Key::text("decimals"))?.as_integer()?)
            .map_err(|_| DecodeError::UnexpectedShape {
                expected: "decimal places in 0..=255",
                found: "integer",
            })?;
        let minters = match value.field(&Key::text("minters"))? {
            Value::Null => None,
            list => Some(
                list.as_list()?
                    .iter()
                    .map(|minter| {
                        Address::try_from(minter.as_binary()?).map_err(|_| {
                            DecodeError::UnexpectedShape {
                                expected: "20-byte address",
                                found: "binary",
                            }
                        })
                    })
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
        };
        let total_supply_trackable = value
            .field(&Key::text("totalSupplyTrackable"))?
            .as_bool()?;
        Ok(Self {
            ticker,
            decimal_places,
            minters,
            total_supply_trackable,
        })
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker)
    }
}

/// An amount of a specific currency, held as the raw integral value
/// (the quantity times `10^decimal_places`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FungibleAssetValue {
    currency: Currency,
    raw_value: i128,
}

impl FungibleAssetValue {
    pub fn from_raw(currency: Currency, raw_value: i128) -> Self {
        Self {
            currency,
            raw_value,
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn raw_value(&self) -> i128 {
        self.raw_value
    }

    pub fn is_zero(&self) -> bool {
        self.raw_value == 0
    }
}

impl fmt::Display for FungibleAssetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.raw_value, self.currency.ticker)
    }
}
