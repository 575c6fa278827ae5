// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use arcadia_codec::{DecodeError, Key, Value};
use serde::{Deserialize, Serialize};

/// One consensus validator: a public key and its voting power.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Validator {
    public_key: Vec<u8>,
    power: i64,
}

impl Validator {
    pub fn new(public_key: Vec<u8>, power: i64) -> Self {
        Self { public_key, power }
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn power(&self) -> i64 {
        self.power
    }

    pub fn to_value(&self) -> Value {
        Value::dict([
            (
                Key::text("publicKey"),
                Value::binary(self.public_key.clone()),
            ),
            (Key::text("power"), Value::Integer(i128::from(self.power))),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let public_key = value.field(&Key::text("publicKey"))?.as_binary()?.to_vec();
        let power = i64::try_from(value.field(&Key::text("power"))?.as_integer()?).map_err(
            |_| DecodeError::UnexpectedShape {
                expected: "64-bit validator power",
                found: "integer",
            },
        )?;
        Ok(Self { public_key, power })
    }
}

/// The validator set effective at some block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::list(self.validators.iter().map(Validator::to_value))
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let validators = value
            .as_list()?
            .iter()
            .map(Validator::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { validators })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_roundtrip() {
        let set = ValidatorSet::new(vec![
            Validator::new(vec![0x02; 33], 10),
            Validator::new(vec![0x03; 33], 1),
        ]);
        assert_eq!(set, ValidatorSet::from_value(&set.to_value()).unwrap());
        assert!(ValidatorSet::from_value(&ValidatorSet::empty().to_value())
            .unwrap()
            .is_empty());
    }
}
