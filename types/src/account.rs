// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LENGTH: usize = 20;

/// An account address, 20 bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(literal: &str) -> Result<Self> {
        let literal = literal.strip_prefix("0x").unwrap_or(literal);
        let bytes = hex::decode(literal)?;
        Self::try_from(bytes.as_slice())
    }

    /// Deterministic address for tests and fixtures.
    pub fn from_low_u8(b: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = b;
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() == ADDRESS_LENGTH,
            "address must be {} bytes, got {}",
            ADDRESS_LENGTH,
            bytes.len()
        );
        let mut inner = [0u8; ADDRESS_LENGTH];
        inner.copy_from_slice(bytes);
        Ok(Self(inner))
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let address = Address::from_low_u8(0xab);
        let parsed = Address::from_hex(&address.to_hex()).unwrap();
        assert_eq!(address, parsed);
        let prefixed: Address = format!("0x{}", address.to_hex()).parse().unwrap();
        assert_eq!(address, prefixed);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(Address::try_from([0u8; 19].as_slice()).is_err());
        assert!(Address::from_hex("abcd").is_err());
    }
}
