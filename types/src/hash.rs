// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HASH_LENGTH: usize = 32;

/// A 32-byte digest identifying a block or transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
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
        let bytes = hex::decode(literal)?;
        Self::try_from(bytes.as_slice())
    }

    /// Deterministic digest for tests and fixtures.
    pub fn from_low_u8(b: u8) -> Self {
        let mut bytes = [0u8; HASH_LENGTH];
        bytes[HASH_LENGTH - 1] = b;
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for HashValue {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() == HASH_LENGTH,
            "hash must be {} bytes, got {}",
            HASH_LENGTH,
            bytes.len()
        );
        let mut inner = [0u8; HASH_LENGTH];
        inner.copy_from_slice(bytes);
        Ok(Self(inner))
    }
}

impl FromStr for HashValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self)
    }
}
