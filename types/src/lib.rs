// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod account;
pub mod block;
pub mod currency;
pub mod hash;
pub mod transaction;
pub mod validator;

pub use account::Address;
pub use block::{PreEvaluationBlock, PreEvaluationBlockHeader};
pub use currency::{Currency, FungibleAssetValue};
pub use hash::HashValue;
pub use transaction::{Transaction, UnsignedTransaction};
pub use validator::{Validator, ValidatorSet};
