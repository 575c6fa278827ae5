// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Marshalling between domain types and the deterministic binary container.
//!
//! Account deltas, action contexts and evaluations use literal text keys;
//! transactions use the historical single-byte binary keys with `0x53`
//! ("S") reserved for the signature.

pub mod block;
pub mod context;
pub mod delta;
pub mod evaluation;
pub mod transaction;
