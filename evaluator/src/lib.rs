// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distributed action evaluation.
//!
//! Blocks are not evaluated in-process: an out-of-process, version-pinned
//! state service is selected per block height along hard-fork boundaries,
//! launched on demand and called over HTTP with codec-encoded payloads. The
//! per-action results come back as account-state deltas whose getters are
//! chained causally across the block.

pub mod descriptor;
pub mod error;
pub mod evaluation;
pub mod marshal;
pub mod remote;
pub mod resolver;
pub mod router;
pub mod service;

pub use descriptor::{BlockRange, ServiceDescriptor};
pub use error::EvaluatorError;
pub use evaluation::{ActionContext, ActionEvaluation};
pub use remote::RemoteEvaluator;
pub use router::RangeRouter;
pub use service::{RangedService, StateService};
