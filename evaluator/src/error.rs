// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failure kinds of the action-evaluation subsystem. Every kind is raised
/// synchronously to the immediate caller; nothing here retries.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("service ranges must cover the whole chain: {reason}")]
    Configuration { reason: String },
    #[error("no configured service range contains block index {index}")]
    Resolution { index: i64 },
    #[error("state service process failure: {reason}")]
    Process { reason: String },
    #[error("remote evaluation transport failure: {reason}")]
    Transport { reason: String },
}

impl EvaluatorError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn process(reason: impl Into<String>) -> Self {
        Self::Process {
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}
