// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::descriptor::{BlockRange, ServiceDescriptor};
use crate::error::EvaluatorError;
use crate::evaluation::ActionEvaluation;
use crate::resolver;
use crate::service::{RangedService, StateService};
use arcadia_logger::prelude::*;
use arcadia_state_api::BlockChainStates;
use arcadia_types::{HashValue, PreEvaluationBlock};
use std::path::Path;
use std::sync::Arc;

const LOG_TARGET: &str = "range-router";

/// The single mutable slot of the router: which service, if any, is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Current {
    Unset,
    Running(usize),
}

/// Routes each block to the state service whose range contains its index
/// and supervises that service's lifecycle: at most one service process is
/// alive at any time, and switching ranges fully stops the old process
/// before the new one starts.
///
/// Not designed for concurrent callers; `evaluate` takes `&mut self` and a
/// deployment needing concurrency must serialize access externally.
pub struct RangeRouter<S = StateService> {
    services: Vec<(BlockRange, S)>,
    current: Current,
    chain_states: Arc<dyn BlockChainStates>,
}

impl RangeRouter<StateService> {
    /// Validate coverage, materialize remote artifacts and build one
    /// (not-yet-started) service per configured range. Fails fast: no
    /// partial router survives a bad range table or a failed artifact.
    pub async fn new(
        descriptors: Vec<ServiceDescriptor>,
        download_cache_dir: &Path,
        chain_states: Arc<dyn BlockChainStates>,
    ) -> Result<Self, EvaluatorError> {
        let ranges: Vec<BlockRange> = descriptors.iter().map(ServiceDescriptor::range).collect();
        check_coverage(&ranges)?;
        let resolved = resolver::resolve_services(descriptors, download_cache_dir).await?;
        let services = resolved
            .iter()
            .map(|descriptor| (descriptor.range(), StateService::new(descriptor)))
            .collect();
        Ok(Self {
            services,
            current: Current::Unset,
            chain_states,
        })
    }
}

impl<S: RangedService> RangeRouter<S> {
    /// Build a router over pre-constructed services. Ranges must satisfy
    /// the same coverage invariant as configured descriptors.
    pub fn with_services(
        services: Vec<(BlockRange, S)>,
        chain_states: Arc<dyn BlockChainStates>,
    ) -> Result<Self, EvaluatorError> {
        let ranges: Vec<BlockRange> = services.iter().map(|(range, _)| *range).collect();
        check_coverage(&ranges)?;
        Ok(Self {
            services,
            current: Current::Unset,
            chain_states,
        })
    }

    /// The range of the currently live service, if any.
    pub fn current_range(&self) -> Option<BlockRange> {
        match self.current {
            Current::Unset => None,
            Current::Running(slot) => Some(self.services[slot].0),
        }
    }

    /// Evaluate a block on the service owning its index, starting or
    /// switching services as needed. The switch is synchronous: the old
    /// process is confirmed stopped before the new one starts.
    pub async fn evaluate(
        &mut self,
        block: &PreEvaluationBlock,
        base_state_root_hash: Option<HashValue>,
    ) -> anyhow::Result<Vec<ActionEvaluation>> {
        let index = block.index();
        let slot = loop {
            match self.current {
                Current::Unset => {
                    let slot = self
                        .services
                        .iter()
                        .position(|(range, _)| range.contains(index))
                        .ok_or(EvaluatorError::Resolution { index })?;
                    let (range, service) = &mut self.services[slot];
                    info!(target: LOG_TARGET, "starting service for range {}", range);
                    service.start().await?;
                    self.current = Current::Running(slot);
                    break slot;
                }
                Current::Running(slot) if self.services[slot].0.contains(index) => break slot,
                Current::Running(slot) => {
                    let (range, service) = &mut self.services[slot];
                    info!(
                        target: LOG_TARGET,
                        "block {} left range {}, stopping its service", index, range
                    );
                    service.stop().await?;
                    self.current = Current::Unset;
                }
            }
        };
        self.services[slot]
            .1
            .evaluate(block, base_state_root_hash, &self.chain_states)
            .await
    }

    /// Stop whatever is running. Callers own the exit path and invoke this
    /// when the router goes out of service.
    pub async fn shutdown(&mut self) -> Result<(), EvaluatorError> {
        if let Current::Running(slot) = self.current {
            self.services[slot].1.stop().await?;
            self.current = Current::Unset;
        }
        Ok(())
    }
}

/// Ranges must cover the whole chain: first starts at 0, last is
/// unbounded, and each range begins right after its predecessor ends.
fn check_coverage(ranges: &[BlockRange]) -> Result<(), EvaluatorError> {
    let first = match ranges.first() {
        Some(first) => first,
        None => {
            return Err(EvaluatorError::configuration(
                "at least one service range is required",
            ))
        }
    };
    if first.start() != 0 {
        return Err(EvaluatorError::configuration(format!(
            "the first range must start at block 0 but starts at {}",
            first.start()
        )));
    }
    let last = ranges.last().expect("ranges is non-empty");
    if !last.is_unbounded() {
        return Err(EvaluatorError::configuration(format!(
            "the last range must be unbounded but ends at {}",
            last.end()
        )));
    }
    for window in ranges.windows(2) {
        if window[0].end().saturating_add(1) != window[1].start() {
            return Err(EvaluatorError::configuration(format!(
                "range ending at {} is followed by range starting at {}",
                window[0].end(),
                window[1].start()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(bounds: &[(i64, i64)]) -> Vec<BlockRange> {
        bounds
            .iter()
            .map(|(start, end)| BlockRange::new(*start, *end))
            .collect()
    }

    #[test]
    fn test_coverage_accepts_contiguous_full_cover() {
        check_coverage(&ranges(&[(0, i64::MAX)])).unwrap();
        check_coverage(&ranges(&[(0, 99), (100, 4999), (5000, i64::MAX)])).unwrap();
    }

    #[test]
    fn test_coverage_rejects_violations() {
        // Empty table.
        assert!(matches!(
            check_coverage(&[]),
            Err(EvaluatorError::Configuration { .. })
        ));
        // First range does not start at zero.
        assert!(check_coverage(&ranges(&[(1, i64::MAX)])).is_err());
        // Last range is bounded.
        assert!(check_coverage(&ranges(&[(0, 100)])).is_err());
        // Gap between ranges.
        assert!(check_coverage(&ranges(&[(0, 99), (101, i64::MAX)])).is_err());
        // Overlap between ranges.
        assert!(check_coverage(&ranges(&[(0, 100), (100, i64::MAX)])).is_err());
    }

    #[test]
    fn test_coverage_error_names_the_boundary() {
        let err = check_coverage(&ranges(&[(0, 99), (101, i64::MAX)])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("99"), "unexpected message: {}", message);
        assert!(message.contains("101"), "unexpected message: {}", message);
    }
}
