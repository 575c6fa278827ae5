// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use arcadia_config::ServiceRangeConfig;
use std::fmt;
use std::path::{Path, PathBuf};

/// An inclusive block-height range. `i64::MAX` as the end bound means
/// "until the end of the chain".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    start: i64,
    end: i64,
}

impl BlockRange {
    pub const UNBOUNDED: i64 = i64::MAX;

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn since(start: i64) -> Self {
        Self::new(start, Self::UNBOUNDED)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, index: i64) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.end == Self::UNBOUNDED
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "[{}, ∞)", self.start)
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}

/// One configured state service: the range it is authoritative for and
/// everything needed to launch it. Immutable once the path is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    range: BlockRange,
    path: String,
    port: u16,
    state_store_path: PathBuf,
    runtime: String,
}

impl ServiceDescriptor {
    pub fn new(
        range: BlockRange,
        path: impl Into<String>,
        port: u16,
        state_store_path: impl Into<PathBuf>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            range,
            path: path.into(),
            port,
            state_store_path: state_store_path.into(),
            runtime: runtime.into(),
        }
    }

    pub fn from_config(config: &ServiceRangeConfig) -> Self {
        Self::new(
            BlockRange::new(config.start, config.end),
            config.path.clone(),
            config.port,
            config.state_store_path.clone(),
            config.runtime(),
        )
    }

    /// The same service bound to a different (resolved) binary path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    pub fn range(&self) -> BlockRange {
        self.range
    }

    /// Local path of the service binary, or the artifact URI before
    /// resolution.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state_store_path(&self) -> &Path {
        &self.state_store_path
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let range = BlockRange::new(10, 20);
        assert!(!range.contains(9));
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(21));
        assert!(BlockRange::since(0).contains(i64::MAX));
    }

    #[test]
    fn test_from_config_applies_defaults() {
        let config = ServiceRangeConfig {
            start: 0,
            end: i64::MAX,
            path: "/opt/arcadia/Evaluator.dll".to_string(),
            port: 11000,
            state_store_path: "/var/arcadia/states".into(),
            runtime: None,
        };
        let descriptor = ServiceDescriptor::from_config(&config);
        assert_eq!(descriptor.range(), BlockRange::since(0));
        assert!(descriptor.range().is_unbounded());
        assert_eq!(descriptor.runtime(), "dotnet");
        assert_eq!(descriptor.port(), 11000);
    }

    #[test]
    fn test_with_path_keeps_port_and_store() {
        let descriptor = ServiceDescriptor::new(
            BlockRange::since(0),
            "https://artifacts.example/v100.zip",
            11000,
            "/var/arcadia/states",
            "dotnet",
        );
        let rebound = descriptor.with_path("/var/cache/abc123");
        assert_eq!(rebound.path(), "/var/cache/abc123");
        assert_eq!(rebound.port(), descriptor.port());
        assert_eq!(rebound.state_store_path(), descriptor.state_store_path());
        assert_eq!(rebound.range(), descriptor.range());
    }
}
