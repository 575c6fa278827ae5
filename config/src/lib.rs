// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration surface consumed by the action-evaluation subsystem.
//! Ownership of the file on disk belongs to the host node; this crate only
//! defines the shape and the toml load/save helpers.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One versioned state service and the block-height range it is
/// authoritative for. Bounds are inclusive; an omitted `end` means
/// "until the end of the chain".
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceRangeConfig {
    pub start: i64,
    #[serde(default = "unbounded_end")]
    pub end: i64,
    /// Local path of the service binary, or an absolute URI of a zip
    /// archive to download.
    pub path: String,
    pub port: u16,
    pub state_store_path: PathBuf,
    #[serde(default = "default_runtime")]
    pub runtime: Option<String>,
}

fn unbounded_end() -> i64 {
    i64::MAX
}

fn default_runtime() -> Option<String> {
    None
}

impl ServiceRangeConfig {
    pub const DEFAULT_RUNTIME: &'static str = "dotnet";

    pub fn runtime(&self) -> &str {
        self.runtime.as_deref().unwrap_or(Self::DEFAULT_RUNTIME)
    }

    pub fn is_unbounded(&self) -> bool {
        self.end == i64::MAX
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Ordered by `start`; the router validates full contiguous coverage.
    #[serde(default)]
    pub services: Vec<ServiceRangeConfig>,
    /// Shared cache directory for downloaded service archives.
    pub download_cache_path: PathBuf,
}

pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    P: AsRef<Path>,
{
    let mut file = File::open(&path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(toml::from_str(&contents)?)
}

pub fn save_config<T, P>(c: &T, output_file: P) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    P: AsRef<Path>,
{
    let mut file = File::create(output_file)?;
    file.write_all(to_toml(c)?.as_bytes())?;
    Ok(())
}

fn to_toml<T>(c: &T) -> Result<String>
where
    T: Serialize + DeserializeOwned,
{
    // fix toml table ordering problem, see https://github.com/alexcrichton/toml-rs/issues/142
    let c = toml::value::Value::try_from(c)?;
    Ok(toml::to_string(&c)?)
}
