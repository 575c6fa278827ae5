// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Materializes remotely-hosted service binaries into a content-keyed
//! local cache. Cache entries are keyed by the SHA-256 of the URL string
//! itself, not of the payload: the same URL always resolves to the same
//! cache directory within one resolution pass.

use crate::descriptor::ServiceDescriptor;
use crate::error::EvaluatorError;
use arcadia_logger::prelude::*;
use futures_util::future::try_join_all;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use url::Url;

const LOG_TARGET: &str = "artifact-resolver";

/// Resolve every URI-located descriptor to a local extract directory.
/// Local paths pass through unchanged. The cache directory is purged and
/// recreated once per call; downloads run concurrently and the call only
/// returns once every artifact is in place (or any one of them failed).
pub async fn resolve_services(
    descriptors: Vec<ServiceDescriptor>,
    cache_dir: &Path,
) -> Result<Vec<ServiceDescriptor>, EvaluatorError> {
    if cache_dir.exists() {
        tokio::fs::remove_dir_all(cache_dir).await.map_err(|e| {
            EvaluatorError::process(format!(
                "failed to purge artifact cache {}: {}",
                cache_dir.display(),
                e
            ))
        })?;
    }
    tokio::fs::create_dir_all(cache_dir).await.map_err(|e| {
        EvaluatorError::process(format!(
            "failed to create artifact cache {}: {}",
            cache_dir.display(),
            e
        ))
    })?;

    // One download per distinct URL; descriptors sharing an artifact share
    // the extracted directory.
    let urls: BTreeSet<String> = descriptors
        .iter()
        .filter_map(|descriptor| artifact_url(descriptor.path()))
        .map(|url| url.to_string())
        .collect();
    let client = reqwest::Client::new();
    try_join_all(
        urls.iter()
            .map(|url| download_and_extract(&client, url, cache_dir)),
    )
    .await?;
    info!(target: LOG_TARGET, "finished downloading state services");

    Ok(descriptors
        .into_iter()
        .map(|descriptor| match artifact_url(descriptor.path()) {
            Some(url) => {
                let extract_dir = cache_dir.join(cache_key(url.as_str()));
                descriptor.with_path(extract_dir.to_string_lossy().into_owned())
            }
            None => descriptor,
        })
        .collect())
}

/// Hex SHA-256 over the UTF-8 bytes of the URL string.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// A locator is remote only when it parses as an absolute http(s) URI.
fn artifact_url(path: &str) -> Option<Url> {
    Url::parse(path)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn archive_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{}.zip", key))
}

async fn download_and_extract(
    client: &reqwest::Client,
    url: &str,
    cache_dir: &Path,
) -> Result<(), EvaluatorError> {
    let key = cache_key(url);
    let archive = archive_path(cache_dir, &key);
    let extract_dir = cache_dir.join(&key);

    debug!(target: LOG_TARGET, "downloading {} to {}", url, archive.display());
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| EvaluatorError::process(format!("failed to download {}: {}", url, e)))?;
    let payload = response
        .bytes()
        .await
        .map_err(|e| EvaluatorError::process(format!("failed to download {}: {}", url, e)))?;
    tokio::fs::write(&archive, &payload).await.map_err(|e| {
        EvaluatorError::process(format!("failed to save {}: {}", archive.display(), e))
    })?;
    debug!(target: LOG_TARGET, "extracting {} to {}", archive.display(), extract_dir.display());

    let archive_for_task = archive.clone();
    let extract_for_task = extract_dir.clone();
    tokio::task::spawn_blocking(move || -> Result<(), EvaluatorError> {
        let file = std::fs::File::open(&archive_for_task).map_err(|e| {
            EvaluatorError::process(format!(
                "failed to reopen {}: {}",
                archive_for_task.display(),
                e
            ))
        })?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| {
            EvaluatorError::process(format!(
                "{} is not a readable zip archive: {}",
                archive_for_task.display(),
                e
            ))
        })?;
        zip.extract(&extract_for_task).map_err(|e| {
            EvaluatorError::process(format!(
                "failed to extract {}: {}",
                archive_for_task.display(),
                e
            ))
        })
    })
    .await
    .map_err(|e| EvaluatorError::process(format!("extraction task failed: {}", e)))??;
    debug!(target: LOG_TARGET, "finished extracting {}", extract_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::BlockRange;

    #[test]
    fn test_cache_key_is_sha256_of_url_string() {
        let key = cache_key("https://artifacts.example/v100.zip");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        // Keyed by the URL string: a different URL to the same payload is a
        // different entry, the same URL is always the same entry.
        assert_eq!(key, cache_key("https://artifacts.example/v100.zip"));
        assert_ne!(key, cache_key("https://artifacts.example/v101.zip"));
    }

    #[test]
    fn test_local_paths_are_not_artifacts() {
        assert!(artifact_url("/opt/arcadia/Evaluator.dll").is_none());
        assert!(artifact_url("relative/path.zip").is_none());
        assert!(artifact_url("file:///opt/arcadia/Evaluator.dll").is_none());
        assert!(artifact_url("https://artifacts.example/v100.zip").is_some());
        assert!(artifact_url("http://artifacts.example/v100.zip").is_some());
    }

    #[tokio::test]
    async fn test_local_descriptors_pass_through_and_cache_is_recreated() {
        let cache = tempfile::tempdir().unwrap();
        let stale = cache.path().join("stale-entry");
        std::fs::create_dir_all(&stale).unwrap();

        let descriptors = vec![ServiceDescriptor::new(
            BlockRange::since(0),
            "/opt/arcadia/Evaluator.dll",
            11000,
            "/var/arcadia/states",
            "dotnet",
        )];
        let resolved = resolve_services(descriptors.clone(), cache.path())
            .await
            .unwrap();
        assert_eq!(resolved, descriptors);
        // The purge ran even though nothing needed downloading.
        assert!(cache.path().exists());
        assert!(!stale.exists());
    }
}
