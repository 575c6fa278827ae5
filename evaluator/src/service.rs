// Copyright (c) The Arcadia Core Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::descriptor::ServiceDescriptor;
use crate::error::EvaluatorError;
use crate::evaluation::ActionEvaluation;
use crate::remote::RemoteEvaluator;
use arcadia_logger::prelude::*;
use arcadia_state_api::BlockChainStates;
use arcadia_types::{HashValue, PreEvaluationBlock};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

const LOG_TARGET: &str = "state-service";

/// How long `stop` waits for the child to exit after the kill signal.
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// The seam the range router supervises: a startable/stoppable evaluator
/// bound to one block range.
#[async_trait]
pub trait RangedService: Send + Sync {
    fn uri(&self) -> &str;

    async fn start(&mut self) -> Result<(), EvaluatorError>;

    async fn stop(&mut self) -> Result<(), EvaluatorError>;

    async fn evaluate(
        &self,
        block: &PreEvaluationBlock,
        base_state_root_hash: Option<HashValue>,
        chain_states: &Arc<dyn BlockChainStates>,
    ) -> anyhow::Result<Vec<ActionEvaluation>>;
}

/// Wrapper around one out-of-process evaluator binary: launch, log piping,
/// graceful stop. Start and stop are driven exclusively by the range
/// router; callers must not start an already-running instance.
pub struct StateService {
    runtime: String,
    binary_path: String,
    port: u16,
    uri: String,
    state_store_path: PathBuf,
    running: bool,
    child: Option<Child>,
}

impl StateService {
    pub fn new(descriptor: &ServiceDescriptor) -> Self {
        Self::with_parts(
            descriptor.runtime(),
            descriptor.path(),
            descriptor.port(),
            descriptor.state_store_path(),
        )
    }

    fn with_parts(
        runtime: &str,
        binary_path: &str,
        port: u16,
        state_store_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime: runtime.to_string(),
            binary_path: binary_path.to_string(),
            port,
            uri: format!("http://localhost:{}/evaluation", port),
            state_store_path: state_store_path.into(),
            running: false,
            child: None,
        }
    }

    /// The same service bound to a different (resolved) binary path,
    /// sharing port and state store.
    pub fn with_path(&self, path: &str) -> Self {
        Self::with_parts(&self.runtime, path, self.port, &self.state_store_path)
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn running(&self) -> bool {
        self.running
    }

    fn pipe_logs<R>(reader: R, error_stream: bool)
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if error_stream {
                    error!(target: LOG_TARGET, "{}", line);
                } else {
                    debug!(target: LOG_TARGET, "{}", line);
                }
            }
        });
    }
}

#[async_trait]
impl RangedService for StateService {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn start(&mut self) -> Result<(), EvaluatorError> {
        info!(
            target: LOG_TARGET,
            "starting {} {} on port {}", self.runtime, self.binary_path, self.port
        );
        let mut child = Command::new(&self.runtime)
            .arg(&self.binary_path)
            .arg(format!("--urls=http://localhost:{}", self.port))
            .env("StateStorePath", self.state_store_path.join("states"))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // last line of defense; the router's stop path is the contract
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EvaluatorError::process(format!(
                    "failed to spawn {} {}: {}",
                    self.runtime, self.binary_path, e
                ))
            })?;
        if let Some(stdout) = child.stdout.take() {
            Self::pipe_logs(stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            Self::pipe_logs(stderr, true);
        }
        self.child = Some(child);
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EvaluatorError> {
        let mut child = match self.child.take() {
            Some(child) => child,
            None => {
                self.running = false;
                return Ok(());
            }
        };
        // The kill signal goes out before the first await, so a cancelled
        // stop still leaves no process behind.
        child
            .start_kill()
            .map_err(|e| EvaluatorError::process(format!("failed to signal child: {}", e)))?;
        match tokio::time::timeout(STOP_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(target: LOG_TARGET, "state service exited: {}", status);
                self.running = false;
                Ok(())
            }
            Ok(Err(e)) => Err(EvaluatorError::process(format!(
                "failed to await child exit: {}",
                e
            ))),
            Err(_) => Err(EvaluatorError::process(format!(
                "state service on port {} did not exit within {:?}",
                self.port, STOP_TIMEOUT
            ))),
        }
    }

    async fn evaluate(
        &self,
        block: &PreEvaluationBlock,
        base_state_root_hash: Option<HashValue>,
        chain_states: &Arc<dyn BlockChainStates>,
    ) -> anyhow::Result<Vec<ActionEvaluation>> {
        RemoteEvaluator::new(&self.uri, chain_states.clone())
            .evaluate(block, base_state_root_hash)
            .await
    }
}
