// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Scheduler-wide configuration. `worker_threads` overrides the default
/// "host CPU count" pool size, for tests and for embedders that want to
/// share a smaller pool across several schedulers.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Apply the trusting drain when `true`: confirmation walks the level
    /// being driven rather than the whole confirm queue. Callers that
    /// cannot vouch for the accuracy of the supplied (or predicted) DAG
    /// should set this to `false`.
    pub trust_dag: bool,
    /// `None` means "host CPU count", resolved lazily the first time the
    /// default worker pool is created.
    pub worker_threads: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trust_dag: true,
            worker_threads: None,
        }
    }
}

/// Errors the embedding node's config loader can raise while validating this
/// section of its config file.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigSanitizeError {
    #[error("worker_threads must be greater than zero, got {0}")]
    ZeroWorkerThreads(usize),
}

impl SchedulerConfig {
    /// Validates invariants that `serde` alone cannot express.
    pub fn sanitize(&self) -> Result<(), ConfigSanitizeError> {
        if let Some(0) = self.worker_threads {
            return Err(ConfigSanitizeError::ZeroWorkerThreads(0));
        }
        Ok(())
    }

    pub fn resolved_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get)
    }
}
