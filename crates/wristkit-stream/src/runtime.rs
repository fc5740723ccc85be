//! Tokio runtime management for pipeline drivers

use crate::DEFAULT_MERGE_CAPACITY;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};
use wristkit_core::{BuildError, BuildResult};

/// Configuration for the pipeline runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (None = current-thread runtime)
    pub worker_threads: Option<usize>,
    /// Name prefix for worker threads
    pub thread_name: String,
    /// Channel capacity handed to merge stages
    pub merge_capacity: usize,
    /// Maximum blocking threads (image and ELF work runs there)
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "wristkit-worker".to_string(),
            merge_capacity: DEFAULT_MERGE_CAPACITY,
            max_blocking_threads: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a multi-threaded runtime with `threads` workers
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}

/// Owns the Tokio runtime a build is driven on
pub struct PipelineRuntime {
    runtime: Runtime,
    config: RuntimeConfig,
}

impl PipelineRuntime {
    pub fn new(config: RuntimeConfig) -> BuildResult<Self> {
        let mut builder = match config.worker_threads {
            Some(threads) => {
                let mut builder = Builder::new_multi_thread();
                builder.worker_threads(threads.max(1));
                builder
            }
            None => Builder::new_current_thread(),
        };

        let runtime = builder
            .thread_name(&config.thread_name)
            .max_blocking_threads(config.max_blocking_threads.max(1))
            .enable_all()
            .build()
            .map_err(|e| BuildError::internal(format!("Failed to create runtime: {e}")))?;

        tracing::debug!(
            workers = ?config.worker_threads,
            merge_capacity = config.merge_capacity,
            "pipeline runtime started"
        );

        Ok(Self { runtime, config })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Block on a build, abandoning it with [`BuildError::Cancelled`] on Ctrl-C
    pub fn block_on_interruptible<F, T>(&self, future: F) -> BuildResult<T>
    where
        F: Future<Output = BuildResult<T>>,
    {
        self.runtime.block_on(async move {
            tokio::select! {
                result = future => result,
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("build interrupted");
                    Err(BuildError::Cancelled)
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "runtime/runtime_tests.rs"]
mod runtime_tests;
