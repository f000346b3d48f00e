// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The worker pool: a fixed-size set of long-lived threads consuming
//! closures from a bounded channel.
//!
//! This is the classic "thread pool as a channel of closures" idiom: a
//! bounded mpmc channel sized to the worker count, where a submitter that
//! outpaces the workers blocks instead of queuing unboundedly. Unlike the
//! teacher crate's `rayon::ThreadPool::scope` fan-out, which favors
//! work-stealing with no submission backpressure, this pool exists for
//! callers that want an explicit, bounded queue depth.

use crossbeam::channel::{bounded, Sender};
use once_cell::sync::Lazy;
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed pool of `worker_count` threads, each serially draining `Job`s off
/// a shared bounded channel. No shutdown: threads are daemon-like and
/// reclaimed at process exit.
pub struct WorkerPool {
    sender: Sender<Job>,
}

impl WorkerPool {
    /// Spawns `worker_count` threads immediately. `worker_count` must be
    /// greater than zero.
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker pool requires at least one worker");
        // Channel capacity equals worker count: a submitter can stay one job
        // ahead of every worker before it starts blocking.
        let (sender, receiver) = bounded::<Job>(worker_count);
        for worker_id in 0..worker_count {
            let receiver = receiver.clone();
            thread::Builder::new()
                .name(format!("tx-scheduler-worker-{worker_id}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
                .expect("failed to spawn scheduler worker thread");
        }
        Self { sender }
    }

    /// Enqueues `job`. Blocks if the channel is full — the pool's only
    /// backpressure mechanism.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .expect("scheduler worker pool has no live receivers");
    }
}

/// Process-wide singleton, sized to the host CPU count by default. Lazily
/// initialized on first use.
static DEFAULT_POOL: Lazy<WorkerPool> = Lazy::new(|| WorkerPool::new(num_cpus::get()));

/// Returns the process-wide default pool. Most callers should prefer
/// `driver::run`'s own per-call scoped pool instead, so tests and
/// independent `run` calls don't share worker state; this function exists
/// for callers that genuinely want one pool shared across the process.
pub fn default_pool() -> &'static WorkerPool {
    &DEFAULT_POOL
}
