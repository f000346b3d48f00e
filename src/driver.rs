// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The block driver: for each level in order, fan the level out across a
//! worker pool, barrier on completion, then drain the confirm queue.

use crate::{
    confirm::ConfirmQueue,
    config::SchedulerConfig,
    counters,
    errors::Error,
    levels::{TxLevel, TxLevels},
    task::{Confirm, Execute, TxRequest, TxResult},
};
use crossbeam::channel::{bounded, unbounded};
use std::thread;

type Job<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// A worker pool scoped to a single `run` call, built on `std::thread::scope`
/// rather than the process-wide [`crate::pool::WorkerPool`] singleton.
///
/// It keeps the same shape as `pool::WorkerPool` (a fixed set of threads
/// draining a bounded channel of closures, sized to the worker count), but
/// its closures can safely borrow `execute` and `confirm` for the duration
/// of the call instead of requiring `'static` + `Arc`, because
/// `std::thread::scope` guarantees every spawned thread is joined before the
/// scope — and therefore this function — returns. That makes each `run`
/// call independently testable against a fresh pool instead of contending
/// with whatever else is using the shared singleton.
struct ScopedPool<'scope> {
    sender: crossbeam::channel::Sender<Job<'scope>>,
}

impl<'scope> ScopedPool<'scope> {
    fn new<'env>(scope: &'scope thread::Scope<'scope, 'env>, worker_count: usize) -> Self {
        let (sender, receiver) = bounded::<Job<'scope>>(worker_count);
        for _ in 0..worker_count {
            let receiver = receiver.clone();
            scope.spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            });
        }
        Self { sender }
    }

    fn submit(&self, job: Job<'scope>) {
        self.sender
            .send(job)
            .expect("scoped worker pool has no live receivers");
    }
}

/// Runs an entire block's `levels` to completion.
///
/// For each level in order: split it into `worker_count` chunks, submit one
/// closure per chunk to the pool, wait for every chunk's results (the
/// per-level barrier), then drain the confirm queue — `drain_trusting` when
/// `config.trust_dag`, `drain_sequential` otherwise. Returns the first fatal
/// error together with the offending `tx_index`, without scheduling further
/// levels.
pub fn run<R, O>(
    levels: &TxLevels<R>,
    execute: &impl Execute<R, O>,
    confirm: &mut impl Confirm<O>,
    config: &SchedulerConfig,
) -> Result<(), (Error<O::Error>, u32)>
where
    R: TxRequest,
    O: TxResult,
    O::Error: Clone + std::error::Error + 'static,
{
    let _timer = counters::BLOCK_RUN_SECONDS.start_timer();

    if levels.is_empty() {
        return Ok(());
    }

    let mut queue = ConfirmQueue::new(
        levels
            .levels()
            .iter()
            .flat_map(|level| level.iter().cloned()),
    );
    let worker_count = config.resolved_worker_threads().max(1);

    thread::scope(|scope| {
        let pool = ScopedPool::new(scope, worker_count);

        for level in levels.levels() {
            run_level(level, &pool, worker_count, execute, &mut queue)?;

            let result = if config.trust_dag {
                queue.drain_trusting(level, execute, confirm)
            } else {
                queue.drain_sequential(execute, confirm)
            };
            result?;
        }
        Ok(())
    })
}

fn run_level<R, O>(
    level: &TxLevel<R>,
    pool: &ScopedPool<'_>,
    worker_count: usize,
    execute: &impl Execute<R, O>,
    queue: &mut ConfirmQueue<R, O>,
) -> Result<(), (Error<O::Error>, u32)>
where
    R: TxRequest,
    O: TxResult,
    O::Error: Clone + std::error::Error + 'static,
{
    if level.is_empty() {
        return Ok(());
    }
    counters::LEVEL_SIZE.observe(level.len() as f64);

    let chunks = level.split(worker_count.min(level.len()));
    let (result_tx, result_rx) = unbounded::<O>();

    for chunk in chunks {
        let result_tx = result_tx.clone();
        pool.submit(Box::new(move || {
            for req in chunk.iter() {
                let result = execute.execute(req);
                // Receiver side outlives every sender clone for the
                // duration of this level (we drop our own handle below and
                // only read after receiving `level.len()` results), so a
                // send failure here would mean the driver stopped
                // listening early, which would itself be a scheduler bug.
                result_tx.send(result).expect("confirm collector dropped early");
            }
        }));
    }
    drop(result_tx);

    for _ in 0..level.len() {
        let result = result_rx
            .recv()
            .expect("fewer results arrived than transactions submitted");
        queue.collect(result).map_err(|err| {
            let tx_index = match &err {
                Error::IndexOutOfRange { tx_index, .. } => *tx_index,
                Error::Rerun(_) => unreachable!("collect never produces a Rerun error"),
            };
            (err, tx_index)
        })?;
    }

    Ok(())
}

/// A single-threaded sibling of [`run`], going through the same
/// `execute`/`confirm`/rerun contract with no worker pool at all. Useful
/// whenever `SchedulerConfig::worker_threads == Some(1)` would otherwise
/// just spin up a pool of one, or for a caller (e.g. a test harness) that
/// wants fully deterministic, single-threaded execution order.
pub fn run_sequential<R, O>(
    levels: &TxLevels<R>,
    execute: &impl Execute<R, O>,
    confirm: &mut impl Confirm<O>,
) -> Result<(), (Error<O::Error>, u32)>
where
    R: TxRequest,
    O: TxResult,
    O::Error: Clone + std::error::Error + 'static,
{
    if levels.is_empty() {
        return Ok(());
    }

    let mut queue = ConfirmQueue::new(
        levels
            .levels()
            .iter()
            .flat_map(|level| level.iter().cloned()),
    );

    for level in levels.levels() {
        for req in level.iter() {
            let result = execute.execute(req);
            queue.collect(result).map_err(|err| {
                let tx_index = match &err {
                    Error::IndexOutOfRange { tx_index, .. } => *tx_index,
                    Error::Rerun(_) => unreachable!("collect never produces a Rerun error"),
                };
                (err, tx_index)
            })?;
        }
        queue.drain_sequential(execute, confirm)?;
    }

    Ok(())
}
