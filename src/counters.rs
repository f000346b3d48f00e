// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Purely observational metrics. Nothing in this module ever influences a
//! scheduling decision; errors and reruns are reported to `execute`/`confirm`
//! themselves, and these counters just mirror that activity for dashboards.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

pub static LEVEL_SIZE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "parallel_tx_scheduler_level_size",
        "Number of transactions in each dependency level handed to the worker pool."
    )
    .unwrap()
});

pub static LEVELS_PER_BLOCK: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "parallel_tx_scheduler_levels_per_block",
        "Number of dependency levels `build_levels` produced for a block."
    )
    .unwrap()
});

pub static RERUN_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "parallel_tx_scheduler_rerun_total",
        "Reruns triggered during drain, split by why the rerun happened.",
        &["reason"]
    )
    .unwrap()
});

pub static BROKEN_DAG_FALLBACK: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "parallel_tx_scheduler_broken_dag_fallback_total",
        "Transactions placed on the current open level because none of their \
         declared predecessors had been placed yet (broken DAG tolerance)."
    )
    .unwrap()
});

pub static HIGHWATER: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "parallel_tx_scheduler_highwater",
        "Highest txIndex confirmed so far in the block currently being driven."
    )
    .unwrap()
});

pub static BLOCK_RUN_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "parallel_tx_scheduler_block_run_seconds",
        "Wall-clock time spent in a single `driver::run` call."
    )
    .unwrap()
});
