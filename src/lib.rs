// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A level-partitioned parallel transaction execution scheduler.
//!
//! A block's transactions are partitioned into ordered *levels* such that no
//! two transactions on the same level depend on each other
//! ([`builder::build_levels`]), optionally over a DAG synthesized by a
//! conservative address-collision heuristic ([`predictor::predict_tx_dag`])
//! when the caller has no DAG of its own. Levels are then driven one at a
//! time ([`driver::run`]): each level's transactions fan out across a
//! worker pool for speculative execution, and a single confirm cursor
//! ([`confirm::ConfirmQueue`]) commits their results back in strict
//! ascending `tx_index` order, re-executing and re-confirming any
//! transaction whose result conflicts with state committed since it ran.
//!
//! Unlike the Block-STM executor this crate's worker pool and driver take
//! their shape from, there is no speculative multi-versioned state store or
//! validation/abort machinery here: conflicts are detected by the caller's
//! own [`task::Execute`] / [`task::Confirm`] implementations, and the
//! scheduler's only job is to order and rerun around them.

pub mod address;
pub mod builder;
pub mod confirm;
pub mod config;
pub mod counters;
pub mod dag;
pub mod driver;
pub mod errors;
pub mod levels;
pub mod pool;
pub mod predictor;
pub mod task;

pub use address::Address;
pub use builder::build_levels;
pub use config::SchedulerConfig;
pub use dag::{BTreeTxDag, TxDag, TxDep, TxDepFlag};
pub use errors::{Error, RerunFailure};
pub use levels::{TxLevel, TxLevels};
pub use predictor::{predict_tx_dag, predict_tx_dag_for_block};
pub use task::{Confirm, Execute, TxRequest, TxResult};
