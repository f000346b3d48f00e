// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The seam between the scheduler and its external collaborators (VM
//! execution, state commit), expressed as traits rather than closures —
//! `Confirm` needs to carry `&mut self` state (the canonical-state commit
//! cursor) across calls, and a trait documents that capability at the call
//! site more clearly than a `FnMut` bound would.

use crate::address::Address;

/// A single transaction awaiting execution. Opaque to the scheduler except
/// for its index and the two addresses it touches.
pub trait TxRequest: Send + Sync {
    /// 0-based position in the block. Unique and dense across a `TxLevels`.
    fn tx_index(&self) -> u32;
    fn from(&self) -> Address;
    fn to(&self) -> Option<Address>;
}

/// Output of a single `execute` call. Opaque to the scheduler except for the
/// back-reference to its originating transaction and the execution error.
pub trait TxResult: Send {
    type Error;

    fn tx_index(&self) -> u32;

    /// `Some` denotes a parallel-execution failure (typically a speculative
    /// state-read conflict) — non-fatal, triggers a rerun.
    fn exec_err(&self) -> Option<&Self::Error>;
}

/// Runs a single transaction. Must be safe to call concurrently from
/// multiple worker threads and must always return a result, even for a
/// failed execution — failure is carried in the result via
/// [`TxResult::exec_err`], not via this trait's own `Result`.
pub trait Execute<R, O>: Send + Sync
where
    R: TxRequest,
    O: TxResult,
{
    fn execute(&self, req: &R) -> O;
}

/// Commits a single transaction's result against canonical state. Invoked
/// single-threaded in strictly ascending `tx_index` order. An `Err` means
/// "conflict, please rerun".
pub trait Confirm<O>
where
    O: TxResult,
{
    fn confirm(&mut self, result: &O) -> Result<(), O::Error>;
}
