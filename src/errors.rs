// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types surfaced by the scheduler itself, as opposed to errors
//! returned by the caller-supplied [`Execute`](crate::task::Execute) /
//! [`Confirm`](crate::task::Confirm) implementations.

use thiserror::Error;

/// Errors the scheduler can return from [`crate::driver::run`].
///
/// `E` is the caller's execution/confirmation error type, threaded through
/// unchanged so a fatal rerun failure can be inspected by the caller.
#[derive(Debug, Error)]
pub enum Error<E: std::error::Error + 'static> {
    /// `ConfirmQueue::collect` received a result whose `tx_index` falls
    /// outside the queue, which can only happen if the caller's `TxLevels`
    /// and `ConfirmQueue` disagree on block size. Always a programming
    /// error in the embedding code, never in the transactions themselves.
    #[error("collect received txIndex {tx_index} outside confirm queue of length {queue_len}")]
    IndexOutOfRange { tx_index: u32, queue_len: usize },

    /// A rerun's `execute` or `confirm` failed again. Fatal for the block.
    #[error(transparent)]
    Rerun(#[from] RerunFailure<E>),
}

/// Distinguishes which half of a rerun failed, since the two imply different
/// things to the caller (a VM bug vs. a genuinely irreconcilable conflict).
#[derive(Debug, Error)]
pub enum RerunFailure<E: std::error::Error + 'static> {
    #[error("rerun execute failed")]
    Execute(#[source] E),
    #[error("rerun confirm failed")]
    Confirm(#[source] E),
}
