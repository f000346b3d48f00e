// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The confirm queue: a dense, per-block array of results deposited by the
//! parallel phase and drained sequentially by the driver.

use crate::{
    counters,
    errors::{Error, RerunFailure},
    levels::TxLevel,
    task::{Confirm, Execute, TxRequest, TxResult},
};
use std::sync::Arc;

/// Per-`tx_index` confirmation record. `result` and `confirm_err` begin
/// `None`; `exec_err` is mirrored out of `result` at `collect` time rather
/// than tracked independently, since `TxResult` already carries it — keeping
/// one source of truth for "did execution fail" avoids the two disagreeing.
struct ConfirmSlot<O, E> {
    result: Option<O>,
    exec_err: Option<E>,
    confirm_err: Option<E>,
}

impl<O, E> Default for ConfirmSlot<O, E> {
    fn default() -> Self {
        Self {
            result: None,
            exec_err: None,
            confirm_err: None,
        }
    }
}

/// Dense, index-addressed queue of confirmation records for one block, plus
/// the `highwater` cursor.
pub struct ConfirmQueue<R, O: TxResult> {
    requests: Vec<Arc<R>>,
    slots: Vec<ConfirmSlot<O, O::Error>>,
    highwater: i64,
}

impl<R, O> ConfirmQueue<R, O>
where
    R: TxRequest,
    O: TxResult,
    O::Error: Clone + std::error::Error + 'static,
{
    /// Allocates a queue keyed by `tx_index`, not by the order `requests` is
    /// handed in. The caller (`driver::run`) builds `requests` by flattening
    /// `TxLevels` in level order, which does not generally match ascending
    /// `tx_index` — e.g. an independent transaction can share a level with a
    /// lower-indexed one while a dependent transaction occupies a later
    /// level. Reindexing here, rather than trusting the caller's order,
    /// keeps `rerun`'s `self.requests[i]` lookup (`i` is always a
    /// `tx_index`) pointed at the right transaction.
    ///
    /// Panics if `requests` does not contain every `tx_index` in
    /// `[0, requests.len())` exactly once.
    pub fn new(requests: impl IntoIterator<Item = Arc<R>>) -> Self {
        let mut by_index: Vec<Option<Arc<R>>> = Vec::new();
        for req in requests {
            let idx = req.tx_index() as usize;
            if idx >= by_index.len() {
                by_index.resize_with(idx + 1, || None);
            }
            assert!(
                by_index[idx].is_none(),
                "ConfirmQueue::new: duplicate tx_index {idx}"
            );
            by_index[idx] = Some(req);
        }
        let requests: Vec<Arc<R>> = by_index
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| panic!("ConfirmQueue::new: missing tx_index {idx}"))
            })
            .collect();
        let len = requests.len();
        Self {
            requests,
            slots: (0..len).map(|_| ConfirmSlot::default()).collect(),
            highwater: -1,
        }
    }

    pub fn highwater(&self) -> i64 {
        self.highwater
    }

    /// Exposes the last recorded `confirm_err` for a slot, for diagnostics
    /// and tests. Cleared again on the next `collect` or successful rerun.
    pub fn confirm_err(&self, tx_index: u32) -> Option<&O::Error> {
        self.slots.get(tx_index as usize)?.confirm_err.as_ref()
    }

    /// Called by workers during the parallel phase. Validates the index is
    /// in range rather than silently dropping it, so a misbehaving executor
    /// producing an out-of-range `tx_index` surfaces as an error instead of
    /// a result quietly vanishing.
    pub fn collect(&mut self, result: O) -> Result<(), Error<O::Error>> {
        let tx_index = result.tx_index();
        let slot = self.slots.get_mut(tx_index as usize).ok_or_else(|| {
            Error::IndexOutOfRange {
                tx_index,
                queue_len: self.slots.len(),
            }
        })?;
        slot.exec_err = result.exec_err().cloned();
        slot.confirm_err = None;
        slot.result = Some(result);
        Ok(())
    }

    /// The untrusting drain: walks the full dense array from `highwater + 1`
    /// onward. The only safe choice when the DAG may be wrong, since it
    /// re-verifies strict index order itself rather than trusting the
    /// caller's level ordering.
    pub fn drain_sequential(
        &mut self,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
    ) -> Result<(), (Error<O::Error>, u32)> {
        let start = (self.highwater + 1) as u32;
        let end = self.slots.len() as u32;
        self.drain(start..end, execute, confirm)
    }

    /// The trusting fast path: walks only the indices of `level`, in their
    /// already-ascending order. Valid exactly when the caller asserts the
    /// supplied DAG is accurate, since then
    /// confirmation order among a level's own transactions doesn't matter
    /// for correctness — only that lower-index transactions from earlier
    /// levels have already been confirmed, which the driver's per-level
    /// barrier guarantees.
    pub fn drain_trusting(
        &mut self,
        level: &TxLevel<R>,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
    ) -> Result<(), (Error<O::Error>, u32)> {
        let indices = level.iter().map(|req| req.tx_index()).collect::<Vec<_>>();
        self.drain(indices, execute, confirm)
    }

    fn drain(
        &mut self,
        indices: impl IntoIterator<Item = u32>,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
    ) -> Result<(), (Error<O::Error>, u32)> {
        for tx_index in indices {
            let i = tx_index as usize;
            if self.slots[i].result.is_none() {
                // A lower-index transaction has not yet arrived. Stop; the
                // caller re-enters later once more results land.
                break;
            }

            if self.slots[i].exec_err.is_some() {
                counters::RERUN_COUNT.with_label_values(&["exec_err"]).inc();
                self.rerun(i, execute, confirm)
                    .map_err(|err| (err, tx_index))?;
            } else {
                let outcome = confirm.confirm(self.slots[i].result.as_ref().unwrap());
                match outcome {
                    Ok(()) => {},
                    Err(err) => {
                        counters::RERUN_COUNT.with_label_values(&["confirm_err"]).inc();
                        self.slots[i].confirm_err = Some(err);
                        self.rerun(i, execute, confirm)
                            .map_err(|err| (err, tx_index))?;
                    },
                }
            }

            self.highwater = i as i64;
            counters::HIGHWATER.set(self.highwater);
        }
        Ok(())
    }

    /// Re-executes and re-confirms the transaction at `i` after a conflict.
    /// Resets `exec_err`/`confirm_err` before re-invoking `execute`, so a
    /// successful rerun leaves no trace of the failed attempt. Does not
    /// itself advance `highwater` — the drain loop does that once this
    /// returns successfully.
    fn rerun(
        &mut self,
        i: usize,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
    ) -> Result<(), Error<O::Error>> {
        self.slots[i].exec_err = None;
        self.slots[i].confirm_err = None;

        let new_result = execute.execute(&self.requests[i]);
        if let Some(err) = new_result.exec_err() {
            let err = err.clone();
            self.slots[i].exec_err = Some(err.clone());
            return Err(Error::Rerun(RerunFailure::Execute(err)));
        }

        match confirm.confirm(&new_result) {
            Ok(()) => {
                self.slots[i].result = Some(new_result);
                Ok(())
            },
            Err(err) => {
                self.slots[i].confirm_err = Some(err.clone());
                Err(Error::Rerun(RerunFailure::Confirm(err)))
            },
        }
    }
}
