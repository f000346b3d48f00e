// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! `TxDAG` / `TxDep` — the dependency graph the level builder and the
//! predictor read and write.

use std::collections::BTreeMap;

/// Flags a transaction's `TxDep` may carry. Both flags get identical
/// scheduling treatment ("alone on a level"); they are kept as distinct
/// variants rather than collapsed into one because callers may want to
/// distinguish them in their own DAG-construction logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxDepFlag {
    /// Must execute and confirm entirely alone on its level.
    Excluded,
    /// Same scheduling treatment as `Excluded`; a distinct source reason.
    NonDependentRelative,
}

/// Per-transaction dependency record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxDep {
    /// Predecessor `tx_index` values this transaction must follow. Empty
    /// means "independent of everything seen so far" when `flag` is `None`.
    pub preds: Vec<u32>,
    pub flag: Option<TxDepFlag>,
}

impl TxDep {
    pub fn new(preds: Vec<u32>) -> Self {
        Self { preds, flag: None }
    }

    pub fn with_flag(flag: TxDepFlag) -> Self {
        Self {
            preds: Vec::new(),
            flag: Some(flag),
        }
    }

    pub fn check_flag(&self, flag: TxDepFlag) -> bool {
        self.flag == Some(flag)
    }
}

/// A mapping `txIndex -> TxDep`, read by the level builder and written by the
/// predictor. The scheduler never mutates a DAG except through
/// `predict_tx_dag`.
pub trait TxDag: Send + Sync {
    fn tx_dep(&self, tx_index: u32) -> Option<&TxDep>;
    fn set_tx_dep(&mut self, tx_index: u32, dep: TxDep);
}

/// The concrete `TxDAG` implementation this crate ships. A `BTreeMap` keeps
/// iteration (used only by tests and debug formatting) in `tx_index` order
/// for free; lookups are the hot path and a `BTreeMap` is plenty fast for
/// the block-sized (low thousands of entries) maps this crate deals with.
#[derive(Clone, Debug, Default)]
pub struct BTreeTxDag(BTreeMap<u32, TxDep>);

impl BTreeTxDag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<(u32, TxDep)> for BTreeTxDag {
    fn from_iter<I: IntoIterator<Item = (u32, TxDep)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TxDag for BTreeTxDag {
    fn tx_dep(&self, tx_index: u32) -> Option<&TxDep> {
        self.0.get(&tx_index)
    }

    fn set_tx_dep(&mut self, tx_index: u32, dep: TxDep) {
        self.0.insert(tx_index, dep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_flag_matches_only_its_own_variant() {
        let dep = TxDep::with_flag(TxDepFlag::Excluded);
        assert!(dep.check_flag(TxDepFlag::Excluded));
        assert!(!dep.check_flag(TxDepFlag::NonDependentRelative));
    }

    #[test]
    fn btree_dag_round_trips_writes() {
        let mut dag = BTreeTxDag::new();
        assert!(dag.tx_dep(0).is_none());
        dag.set_tx_dep(0, TxDep::new(vec![]));
        dag.set_tx_dep(1, TxDep::new(vec![0]));
        assert_eq!(dag.tx_dep(1).unwrap().preds, vec![0]);
        assert!(dag.tx_dep(2).is_none());
    }
}
