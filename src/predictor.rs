// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The trivial address-based DAG predictor. A conservative,
//! over-approximating heuristic: it is safe to predict an edge that turns
//! out not to matter (confirm-time conflict detection catches the rest),
//! never safe to miss one.

use crate::{
    dag::{TxDag, TxDep},
    levels::TxLevel,
    task::TxRequest,
};
use std::{collections::HashMap, sync::Arc};

/// Walks a single level in order, writing one `TxDep` per transaction into
/// `dag` based on the last writer to its `from`/`to` addresses.
pub fn predict_tx_dag<R: TxRequest>(level: &TxLevel<R>, dag: &mut dyn TxDag) {
    let mut marked = HashMap::new();
    predict_into(level.iter().map(|r| r.as_ref()), &mut marked, dag);
}

/// Runs the same per-transaction walk across an entire block (not just one
/// already-built level) in `tx_index` order — the shape callers need when
/// they have no precomputed DAG yet and haven't called `build_levels` for
/// the first time, so there is no level to predict over.
pub fn predict_tx_dag_for_block<R: TxRequest>(requests: &[Arc<R>], dag: &mut dyn TxDag) {
    let mut marked = HashMap::new();
    predict_into(requests.iter().map(|r| r.as_ref()), &mut marked, dag);
}

fn predict_into<'a, R, I>(
    requests: I,
    marked: &mut HashMap<crate::address::Address, u32>,
    dag: &mut dyn TxDag,
) where
    R: TxRequest + 'a,
    I: Iterator<Item = &'a R>,
{
    for req in requests {
        let tx_index = req.tx_index();
        let from = req.from();
        let to = req.to();

        let mut pf = marked.get(&from).copied();
        let mut pt = to.and_then(|t| marked.get(&t).copied());

        // Keep the predecessor list ascending so downstream max-predecessor
        // lookups in `build_levels` don't need to sort it themselves.
        if let (Some(a), Some(b)) = (pf, pt) {
            if a > b {
                std::mem::swap(&mut pf, &mut pt);
            }
        }

        let mut preds = Vec::with_capacity(2);
        preds.extend(pf);
        if pt != pf {
            preds.extend(pt);
        }
        dag.set_tx_dep(tx_index, TxDep::new(preds));

        marked.insert(from, tx_index);
        if let Some(to) = to {
            marked.insert(to, tx_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address::Address, dag::BTreeTxDag};

    #[derive(Debug)]
    struct Req {
        idx: u32,
        from: Address,
        to: Option<Address>,
    }

    impl TxRequest for Req {
        fn tx_index(&self) -> u32 {
            self.idx
        }
        fn from(&self) -> Address {
            self.from
        }
        fn to(&self) -> Option<Address> {
            self.to
        }
    }

    fn addr(n: u64) -> Address {
        Address::from_u64(n)
    }

    #[test]
    fn first_touch_of_each_address_has_no_predecessor() {
        let level: TxLevel<Req> = vec![Arc::new(Req {
            idx: 0,
            from: addr(1),
            to: Some(addr(2)),
        })]
        .into_iter()
        .collect();
        let mut dag = BTreeTxDag::new();
        predict_tx_dag(&level, &mut dag);
        assert_eq!(dag.tx_dep(0).unwrap().preds, Vec::<u32>::new());
    }

    #[test]
    fn later_touch_of_same_address_depends_on_last_writer() {
        let level: TxLevel<Req> = vec![
            Arc::new(Req {
                idx: 0,
                from: addr(1),
                to: Some(addr(2)),
            }),
            Arc::new(Req {
                idx: 1,
                from: addr(2),
                to: Some(addr(3)),
            }),
        ]
        .into_iter()
        .collect();
        let mut dag = BTreeTxDag::new();
        predict_tx_dag(&level, &mut dag);
        assert_eq!(dag.tx_dep(1).unwrap().preds, vec![0]);
    }

    #[test]
    fn predecessor_list_stays_ascending() {
        // tx 2 touches addresses last written by tx 5 (from) and tx 1 (to);
        // the predecessor list must come out as [1, 5], not [5, 1].
        let mut dag = BTreeTxDag::new();
        dag.set_tx_dep(0, TxDep::new(vec![]));

        let requests: Vec<Arc<Req>> = vec![
            Arc::new(Req { idx: 1, from: addr(9), to: Some(addr(8)) }),
            Arc::new(Req { idx: 5, from: addr(7), to: Some(addr(9)) }),
            Arc::new(Req { idx: 2, from: addr(7), to: Some(addr(8)) }),
        ];
        let level: TxLevel<Req> = requests.into_iter().collect();
        predict_tx_dag(&level, &mut dag);
        assert_eq!(dag.tx_dep(2).unwrap().preds, vec![1, 5]);
    }

    #[test]
    fn predicting_twice_is_idempotent() {
        let level: TxLevel<Req> = vec![
            Arc::new(Req { idx: 0, from: addr(1), to: Some(addr(2)) }),
            Arc::new(Req { idx: 1, from: addr(2), to: Some(addr(3)) }),
            Arc::new(Req { idx: 2, from: addr(1), to: None }),
        ]
        .into_iter()
        .collect();

        let mut dag_a = BTreeTxDag::new();
        predict_tx_dag(&level, &mut dag_a);
        let mut dag_b = BTreeTxDag::new();
        predict_tx_dag(&level, &mut dag_b);
        predict_tx_dag(&level, &mut dag_b);

        for idx in 0..3 {
            assert_eq!(dag_a.tx_dep(idx), dag_b.tx_dep(idx));
        }
    }
}
