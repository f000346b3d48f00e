// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The level builder: a single pass over a block's requests that partitions
//! them into dependency levels.

use crate::{
    counters,
    dag::{TxDag, TxDepFlag},
    levels::{TxLevel, TxLevels},
    task::TxRequest,
};
use std::{collections::HashMap, sync::Arc};

/// Builds the layered partition for `requests` given an optional `dag`.
///
/// Priority order of the special cases:
/// 1. empty `requests` -> empty levels;
/// 2. no `dag` -> one level with everything, in order;
/// 3. per request, `Excluded`/`NonDependentRelative` get a level to
///    themselves and push `current` past it; an empty-or-absent `TxDep`
///    joins the open level; a `TxDep` with predecessors lands one level
///    past the latest known predecessor, or on the open level if none of
///    its predecessors have been placed yet (broken-DAG tolerance).
pub fn build_levels<R: TxRequest>(
    requests: &[Arc<R>],
    dag: Option<&dyn TxDag>,
) -> TxLevels<R> {
    if requests.is_empty() {
        return TxLevels::new(Vec::new());
    }

    let Some(dag) = dag else {
        let level: TxLevel<R> = requests.iter().cloned().collect();
        counters::LEVEL_SIZE.observe(level.len() as f64);
        counters::LEVELS_PER_BLOCK.observe(1.0);
        return TxLevels::new(vec![level]);
    };

    let mut levels: Vec<TxLevel<R>> = Vec::new();
    let mut current: usize = 0;
    let mut marked: HashMap<u32, usize> = HashMap::with_capacity(requests.len());

    for req in requests {
        let tx_index = req.tx_index();
        let dep = dag.tx_dep(tx_index);

        let is_alone = dep.is_some_and(|d| {
            d.check_flag(TxDepFlag::Excluded) || d.check_flag(TxDepFlag::NonDependentRelative)
        });

        if is_alone {
            let mut level = TxLevel::new();
            level.push(Arc::clone(req));
            levels.push(level);
            marked.insert(tx_index, levels.len() - 1);
            // Past the new level: the next independent transaction opens a
            // fresh level below it rather than sharing this one.
            current = levels.len();
            continue;
        }

        let preds = dep.map(|d| d.preds.as_slice()).unwrap_or(&[]);
        let target = if preds.is_empty() {
            current
        } else {
            match preds.iter().filter_map(|p| marked.get(p).copied()).max() {
                Some(prev) => prev + 1,
                None => {
                    // Broken DAG: none of the declared predecessors has been
                    // placed. Tolerated silently; placed on the current open
                    // level.
                    counters::BROKEN_DAG_FALLBACK.inc();
                    tracing::debug!(
                        tx_index,
                        "build_levels: all predecessors unknown, falling back to current level"
                    );
                    current
                },
            }
        };

        if target >= levels.len() {
            levels.resize_with(target + 1, TxLevel::new);
        }
        levels[target].push(Arc::clone(req));
        marked.insert(tx_index, target);
    }

    for level in &levels {
        counters::LEVEL_SIZE.observe(level.len() as f64);
    }
    counters::LEVELS_PER_BLOCK.observe(levels.len() as f64);

    TxLevels::new(levels)
}
