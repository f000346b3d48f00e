// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for the two hot paths in this crate: partitioning a block into
//! levels (`build_levels`) and driving those levels to completion
//! (`driver::run`) against a cheap no-op `execute`/`confirm` pair, so the
//! numbers reflect scheduling overhead rather than VM cost.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use parallel_tx_scheduler::{
    build_levels, Address, BTreeTxDag, Confirm, Execute, SchedulerConfig, TxDag, TxDep, TxRequest,
    TxResult,
};
use std::sync::Arc;

#[derive(Debug)]
struct Req {
    idx: u32,
    from: Address,
}

impl TxRequest for Req {
    fn tx_index(&self) -> u32 {
        self.idx
    }
    fn from(&self) -> Address {
        self.from
    }
    fn to(&self) -> Option<Address> {
        None
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("conflict")]
struct Conflict;

struct Res(u32);
impl TxResult for Res {
    type Error = Conflict;
    fn tx_index(&self) -> u32 {
        self.0
    }
    fn exec_err(&self) -> Option<&Conflict> {
        None
    }
}

struct NoopExecutor;
impl Execute<Req, Res> for NoopExecutor {
    fn execute(&self, req: &Req) -> Res {
        Res(req.idx)
    }
}

struct NoopConfirmer;
impl Confirm<Res> for NoopConfirmer {
    fn confirm(&mut self, _result: &Res) -> Result<(), Conflict> {
        Ok(())
    }
}

/// `n` requests with independent addresses, chained into a diamond-ish DAG
/// where each transaction depends on its immediate predecessor only — the
/// shape that forces `build_levels` to walk its full predecessor-lookup
/// path rather than short-circuit on an absent DAG.
fn chained_block(n: u32) -> (Vec<Arc<Req>>, BTreeTxDag) {
    let requests: Vec<Arc<Req>> = (0..n)
        .map(|idx| {
            Arc::new(Req {
                idx,
                from: Address::from([0u8; 20]),
            })
        })
        .collect();
    let mut dag = BTreeTxDag::new();
    for idx in 0..n {
        let preds = if idx == 0 { vec![] } else { vec![idx - 1] };
        dag.set_tx_dep(idx, TxDep::new(preds));
    }
    (requests, dag)
}

/// `n` fully independent requests (distinct addresses, no DAG) — the shape
/// that produces one maximal level and exercises the worker-pool fan-out in
/// `driver::run` at full width.
fn independent_block(n: u32) -> Vec<Arc<Req>> {
    (0..n)
        .map(|idx| {
            let mut bytes = [0u8; 20];
            bytes[12..20].copy_from_slice(&(idx as u64).to_be_bytes());
            Arc::new(Req {
                idx,
                from: Address::from(bytes),
            })
        })
        .collect()
}

fn bench_build_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_levels");
    for size in [10u32, 100, 1_000, 10_000] {
        let (requests, dag) = chained_block(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| build_levels(&requests, Some(&dag as &dyn TxDag)));
        });
    }
    group.finish();
}

fn bench_run_single_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_run/single_level");
    for size in [10u32, 100, 1_000] {
        let requests = independent_block(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let levels = build_levels(&requests, None);
                let executor = NoopExecutor;
                let mut confirmer = NoopConfirmer;
                let config = SchedulerConfig::default();
                levels.run(&executor, &mut confirmer, &config).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_run_chained(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_run/chained");
    for size in [10u32, 100, 1_000] {
        let (requests, dag) = chained_block(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let levels = build_levels(&requests, Some(&dag as &dyn TxDag));
                let executor = NoopExecutor;
                let mut confirmer = NoopConfirmer;
                let config = SchedulerConfig::default();
                levels.run(&executor, &mut confirmer, &config).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_levels,
    bench_run_single_level,
    bench_run_chained
);
criterion_main!(benches);
