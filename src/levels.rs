// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

//! `TxLevel` / `TxLevels` — the immutable, dependency-layered partition of a
//! block's transactions.

use crate::{
    config::SchedulerConfig,
    driver,
    errors::Error,
    task::{Confirm, Execute, TxRequest, TxResult},
};
use std::sync::Arc;

/// An independent set of transactions that may execute concurrently.
/// Invariant (i): no two entries have a dependency edge between them.
/// Invariant (ii): entries are ascending in `tx_index`, which
/// `ConfirmQueue::drain_trusting` relies on.
#[derive(Clone, Debug)]
pub struct TxLevel<R>(Vec<Arc<R>>);

impl<R> TxLevel<R> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, req: Arc<R>) {
        self.0.push(req);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<R>> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Arc<R>] {
        &self.0
    }

    /// Partitions into contiguous sub-slices of size `chunk_size` (the last
    /// may be shorter). Pure; preserves original order within each chunk.
    pub fn split_by(&self, chunk_size: usize) -> Vec<TxLevel<R>> {
        if chunk_size == 0 || self.0.is_empty() {
            return Vec::new();
        }
        self.0
            .chunks(chunk_size)
            .map(|chunk| TxLevel(chunk.to_vec()))
            .collect()
    }

    /// Partitions into at most `chunks` roughly equal contiguous sub-slices,
    /// sized `ceil(len/chunks)`. An empty level yields no chunks; trailing
    /// empty chunks from the `ceil` division are dropped — the `chunks()`
    /// iterator never yields an empty slice, so no extra guard is needed.
    pub fn split(&self, chunks: usize) -> Vec<TxLevel<R>> {
        if chunks == 0 || self.0.is_empty() {
            return Vec::new();
        }
        let chunk_size = self.0.len().div_ceil(chunks);
        self.split_by(chunk_size)
    }
}

impl<R> Default for TxLevel<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<Arc<R>> for TxLevel<R> {
    fn from_iter<I: IntoIterator<Item = Arc<R>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, R> IntoIterator for &'a TxLevel<R> {
    type Item = &'a Arc<R>;
    type IntoIter = std::slice::Iter<'a, Arc<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Ordered sequence of `TxLevel`s. Invariant: for any DAG edge `a -> b`,
/// `level_of(a) < level_of(b)`.
#[derive(Clone, Debug, Default)]
pub struct TxLevels<R>(Vec<TxLevel<R>>);

impl<R> TxLevels<R> {
    pub fn new(levels: Vec<TxLevel<R>>) -> Self {
        Self(levels)
    }

    pub fn levels(&self) -> &[TxLevel<R>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total transaction count across all levels.
    pub fn tx_count(&self) -> usize
    where
        R: TxRequest,
    {
        self.0.iter().map(TxLevel::len).sum()
    }

    /// Convenience wrapper around [`driver::run`], so callers that went
    /// through [`crate::builder::build_levels`] or
    /// [`crate::predictor::predict_tx_dag`] to get a `TxLevels` can drive it
    /// without importing `driver` directly.
    pub fn run<O>(
        &self,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
        config: &SchedulerConfig,
    ) -> Result<(), (Error<O::Error>, u32)>
    where
        R: TxRequest,
        O: TxResult,
        O::Error: Clone + std::error::Error + 'static,
    {
        driver::run(self, execute, confirm, config)
    }

    /// Convenience wrapper around [`driver::run_sequential`].
    pub fn run_sequential<O>(
        &self,
        execute: &impl Execute<R, O>,
        confirm: &mut impl Confirm<O>,
    ) -> Result<(), (Error<O::Error>, u32)>
    where
        R: TxRequest,
        O: TxResult,
        O::Error: Clone + std::error::Error + 'static,
    {
        driver::run_sequential(self, execute, confirm)
    }
}

impl<R> IntoIterator for TxLevels<R> {
    type Item = TxLevel<R>;
    type IntoIter = std::vec::IntoIter<TxLevel<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
