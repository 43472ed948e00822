//! Batch distribution for balance runs.
//!
//! A long balance run is split into batches so progress can be reported between them. Battle
//! seeds depend only on the battle index, so batching never changes the merged report.

use thiserror::Error;

use crate::balance::monte_carlo::{run_balance_range, BalanceReport};
use crate::battle::engine::BattleEngine;
use crate::battle::error::BattleError;
use crate::battle::sheet::CharacterSheet;
use crate::parallel::pool::WorkerPool;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Battle(#[from] BattleError),
    #[error("unable to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use awakening::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Run a balance analysis in `num_batches` parallel batches on `pool`, calling `on_batch` with
/// the running report after each one.
#[allow(clippy::too_many_arguments)]
pub fn run_balance_batches<F>(
    engine: &BattleEngine,
    hero: &CharacterSheet,
    enemy: &CharacterSheet,
    iterations: usize,
    seed: u64,
    num_batches: usize,
    pool: &WorkerPool,
    mut on_batch: F,
) -> Result<BalanceReport, BatchError>
where
    F: FnMut(&BalanceReport) + Send,
{
    let report = pool.install(|| -> Result<BalanceReport, BattleError> {
        let mut report = BalanceReport::default();
        for (start, end) in batch_ranges(iterations, num_batches) {
            let batch = run_balance_range(engine, hero, enemy, start..end, seed, true)?;
            report = report.merge(batch);
            tracing::info!(
                done = report.iterations,
                total = iterations,
                win_rate = report.win_rate,
                "balance batch finished"
            );
            on_batch(&report);
        }
        Ok(report)
    })??;
    Ok(report)
}
