use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::battle::engine::{BattleEngine, BattleResult};
use crate::battle::error::Result;
use crate::battle::sheet::CharacterSheet;

/// Aggregate of many seeded battles between the same two sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub iterations: usize,
    pub victories: usize,
    pub losses: usize,
    pub mutual_strikes: usize,
    pub draws: usize,
    pub win_rate: f64,
    pub average_turns: f64,
    /// Battles per final turn number.
    pub turn_histogram: BTreeMap<u32, usize>,
}

impl BalanceReport {
    pub fn record(&mut self, result: BattleResult, turns: u32) {
        self.iterations += 1;
        match result {
            BattleResult::Victory => self.victories += 1,
            BattleResult::Lose => self.losses += 1,
            BattleResult::MutualStrike => self.mutual_strikes += 1,
            BattleResult::Draw => self.draws += 1,
        }
        *self.turn_histogram.entry(turns).or_insert(0) += 1;
        self.refresh_rates();
    }

    /// Combine two partial reports. Counts add; rates are recomputed from the totals.
    pub fn merge(mut self, other: BalanceReport) -> BalanceReport {
        self.iterations += other.iterations;
        self.victories += other.victories;
        self.losses += other.losses;
        self.mutual_strikes += other.mutual_strikes;
        self.draws += other.draws;
        for (turns, count) in other.turn_histogram {
            *self.turn_histogram.entry(turns).or_insert(0) += count;
        }
        self.refresh_rates();
        self
    }

    fn refresh_rates(&mut self) {
        if self.iterations == 0 {
            self.win_rate = 0.0;
            self.average_turns = 0.0;
            return;
        }
        let total_turns: u64 = self
            .turn_histogram
            .iter()
            .map(|(turns, count)| u64::from(*turns) * *count as u64)
            .sum();
        self.win_rate = self.victories as f64 / self.iterations as f64;
        self.average_turns = total_turns as f64 / self.iterations as f64;
    }
}

/// Run `iterations` battles across all cores. Battle `i` is seeded with `seed + i` (wrapping),
/// so the report matches [run_balance_sequential] exactly.
pub fn run_balance(
    engine: &BattleEngine,
    hero: &CharacterSheet,
    enemy: &CharacterSheet,
    iterations: usize,
    seed: u64,
) -> Result<BalanceReport> {
    run_balance_range(engine, hero, enemy, 0..iterations, seed, true)
}

pub fn run_balance_sequential(
    engine: &BattleEngine,
    hero: &CharacterSheet,
    enemy: &CharacterSheet,
    iterations: usize,
    seed: u64,
) -> Result<BalanceReport> {
    run_balance_range(engine, hero, enemy, 0..iterations, seed, false)
}

/// Run the battles with indices in `range`. Used to split one balance run into batches.
pub fn run_balance_range(
    engine: &BattleEngine,
    hero: &CharacterSheet,
    enemy: &CharacterSheet,
    range: std::ops::Range<usize>,
    seed: u64,
    parallel: bool,
) -> Result<BalanceReport> {
    let run_one = |index: usize| {
        engine
            .run_seeded(hero, enemy, seed.wrapping_add(index as u64))
            .map(|outcome| (outcome.result, outcome.turn_count()))
    };

    let samples: Vec<(BattleResult, u32)> = if parallel {
        range.into_par_iter().map(run_one).collect::<Result<_>>()?
    } else {
        range.map(run_one).collect::<Result<_>>()?
    };

    let mut report = BalanceReport::default();
    for (result, turns) in samples {
        report.record(result, turns);
    }
    Ok(report)
}
