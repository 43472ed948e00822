//! Two-sided, turn-based battle simulation for offline balance tuning.
//!
//! [battle] holds the engine and everything it resolves: awakening curves, element and
//! intelligence multipliers, combat-check curves, statuses and skills. [data] loads and validates
//! character sheets, [balance] and [parallel] run many seeded battles across cores.

pub mod balance;
pub mod battle;
pub mod cli;
pub mod data;
pub mod parallel;
