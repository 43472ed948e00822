use std::fmt::Write as _;

use crate::battle::engine::{BattleEngine, BattleOutcome};
use crate::battle::sheet::CharacterSheet;
use crate::battle::trace::TraceMode;
use crate::data::loader::{load_sheet, read_sheet_unchecked};
use crate::data::validate::validate_sheet;
use crate::parallel::{run_balance_batches, WorkerPool};

const BALANCE_BATCHES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Balance,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("balance") => Some(Command::Balance),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Balance) => handle_balance(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: awakening <simulate|balance|validate>");
            2
        }
    }
}

/// Arguments after the command name, without `--flags`.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn load_pair(positional: &[&str], usage: &str) -> Option<(CharacterSheet, CharacterSheet)> {
    let [hero_path, enemy_path, ..] = positional else {
        eprintln!("{usage}");
        return None;
    };
    let hero = match load_sheet(hero_path) {
        Ok(sheet) => sheet,
        Err(err) => {
            eprintln!("failed to load hero sheet: {err}");
            return None;
        }
    };
    let enemy = match load_sheet(enemy_path) {
        Ok(sheet) => sheet,
        Err(err) => {
            eprintln!("failed to load enemy sheet: {err}");
            return None;
        }
    };
    Some((hero, enemy))
}

fn handle_simulate(args: &[String]) -> i32 {
    let positional = positional(args);
    let as_table = args.iter().any(|arg| arg == "--table");
    let Some((hero, enemy)) = load_pair(
        &positional,
        "usage: awakening simulate <hero-sheet> <enemy-sheet> [seed] [--table]",
    ) else {
        return 2;
    };

    let engine = BattleEngine::standard().with_trace_mode(TraceMode::Lines);
    let outcome = match positional.get(2).copied() {
        Some(raw) => engine.run_seeded(&hero, &enemy, parse_u64_arg(Some(raw), "seed", 7)),
        None => engine.run(&hero, &enemy),
    };
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("battle failed: {err}");
            return 1;
        }
    };
    tracing::info!(result = outcome.result.as_str(), turns = outcome.turn_count(), "battle finished");

    if as_table {
        println!("{}", table_header());
        println!("{}", table_row(&outcome));
    } else {
        match serde_json::to_string_pretty(&outcome) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize battle outcome: {err}");
                return 1;
            }
        }
    }

    0
}

fn table_header() -> &'static str {
    "result\tturns\thero_hp\tenemy_hp"
}

fn table_row(outcome: &BattleOutcome) -> String {
    let mut row = String::new();
    let _ = write!(&mut row, "{}\t{}", outcome.result.as_str(), outcome.turn_count());
    match outcome.last_turn() {
        Some(last) => {
            let _ = write!(
                &mut row,
                "\t{}\t{}",
                last.hero_state.remaining_hp(),
                last.enemy_state.remaining_hp()
            );
        }
        None => row.push_str("\t-\t-"),
    }
    row
}

fn handle_balance(args: &[String]) -> i32 {
    let positional = positional(args);
    let Some((hero, enemy)) = load_pair(
        &positional,
        "usage: awakening balance <hero-sheet> <enemy-sheet> [iterations] [seed]",
    ) else {
        return 2;
    };
    let iterations = parse_u32_arg(positional.get(2).copied(), "iterations", 1000);
    let seed = parse_u64_arg(positional.get(3).copied(), "seed", 7);

    let engine = BattleEngine::standard();
    let report = run_balance_batches(
        &engine,
        &hero,
        &enemy,
        iterations as usize,
        seed,
        BALANCE_BATCHES,
        &WorkerPool::default(),
        |_| {},
    );
    match report {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize balance report: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("balance run failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: awakening validate <sheet>");
        return 2;
    };

    let sheet = match read_sheet_unchecked(path) {
        Ok(sheet) => sheet,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let report = validate_sheet(&sheet);
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        for diagnostic in &report.diagnostics {
            eprintln!("- {diagnostic}");
        }
        return 1;
    }

    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    println!("validation passed: {path}");
    0
}

fn parse_u32_arg(raw: Option<&str>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&str>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
