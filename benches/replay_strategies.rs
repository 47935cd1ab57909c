//! Benchmark suite for comparing replay strategies
//!
//! ```bash
//! cargo bench
//! ```
//!
//! # Benchmark Fixtures
//!
//! - `benchmark_small.csv` - 100 operations over 10 users
//! - `benchmark_medium.csv` - 1,000 operations over 100 users
//! - `benchmark_large.csv` - 20,000 operations over 1,000 users
//!
//! Each fixture mixes deposits, card registrations, transfers, point
//! accrual, conversions and withdrawals.

use card_ledger::cli::StrategyType;
use card_ledger::strategy::{create_strategy, BatchConfig, ReplayOptions};
use std::path::Path;

fn main() {
    divan::main();
}

fn replay(strategy_type: StrategyType, fixture: &str) {
    let config = match strategy_type {
        StrategyType::Sync => None,
        StrategyType::Async => Some(BatchConfig::default()),
    };
    let strategy = create_strategy(strategy_type, config, ReplayOptions::default());
    let path = Path::new("benches/fixtures").join(fixture);
    let mut output = Vec::new();

    strategy
        .process(&path, &mut output)
        .expect("Replay failed");
}

#[divan::bench]
fn sync_strategy_small() {
    replay(StrategyType::Sync, "benchmark_small.csv");
}

#[divan::bench]
fn async_strategy_small() {
    replay(StrategyType::Async, "benchmark_small.csv");
}

#[divan::bench]
fn sync_strategy_medium() {
    replay(StrategyType::Sync, "benchmark_medium.csv");
}

#[divan::bench]
fn async_strategy_medium() {
    replay(StrategyType::Async, "benchmark_medium.csv");
}

#[divan::bench]
fn sync_strategy_large() {
    replay(StrategyType::Sync, "benchmark_large.csv");
}

#[divan::bench]
fn async_strategy_large() {
    replay(StrategyType::Async, "benchmark_large.csv");
}
