use crate::core::LedgerConfig;
use crate::strategy::{BatchConfig, ReplayOptions};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Replay card ledger operations from a CSV file
#[derive(Parser, Debug)]
#[command(name = "card-ledger")]
#[command(about = "Replay card ledger operations and print the resulting accounts", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operations
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for batched"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads for batch processing (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(
        long = "conversion-rate",
        value_name = "RATE",
        help = "Currency units credited per reward point (default: 10)"
    )]
    pub conversion_rate: Option<Decimal>,

    #[arg(
        long = "max-commit-attempts",
        value_name = "COUNT",
        help = "Commit attempts before a conflicting write is given up (default: 5)"
    )]
    pub max_commit_attempts: Option<u32>,

    /// Write every account's history to this CSV file
    #[arg(long = "journal", value_name = "PATH")]
    pub journal: Option<PathBuf>,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments, falling back to defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments, falling back to defaults
    pub fn to_ledger_config(&self) -> LedgerConfig {
        if self.conversion_rate.is_some() || self.max_commit_attempts.is_some() {
            let default = LedgerConfig::default();
            LedgerConfig::new(
                self.conversion_rate.unwrap_or(default.conversion_rate),
                self.max_commit_attempts
                    .unwrap_or(default.max_commit_attempts),
            )
        } else {
            LedgerConfig::default()
        }
    }

    pub fn to_replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            ledger: self.to_ledger_config(),
            journal_path: self.journal.clone(),
        }
    }
}
