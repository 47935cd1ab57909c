//! Card Ledger CLI
//!
//! Replays ledger operations from a CSV file and prints the resulting
//! accounts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --strategy sync operations.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > accounts.csv
//! cargo run -- --conversion-rate 5 --journal history.csv operations.csv > accounts.csv
//! ```
//!
//! Logs go to stderr; set `CARD_LEDGER_LOG` (e.g. `debug`, `card_ledger=warn`)
//! to change the level.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, output not writable, etc.)

use card_ledger::{cli, strategy, telemetry};
use std::process;
use tracing::error;

fn main() {
    telemetry::init_tracing();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config, args.to_replay_options())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "replay failed");
        process::exit(1);
    }
}
