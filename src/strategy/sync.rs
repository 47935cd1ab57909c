//! Synchronous processing strategy
//!
//! A single-threaded replay: `SyncReader` streams operations one at a time,
//! each is applied to the ledger in file order, and the final account
//! states are written with `csv_format::write_accounts_csv`.

use crate::core::Ledger;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{write_outputs, ProcessingStrategy, ReplayOptions, ReplayStats};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use card_ledger::strategy::{ProcessingStrategy, ReplayOptions, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ReplayOptions::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    options: ReplayOptions,
}

impl SyncProcessingStrategy {
    pub fn new(options: ReplayOptions) -> Self {
        Self { options }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let ledger = Ledger::new(self.options.ledger.clone());
        let reader = SyncReader::new(input_path)?;
        let mut stats = ReplayStats::default();

        for result in reader {
            match result {
                Ok(operation) => match ledger.execute(&operation) {
                    Ok(()) => stats.applied += 1,
                    Err(e) => {
                        stats.rejected += 1;
                        warn!(
                            operation = operation.name(),
                            user = %operation.user(),
                            error = %e,
                            "operation rejected"
                        );
                    }
                },
                Err(e) => {
                    stats.malformed += 1;
                    warn!(error = %e, "skipping invalid record");
                }
            }
        }

        stats.log();
        write_outputs(&ledger, &self.options, output)
    }
}
