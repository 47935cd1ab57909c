//! Asynchronous batch processing strategy
//!
//! Replays operations in batches on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (component partitioning + tasks)
//!         └── Arc<Ledger> (thread-safe ledger)
//! ```
//!
//! Batches are processed one after another, so an account whose operations
//! span several batches still sees them in file order. Within a batch,
//! operations that share no account or card run concurrently.

use crate::core::{BatchProcessor, Ledger};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{write_outputs, ProcessingStrategy, ReplayOptions, ReplayStats};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads for the runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                default = default.batch_size,
                "invalid batch_size (0), using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                default = default.max_concurrent_batches,
                "invalid max_concurrent_batches (0), using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    options: ReplayOptions,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, options: ReplayOptions) -> Self {
        Self { config, options }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = Arc::new(Ledger::new(self.options.ledger.clone()));
            let processor = BatchProcessor::new(Arc::clone(&ledger));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut stats = ReplayStats::default();
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Wait for the whole batch before reading the next one
                for result in processor.process_batch(batch).await {
                    match result.result {
                        Ok(()) => stats.applied += 1,
                        Err(e) => {
                            stats.rejected += 1;
                            warn!(
                                operation = result.operation.name(),
                                user = %result.operation.user(),
                                error = %e,
                                "operation rejected"
                            );
                        }
                    }
                }
            }

            stats.log();
            write_outputs(&ledger, &self.options, output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SyncProcessingStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn replay(strategy: &dyn ProcessingStrategy, file: &NamedTempFile) -> String {
        let mut output = Vec::new();
        strategy.process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), ReplayOptions::default());
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_async_strategy_maintains_ordering_across_batches() {
        let file = create_temp_csv(
            "op,user,target,amount\n\
             deposit,alice,,100\n\
             deposit,bob,,50\n\
             withdraw,alice,,30\n\
             deposit,bob,,25\n\
             withdraw,alice,,20\n\
             withdraw,alice,,60\n",
        );

        // Small batches force the account's operations across batches
        let strategy =
            AsyncProcessingStrategy::new(BatchConfig::new(2, 4), ReplayOptions::default());

        assert_eq!(
            replay(&strategy, &file),
            "user,balance,reward_points,spent_points\n\
             alice,50.00,0.00,0.00\n\
             bob,75.00,0.00,0.00\n"
        );
    }

    #[test]
    fn test_async_strategy_matches_sync_output() {
        let mut content = String::from("op,user,target,amount\n");
        for i in 0..20 {
            content.push_str(&format!("deposit,user{},,100\n", i));
            content.push_str(&format!("register,user{},{:010},\n", i, 1_000_000 + i));
        }
        for i in 0..20 {
            let target = 1_000_000 + (i + 1) % 20;
            content.push_str(&format!("transfer,user{},{:010},{}\n", i, target, 10 + i));
            content.push_str(&format!("accrue,user{},,{}\n", i, i + 1));
            content.push_str(&format!("convert,user{},,1\n", i));
        }
        let file = create_temp_csv(&content);

        let sync = replay(&SyncProcessingStrategy::default(), &file);
        let batched = replay(
            &AsyncProcessingStrategy::new(BatchConfig::new(7, 4), ReplayOptions::default()),
            &file,
        );

        assert_eq!(sync, batched);
    }
}
