//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays every operation through the ledger
//! 3. Generates the accounts CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Card-addressed transfers and their rejections
//! - Reward point accrual and conversion
//! - Card registration rules (uniqueness, refresh, replacement, self-transfer)
//! - Malformed rows and rejected operations
//! - Transfers that chain across several users
//!
//! Each test is run twice: once with the sync strategy and once with the async strategy.

#[cfg(test)]
mod tests {
    use card_ledger::cli::StrategyType;
    use card_ledger::strategy::{create_strategy, BatchConfig, ReplayOptions};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, batch_size: usize) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        let strategy = create_strategy(
            strategy_type.clone(),
            Some(BatchConfig::new(batch_size, 4)),
            ReplayOptions::default(),
        );

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");
        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?}, batch size: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, batch_size, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("card_transfer")]
    #[case("point_conversion")]
    #[case("registration_rules")]
    #[case("malformed_data")]
    #[case("transfer_chain")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
        #[values(1, 3, 1000)] batch_size: usize,
    ) {
        run_test_fixture(fixture, strategy, batch_size);
    }

    #[rstest]
    fn test_journal_output(#[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType) {
        let journal = NamedTempFile::new().expect("Failed to create temp file");
        let options = ReplayOptions {
            journal_path: Some(journal.path().to_path_buf()),
            ..ReplayOptions::default()
        };
        let strategy = create_strategy(strategy, None, options);

        let mut output = Vec::new();
        strategy
            .process(Path::new("tests/fixtures/card_transfer/input.csv"), &mut output)
            .unwrap();

        let history = fs::read_to_string(journal.path()).unwrap();
        let rows: Vec<Vec<&str>> = history
            .lines()
            .skip(1)
            .map(|line| line.splitn(5, ',').take(4).collect())
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["alice", "send", "bob", "400.00"],
                vec!["alice", "deposit", "", "1000.00"],
                vec!["bob", "receive", "alice", "400.00"],
            ]
        );
    }
}
