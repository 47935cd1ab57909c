//! Batch processing with account-based partitioning for replayed operations
//!
//! This module provides the `BatchProcessor` struct, which runs a batch of
//! operations concurrently while keeping every account's operations in
//! input order.
//!
//! # Design
//!
//! A transfer touches two accounts and a card, so partitioning by a single
//! user is not enough. Each operation is mapped to the set of keys it can
//! touch (`user:` keys for accounts, `card:` keys for card numbers) and the
//! batch is split into connected components of operations that share a key.
//! Components run concurrently; operations within a component run in the
//! order they were read.
//!
//! Card numbers are resolved against the registry as it stands before the
//! batch. Any registration inside the batch that could change a resolution
//! shares the card key with the operations that depend on it, so it lands
//! in the same component.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<Ledger>  (shared, thread-safe ledger)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ledger::Ledger;
use crate::types::{InstrumentId, LedgerError, Operation};
use tracing::error;

/// Result of executing a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was executed
    pub operation: Operation,

    /// The outcome (success or error)
    pub result: Result<(), LedgerError>,
}

/// Batch processor with account-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    ledger: Arc<Ledger>,
}

impl BatchProcessor {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Keys of every account and card `operation` may read or write
    fn keys(&self, operation: &Operation) -> Vec<String> {
        let registry = self.ledger.registry();
        let mut keys = vec![format!("user:{}", operation.user())];

        if let Some(raw) = operation.instrument() {
            keys.push(format!("card:{}", raw));
            if let Some(resolution) = InstrumentId::parse(raw)
                .ok()
                .and_then(|id| registry.lookup(&id))
            {
                keys.push(format!("user:{}", resolution.user));
            }
        }

        // Re-registration drops the user's previous card
        if let Operation::Register { user, .. } = operation {
            if let Some(current) = registry.instrument_of(user) {
                keys.push(format!("card:{}", current));
            }
        }

        keys
    }

    /// Split a batch into groups that share no account or card
    ///
    /// # Guarantees
    ///
    /// - Each operation appears in exactly one group
    /// - Operations in a group keep their original relative order
    /// - Two operations that may touch the same account or card are in the same group
    /// - Groups are returned in order of their first operation
    pub fn partition_by_accounts(&self, batch: Vec<Operation>) -> Vec<Vec<Operation>> {
        let mut sets = DisjointSets::default();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut anchors = Vec::with_capacity(batch.len());

        for operation in &batch {
            let nodes: Vec<usize> = self
                .keys(operation)
                .into_iter()
                .map(|key| *index.entry(key).or_insert_with(|| sets.add()))
                .collect();
            for node in &nodes[1..] {
                sets.union(nodes[0], *node);
            }
            anchors.push(nodes[0]);
        }

        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<Operation>> = Vec::new();
        for (operation, anchor) in batch.into_iter().zip(anchors) {
            let root = sets.find(anchor);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(operation);
        }

        groups
    }

    /// Execute one group sequentially in order
    ///
    /// All operations run, even if some fail; results keep the input order.
    pub async fn process_group(&self, operations: Vec<Operation>) -> Vec<ProcessingResult> {
        operations
            .into_iter()
            .map(|operation| {
                let result = self.ledger.execute(&operation);
                ProcessingResult { operation, result }
            })
            .collect()
    }

    /// Execute a batch with independent groups running concurrently
    ///
    /// Results may be in a different order than the input.
    pub async fn process_batch(&self, batch: Vec<Operation>) -> Vec<ProcessingResult> {
        let groups = self.partition_by_accounts(batch);

        let mut tasks = Vec::with_capacity(groups.len());
        for group in groups {
            let processor = self.clone();
            tasks.push(tokio::spawn(
                async move { processor.process_group(group).await },
            ));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(group_results) => results.extend(group_results),
                Err(e) => error!(error = %e, "replay task failed"),
            }
        }

        results
    }
}

/// Union-find over dense indices
#[derive(Debug, Default)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn add(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.parent.len() - 1
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            self.parent[root_b] = root_a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LedgerConfig;
    use crate::types::UserId;
    use rust_decimal::Decimal;

    fn processor() -> (BatchProcessor, Arc<Ledger>) {
        let ledger = Arc::new(Ledger::new(LedgerConfig::default()));
        (BatchProcessor::new(Arc::clone(&ledger)), ledger)
    }

    fn deposit(user: &str, amount: i64) -> Operation {
        Operation::Deposit {
            user: UserId::from(user),
            amount: Decimal::new(amount, 0),
        }
    }

    fn register(user: &str, card: &str) -> Operation {
        Operation::Register {
            user: UserId::from(user),
            instrument: card.to_string(),
        }
    }

    fn transfer(user: &str, card: &str, amount: i64) -> Operation {
        Operation::Transfer {
            user: UserId::from(user),
            instrument: card.to_string(),
            amount: Decimal::new(amount, 0),
        }
    }

    #[test]
    fn test_disjoint_sets() {
        let mut sets = DisjointSets::default();
        let (a, b, c, d) = (sets.add(), sets.add(), sets.add(), sets.add());

        sets.union(a, b);
        sets.union(c, d);
        assert_eq!(sets.find(a), sets.find(b));
        assert_ne!(sets.find(a), sets.find(c));

        sets.union(b, d);
        assert_eq!(sets.find(a), sets.find(c));
    }

    #[test]
    fn test_partition_empty_batch() {
        let (processor, _) = processor();
        assert!(processor.partition_by_accounts(vec![]).is_empty());
    }

    #[test]
    fn test_partition_separates_unrelated_users() {
        let (processor, _) = processor();

        let groups = processor.partition_by_accounts(vec![
            deposit("alice", 1),
            deposit("bob", 2),
            deposit("alice", 3),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![deposit("alice", 1), deposit("alice", 3)]);
        assert_eq!(groups[1], vec![deposit("bob", 2)]);
    }

    #[test]
    fn test_partition_links_transfer_to_card_registered_in_batch() {
        let (processor, _) = processor();

        let groups = processor.partition_by_accounts(vec![
            deposit("alice", 100),
            register("bob", "2222222222"),
            transfer("alice", "2222222222", 40),
            deposit("carol", 5),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1], vec![deposit("carol", 5)]);
    }

    #[test]
    fn test_partition_links_transfer_to_existing_card_owner() {
        let (processor, ledger) = processor();
        ledger
            .register_instrument(&UserId::from("bob"), "2222222222")
            .unwrap();

        let groups = processor.partition_by_accounts(vec![
            transfer("alice", "2222222222", 40),
            deposit("bob", 1),
        ]);

        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_partition_links_reregistration_to_old_card() {
        let (processor, ledger) = processor();
        ledger
            .register_instrument(&UserId::from("bob"), "1111111111")
            .unwrap();

        let groups = processor.partition_by_accounts(vec![
            transfer("alice", "1111111111", 1),
            register("bob", "2222222222"),
            transfer("carol", "1111111111", 1),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[tokio::test]
    async fn test_process_group_keeps_order() {
        let (processor, ledger) = processor();

        let results = processor
            .process_group(vec![
                deposit("alice", 100),
                register("bob", "2222222222"),
                transfer("alice", "2222222222", 150),
                transfer("alice", "2222222222", 60),
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert!(results[0].result.is_ok());
        assert!(results[1].result.is_ok());
        assert!(matches!(
            results[2].result,
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert!(results[3].result.is_ok());

        let bob = ledger.balance(&UserId::from("bob")).unwrap();
        assert_eq!(bob.balance, Decimal::new(60, 0));
    }

    #[tokio::test]
    async fn test_process_batch_runs_every_operation() {
        let (processor, ledger) = processor();

        let batch: Vec<Operation> = (0..50)
            .map(|i| deposit(&format!("user{}", i % 5), 10))
            .collect();
        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|r| r.result.is_ok()));
        for i in 0..5 {
            let balance = ledger.balance(&UserId::from(format!("user{}", i))).unwrap();
            assert_eq!(balance.balance, Decimal::new(100, 0));
        }
    }
}
