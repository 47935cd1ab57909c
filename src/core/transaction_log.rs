//! Append-only transaction history
//!
//! This module provides `MemoryTransactionLog`, the default
//! [`TransactionLog`] backend, and `TransactionHistory`, the sequence handed
//! back to display code.
//!
//! # Purpose
//!
//! The log is the audit trail of every balance-affecting operation. It is
//! never consulted when enforcing balance invariants; it only answers
//! "what happened to this account", newest first.

use crate::core::traits::TransactionLog;
use crate::types::{StoreError, TransactionRecord, UserId};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Thread-safe in-memory transaction log
#[derive(Debug, Default)]
pub struct MemoryTransactionLog {
    /// Records per subject, tagged with a global insertion sequence
    by_user: DashMap<UserId, Vec<(u64, TransactionRecord)>>,

    /// Ids already appended
    seen: DashSet<Uuid>,

    sequence: AtomicU64,
}

impl MemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all users
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl TransactionLog for MemoryTransactionLog {
    fn append(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        if !self.seen.insert(record.id) {
            return Ok(());
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.by_user
            .entry(record.subject.clone())
            .or_default()
            .push((sequence, record.clone()));
        Ok(())
    }

    fn query_by_user(&self, user: &UserId) -> Result<TransactionHistory, StoreError> {
        let mut records = self
            .by_user
            .get(user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        // Newest first; equal timestamps fall back to latest insertion first
        records.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });

        Ok(TransactionHistory::new(
            records.into_iter().map(|(_, record)| record).collect(),
        ))
    }
}

/// Ordered, finite, restartable view of one account's history
///
/// Holds a snapshot taken at query time; records appended later are not
/// seen. Cloning is cheap and yields an independent cursor.
#[derive(Debug, Clone)]
pub struct TransactionHistory {
    records: Arc<[TransactionRecord]>,
    position: usize,
}

impl TransactionHistory {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records: records.into(),
            position: 0,
        }
    }

    /// Rewind to the newest record
    pub fn restart(&mut self) {
        self.position = 0;
    }

    /// Records not yet yielded, without consuming them
    pub fn remaining(&self) -> &[TransactionRecord] {
        &self.records[self.position..]
    }
}

impl Iterator for TransactionHistory {
    type Item = TransactionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.get(self.position)?.clone();
        self.position += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransactionHistory {}
