//! Post-commit history writing with reconciliation
//!
//! Balance changes commit first; their history records are appended
//! afterwards. When an append fails the money has already moved, so the
//! failure is downgraded to [`LogStatus::Deferred`] and the records are
//! parked here until [`Journal::reconcile`] gets them into the log.

use crate::core::traits::TransactionLog;
use crate::types::{LogStatus, TransactionRecord};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct Journal {
    log: Arc<dyn TransactionLog>,

    /// Records of committed operations not yet in the log
    pending: Mutex<Vec<TransactionRecord>>,
}

impl Journal {
    pub fn new(log: Arc<dyn TransactionLog>) -> Self {
        Self {
            log,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn log(&self) -> &Arc<dyn TransactionLog> {
        &self.log
    }

    /// Append the records of one committed operation
    ///
    /// Every record is attempted even if an earlier one fails; the failed
    /// ones are queued for reconciliation.
    pub fn record(&self, records: &[TransactionRecord]) -> LogStatus {
        let mut failures = Vec::new();
        let mut reason = None;

        for record in records {
            if let Err(e) = self.log.append(record) {
                warn!(
                    record = %record.id,
                    subject = %record.subject,
                    kind = %record.kind(),
                    error = %e,
                    "history append failed after commit; queued for reconciliation"
                );
                if reason.is_none() {
                    reason = Some(e.to_string());
                }
                failures.push(record.clone());
            }
        }

        match reason {
            None => LogStatus::Recorded,
            Some(reason) => {
                self.lock_pending().extend(failures);
                LogStatus::Deferred { reason }
            }
        }
    }

    /// Retry every queued record
    ///
    /// Returns how many are still pending afterwards. Appends are
    /// idempotent, so a record that landed despite a reported failure is
    /// not duplicated.
    pub fn reconcile(&self) -> usize {
        let queued = std::mem::take(&mut *self.lock_pending());
        if queued.is_empty() {
            return 0;
        }

        let total = queued.len();
        let still_failing: Vec<TransactionRecord> = queued
            .into_iter()
            .filter(|record| self.log.append(record).is_err())
            .collect();
        let remaining = still_failing.len();

        self.lock_pending().extend(still_failing);
        info!(
            reconciled = total - remaining,
            remaining, "history reconciliation pass finished"
        );
        remaining
    }

    pub fn pending(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<TransactionRecord>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("pending", &self.pending())
            .finish()
    }
}
