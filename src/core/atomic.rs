//! Optimistic read-modify-commit over one or more accounts
//!
//! [`run_transaction`] is the only path through which the ledger changes an
//! account. Each attempt reads every involved account fresh from the store,
//! lets the caller mutate private copies, then commits them against the
//! versions it read. A conflicting commit is retried from a fresh read, so a
//! balance check inside the closure always sees the latest committed state.

use crate::core::traits::AccountStore;
use crate::types::{Account, LedgerError, StoreError, UserId, Versioned};
use std::thread;
use tracing::debug;

/// Run `body` atomically over the accounts of `users`
///
/// `body` receives the accounts in the same order as `users`, with absent
/// accounts presented as zero-balance accounts. Returning `Err` abandons the
/// attempt with nothing written.
///
/// # Errors
///
/// * Whatever `body` returns
/// * `TransferConflict` - every one of `max_attempts` commits conflicted
/// * `Unknown` - a commit timed out and may have landed
/// * `StoreUnavailable` - the store refused a read or commit; nothing landed
pub fn run_transaction<T, F>(
    store: &dyn AccountStore,
    operation: &str,
    users: &[&UserId],
    max_attempts: u32,
    mut body: F,
) -> Result<T, LedgerError>
where
    F: FnMut(&mut [Account]) -> Result<T, LedgerError>,
{
    let primary = users.first().map(|u| u.as_str()).unwrap_or_default();
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let mut snapshot = Vec::with_capacity(users.len());
        for user in users {
            let current = store
                .load(user)
                .map_err(|e| LedgerError::store_unavailable(operation, e))?
                .unwrap_or_else(|| Versioned::absent(Account::new((*user).clone())));
            snapshot.push(current);
        }

        let mut working: Vec<Account> = snapshot.iter().map(|v| v.value.clone()).collect();
        let output = body(&mut working)?;

        let writes: Vec<Versioned<Account>> = working
            .into_iter()
            .zip(&snapshot)
            .map(|(account, read)| Versioned::new(account, read.version))
            .collect();

        match store.commit(&writes) {
            Ok(()) => return Ok(output),
            Err(StoreError::Conflict { user }) => {
                debug!(operation, attempt, conflicting_user = %user, "commit conflict, retrying");
                thread::yield_now();
            }
            Err(StoreError::Timeout { message }) => {
                return Err(LedgerError::unknown(operation, primary, message));
            }
            Err(e @ StoreError::Unavailable { .. }) => {
                return Err(LedgerError::store_unavailable(operation, e));
            }
        }
    }

    Err(LedgerError::transfer_conflict(
        operation,
        primary,
        max_attempts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::MemoryAccountStore;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store that reports a conflict for the first `conflicts` commits
    struct ConflictingStore {
        inner: MemoryAccountStore,
        conflicts: AtomicU32,
        outcome: Option<StoreError>,
    }

    impl ConflictingStore {
        fn new(conflicts: u32) -> Self {
            Self {
                inner: MemoryAccountStore::new(),
                conflicts: AtomicU32::new(conflicts),
                outcome: None,
            }
        }

        fn failing_with(error: StoreError) -> Self {
            Self {
                inner: MemoryAccountStore::new(),
                conflicts: AtomicU32::new(0),
                outcome: Some(error),
            }
        }
    }

    impl AccountStore for ConflictingStore {
        fn load(&self, user: &UserId) -> Result<Option<Versioned<Account>>, StoreError> {
            self.inner.load(user)
        }

        fn commit(&self, writes: &[Versioned<Account>]) -> Result<(), StoreError> {
            if let Some(error) = &self.outcome {
                return Err(error.clone());
            }
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Conflict {
                    user: writes[0].value.user.to_string(),
                });
            }
            self.inner.commit(writes)
        }

        fn accounts(&self) -> Result<Vec<Account>, StoreError> {
            self.inner.accounts()
        }
    }

    fn credit(accounts: &mut [Account]) -> Result<(), LedgerError> {
        accounts[0].balance += Decimal::TEN;
        Ok(())
    }

    #[test]
    fn test_commits_on_first_attempt() {
        let store = MemoryAccountStore::new();
        let alice = UserId::from("alice");

        run_transaction(&store, "deposit", &[&alice], 3, credit).unwrap();

        let loaded = store.load(&alice).unwrap().unwrap();
        assert_eq!(loaded.value.balance, Decimal::TEN);
    }

    #[test]
    fn test_retries_after_conflict() {
        let store = ConflictingStore::new(2);
        let alice = UserId::from("alice");
        let mut calls = 0;

        run_transaction(&store, "deposit", &[&alice], 3, |accounts| {
            calls += 1;
            credit(accounts)
        })
        .unwrap();

        assert_eq!(calls, 3);
        let loaded = store.load(&alice).unwrap().unwrap();
        assert_eq!(loaded.value.balance, Decimal::TEN);
    }

    #[test]
    fn test_conflict_exhaustion_surfaces_transfer_conflict() {
        let store = ConflictingStore::new(10);
        let alice = UserId::from("alice");

        let result = run_transaction(&store, "deposit", &[&alice], 3, credit);

        assert_eq!(
            result,
            Err(LedgerError::transfer_conflict("deposit", "alice", 3))
        );
        assert_eq!(store.load(&alice).unwrap(), None);
    }

    #[test]
    fn test_commit_timeout_is_unknown() {
        let store = ConflictingStore::failing_with(StoreError::Timeout {
            message: "deadline exceeded".to_string(),
        });
        let alice = UserId::from("alice");

        let result = run_transaction(&store, "deposit", &[&alice], 3, credit);

        assert_eq!(
            result,
            Err(LedgerError::unknown("deposit", "alice", "deadline exceeded"))
        );
    }

    #[test]
    fn test_unavailable_store_is_reported() {
        let store = ConflictingStore::failing_with(StoreError::Unavailable {
            message: "down".to_string(),
        });
        let alice = UserId::from("alice");

        let result = run_transaction(&store, "deposit", &[&alice], 3, credit);

        assert!(matches!(result, Err(LedgerError::StoreUnavailable { .. })));
    }

    #[test]
    fn test_body_error_writes_nothing() {
        let store = MemoryAccountStore::new();
        let alice = UserId::from("alice");

        let result: Result<(), _> = run_transaction(&store, "withdraw", &[&alice], 3, |_| {
            Err(LedgerError::insufficient_funds("alice", Decimal::ZERO, Decimal::ONE))
        });

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(store.load(&alice).unwrap(), None);
    }
}
