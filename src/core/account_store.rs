//! In-memory account store with optimistic, multi-account commits
//!
//! This module provides `MemoryAccountStore`, the default [`AccountStore`]
//! backend.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by user, each behind its own mutex and
//! tagged with a version that increments on every committed write. Readers
//! take a short lock on a single account and get a versioned copy. A commit
//! locks every account in its write set in ascending user order, checks each
//! version against the one the caller read, and only then writes them all.
//!
//! # Thread Safety
//!
//! - Commits on disjoint account sets never touch the same mutex
//! - Commits sharing an account serialize on that account's mutex
//! - The fixed lock order rules out deadlock between overlapping commits
//! - A failed version check leaves every account untouched

use crate::core::traits::AccountStore;
use crate::types::{Account, StoreError, UserId, Versioned};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Slot = Arc<Mutex<Versioned<Account>>>;

/// Thread-safe in-memory account store
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    /// Account slots by user
    ///
    /// A slot at version 0 was reserved by a commit in flight and reads as
    /// absent. A commit that fails its version check releases the slots it
    /// reserved.
    accounts: DashMap<UserId, Slot>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    fn slot(&self, user: &UserId) -> Option<Slot> {
        self.accounts.get(user).map(|entry| Arc::clone(entry.value()))
    }

    fn slot_or_reserve(&self, user: &UserId) -> Slot {
        // Clone the Arc out so the shard lock is released before any mutex is taken
        Arc::clone(
            self.accounts
                .entry(user.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Versioned::absent(Account::new(user.clone())))))
                .value(),
        )
    }

    /// Drop a version-0 slot left by a failed commit
    ///
    /// A slot still shared with another caller is kept: that caller may be
    /// about to commit into it.
    fn release_reserved(&self, user: &UserId) {
        self.accounts.remove_if(user, |_, slot| {
            Arc::strong_count(slot) == 1 && lock(slot).is_absent()
        });
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Versioned<Account>> {
    // Slots are only written after every check has passed, so a poisoned
    // slot still holds a consistent account.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AccountStore for MemoryAccountStore {
    fn load(&self, user: &UserId) -> Result<Option<Versioned<Account>>, StoreError> {
        Ok(self.slot(user).and_then(|slot| {
            let current = lock(&slot);
            (!current.is_absent()).then(|| current.clone())
        }))
    }

    fn commit(&self, writes: &[Versioned<Account>]) -> Result<(), StoreError> {
        let mut ordered: Vec<&Versioned<Account>> = writes.iter().collect();
        ordered.sort_by(|a, b| a.value.user.cmp(&b.value.user));

        if ordered
            .windows(2)
            .any(|pair| pair[0].value.user == pair[1].value.user)
        {
            return Err(StoreError::Unavailable {
                message: "write set names the same account twice".to_string(),
            });
        }

        let slots: Vec<Slot> = ordered
            .iter()
            .map(|write| self.slot_or_reserve(&write.value.user))
            .collect();

        // Acquire in ascending user order
        let mut guards: Vec<MutexGuard<'_, Versioned<Account>>> =
            slots.iter().map(lock).collect();

        let conflict = guards
            .iter()
            .zip(&ordered)
            .find(|(guard, write)| guard.version != write.version)
            .map(|(_, write)| write.value.user.to_string());

        if let Some(user) = conflict {
            drop(guards);
            drop(slots);
            for write in &ordered {
                self.release_reserved(&write.value.user);
            }
            return Err(StoreError::Conflict { user });
        }

        for (guard, write) in guards.iter_mut().zip(&ordered) {
            guard.value = write.value.clone();
            guard.version = write.version + 1;
        }

        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let slots: Vec<Slot> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut accounts: Vec<Account> = slots
            .iter()
            .filter_map(|slot| {
                let current = lock(slot);
                (!current.is_absent()).then(|| current.value.clone())
            })
            .collect();
        accounts.sort_by(|a, b| a.user.cmp(&b.user));
        Ok(accounts)
    }
}
