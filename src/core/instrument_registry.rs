//! Card registration and lookup
//!
//! This module provides the `InstrumentRegistry`, the only writer of card
//! records. It keeps two concurrent maps: card number to registration, and
//! user to their current card number.
//!
//! The registry is responsible for:
//! - Validating card number format
//! - Enforcing global uniqueness of card numbers
//! - Replacing a user's previous card on re-registration
//! - Resolving card numbers to users with lazily computed expiry

use crate::core::traits::Clock;
use crate::types::{Instrument, InstrumentId, LedgerError, Resolution, UserId};
use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Thread-safe card registry
pub struct InstrumentRegistry {
    /// Registrations by card number
    instruments: DashMap<InstrumentId, Instrument>,

    /// Current card number of each user
    bindings: DashMap<UserId, InstrumentId>,

    clock: Arc<dyn Clock>,

    /// How long a card stays valid after (re-)registration
    ttl: Duration,
}

impl InstrumentRegistry {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            instruments: DashMap::new(),
            bindings: DashMap::new(),
            clock,
            ttl,
        }
    }

    /// Bind a card number to a user
    ///
    /// Registering a card the user already holds refreshes its creation
    /// time, restarting the expiry window. Registering a new card replaces
    /// the user's previous one, which stops resolving.
    ///
    /// # Errors
    ///
    /// * `InvalidInstrumentFormat` - `raw_id` is not exactly ten digits
    /// * `InstrumentAlreadyRegistered` - the card is bound to another user
    pub fn register(&self, user: &UserId, raw_id: &str) -> Result<Instrument, LedgerError> {
        let id = InstrumentId::parse(raw_id)?;
        let now = self.clock.now();

        // The binding guard serializes registrations of one user and is held
        // until the binding is written. Lock order is always bindings, then
        // instruments.
        let binding = self.bindings.entry(user.clone());
        let previous = match &binding {
            Entry::Occupied(occupied) => Some(occupied.get().clone()),
            Entry::Vacant(_) => None,
        };

        // The card guard makes check-and-claim atomic per card number
        let instrument = match self.instruments.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().owner != *user {
                    return Err(LedgerError::instrument_already_registered(id.as_str()));
                }
                occupied.get_mut().created_at = now;
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(Instrument {
                    id: id.clone(),
                    owner: user.clone(),
                    created_at: now,
                })
                .clone(),
        };

        // The card guard is released above, so this removal cannot deadlock
        if let Some(previous) = previous.filter(|previous| *previous != id) {
            self.instruments
                .remove_if(&previous, |_, old| old.owner == *user);
            info!(user = %user, replaced = %previous, card = %id, "card replaced");
        }

        match binding {
            Entry::Occupied(mut occupied) => {
                occupied.insert(id.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id.clone());
            }
        }

        info!(user = %user, card = %id, "card registered");
        Ok(instrument)
    }

    /// Look up the owner of a card number
    ///
    /// Expiry is computed against the clock at call time. Expired cards
    /// still resolve.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(resolution))` - the card is registered
    /// * `Ok(None)` - no such card
    /// * `Err(InvalidInstrumentFormat)` - `raw_id` is not exactly ten digits
    pub fn resolve(&self, raw_id: &str) -> Result<Option<Resolution>, LedgerError> {
        let id = InstrumentId::parse(raw_id)?;
        Ok(self.lookup(&id))
    }

    /// Look up an already validated card number
    pub fn lookup(&self, id: &InstrumentId) -> Option<Resolution> {
        let instrument = self.instruments.get(id).map(|entry| entry.value().clone())?;
        let expired = instrument.is_expired_at(self.clock.now(), self.ttl);

        Some(Resolution {
            user: instrument.owner.clone(),
            expired,
            instrument,
        })
    }

    /// The card currently bound to `user`, if any
    pub fn instrument_of(&self, user: &UserId) -> Option<InstrumentId> {
        self.bindings.get(user).map(|entry| entry.value().clone())
    }
}

impl std::fmt::Debug for InstrumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentRegistry")
            .field("instruments", &self.instruments.len())
            .field("bindings", &self.bindings.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
