// ============================
// sessiongate-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! `SessionStore` is the raw token → record map. `SessionManager` layers the
//! lifecycle on top of it: token minting, the max-age rule of its
//! `SessionPolicy`, and the optional write-through to a `SessionPersistence`
//! backend.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::error::AuthError;
use super::persistent_session::SessionPersistence;
use super::token_generator::generate_secure_token;
use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_DESTROYED, SESSION_PURGED};

/// One login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Shorten a token for log output
pub(crate) fn token_prefix(token: &str) -> String {
    token.chars().take(8).collect()
}

/// Concurrent map from session token to record
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its token is already taken
    pub fn insert_new(&self, record: SessionRecord) -> bool {
        match self.sessions.entry(record.token.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            },
        }
    }

    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        self.sessions.get(token).map(|r| r.value().clone())
    }

    pub fn remove(&self, token: &str) -> Option<SessionRecord> {
        self.sessions.remove(token).map(|(_, record)| record)
    }

    /// Re-read `token` from `fetch` while holding its slot, caching the
    /// result only when `cache` accepts it.
    pub fn refresh<E>(
        &self,
        token: &str,
        fetch: impl FnOnce() -> Result<Option<SessionRecord>, E>,
        cache: impl FnOnce(&SessionRecord) -> bool,
    ) -> Result<Option<SessionRecord>, E> {
        let slot = self.sessions.entry(token.to_string());
        let fetched = fetch()?;
        let cached = fetched.clone().filter(cache);
        match (slot, cached) {
            (Entry::Occupied(mut slot), Some(record)) => {
                slot.insert(record);
            },
            (Entry::Occupied(slot), None) => {
                slot.remove();
            },
            (Entry::Vacant(slot), Some(record)) => {
                slot.insert(record);
            },
            (Entry::Vacant(_), None) => {},
        }
        Ok(fetched)
    }

    /// Run `release` while holding the slot of `token`, then drop the cached
    /// record. Returns what `release` reported.
    pub fn remove_with<E>(
        &self,
        token: &str,
        release: impl FnOnce() -> Result<bool, E>,
    ) -> Result<bool, E> {
        match self.sessions.entry(token.to_string()) {
            Entry::Occupied(slot) => {
                let released = release()?;
                slot.remove();
                Ok(released)
            },
            Entry::Vacant(_slot) => release(),
        }
    }

    /// Keep only the records `keep` accepts; returns how many were dropped
    pub fn retain(&self, mut keep: impl FnMut(&SessionRecord) -> bool) -> usize {
        let mut dropped = 0;
        self.sessions.retain(|_, record| {
            let kept = keep(record);
            if !kept {
                dropped += 1;
            }
            kept
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Expiration rule applied when a session is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    max_age: Option<Duration>,
}

impl SessionPolicy {
    /// Sessions never expire
    pub fn unlimited() -> Self {
        Self { max_age: None }
    }

    /// Sessions expire `secs` seconds after creation; zero or negative disables expiry
    pub fn from_secs(secs: i64) -> Self {
        Self {
            max_age: (secs > 0)
                .then(|| Duration::try_seconds(secs).unwrap_or_else(Duration::max_value)),
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// A session is expired once strictly more than `max_age` has elapsed
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.max_age {
            Some(max_age) => now - created_at > max_age,
            None => false,
        }
    }
}

/// Session lifecycle manager shared by every session-based authenticator
pub struct SessionManager {
    store: SessionStore,
    policy: SessionPolicy,
    persistence: Option<Arc<dyn SessionPersistence>>,
    clock: Arc<dyn Clock>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionPolicy::unlimited())
    }
}

impl SessionManager {
    /// Create an in-memory session manager
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            store: SessionStore::new(),
            policy,
            persistence: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Mirror every session to `persistence` and fall back to it on lookup misses
    pub fn with_persistence(mut self, persistence: Arc<dyn SessionPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Create a session for `user_id` and return its token
    pub fn create_session(&self, user_id: &str) -> Option<String> {
        match self.try_create_session(user_id) {
            Ok(token) => {
                counter!(SESSION_CREATED).increment(1);
                gauge!(SESSION_ACTIVE).set(self.store.len() as f64);
                info!(user_id, token = %token_prefix(&token), "session created");
                Some(token)
            },
            Err(err) => {
                debug!(reason = err.reason(), error = %err, "session not created");
                None
            },
        }
    }

    fn try_create_session(&self, user_id: &str) -> Result<String, AuthError> {
        if user_id.trim().is_empty() {
            return Err(AuthError::InvalidUserId);
        }
        let created_at = self.clock.now();

        // reserve a token nobody else holds
        let record = loop {
            let record = SessionRecord {
                token: generate_secure_token(),
                user_id: user_id.to_string(),
                created_at,
            };
            if self.store.insert_new(record.clone()) {
                break record;
            }
        };

        if let Some(persistence) = &self.persistence {
            if let Err(err) = persistence.save(&record) {
                self.store.remove(&record.token);
                return Err(AuthError::StoreUnavailable(err.to_string()));
            }
        }
        Ok(record.token)
    }

    /// Resolve a token to its live session record.
    ///
    /// With persistence the backend is the source of truth: every lookup
    /// re-reads it, so a session destroyed elsewhere stops resolving here too.
    pub fn lookup(&self, token: &str) -> Result<SessionRecord, AuthError> {
        if token.is_empty() {
            return Err(AuthError::TokenNotFound);
        }
        let now = self.clock.now();
        let record = match &self.persistence {
            Some(persistence) => {
                let policy = self.policy;
                self.store
                    .refresh(
                        token,
                        || persistence.load(token),
                        |record| !policy.is_expired(record.created_at, now),
                    )
                    .map_err(|err| AuthError::StoreUnavailable(err.to_string()))?
            },
            None => self.store.get(token),
        }
        .ok_or(AuthError::TokenNotFound)?;

        if self.policy.is_expired(record.created_at, now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(record)
    }

    /// User id owning the session, if the token is known and not expired
    pub fn user_id_for_session(&self, token: &str) -> Option<String> {
        match self.lookup(token) {
            Ok(record) => Some(record.user_id),
            Err(err) => {
                debug!(
                    reason = err.reason(),
                    error = %err,
                    token = %token_prefix(token),
                    "session not resolved"
                );
                None
            },
        }
    }

    /// Destroy a live session; returns whether a session was removed
    pub fn destroy_session(&self, token: &str) -> bool {
        match self.try_destroy_session(token) {
            Ok(()) => {
                counter!(SESSION_DESTROYED).increment(1);
                gauge!(SESSION_ACTIVE).set(self.store.len() as f64);
                info!(token = %token_prefix(token), "session destroyed");
                true
            },
            Err(err) => {
                debug!(
                    reason = err.reason(),
                    error = %err,
                    token = %token_prefix(token),
                    "session not destroyed"
                );
                false
            },
        }
    }

    fn try_destroy_session(&self, token: &str) -> Result<(), AuthError> {
        // expired sessions are left for purge_expired
        self.lookup(token)?;
        let removed = match &self.persistence {
            // the backend decides the single winner
            Some(persistence) => self
                .store
                .remove_with(token, || persistence.remove(token))
                .map_err(|err| AuthError::StoreUnavailable(err.to_string()))?,
            None => self.store.remove(token).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(AuthError::TokenNotFound)
        }
    }

    /// Drop expired records from memory and from the persistence backend;
    /// returns how many sessions were removed
    pub fn purge_expired(&self) -> usize {
        if self.policy.max_age().is_none() {
            return 0;
        }
        let now = self.clock.now();
        let policy = self.policy;
        let live = |record: &SessionRecord| !policy.is_expired(record.created_at, now);

        let mut removed = self.store.retain(live);
        if let Some(persistence) = &self.persistence {
            match persistence.retain(&live) {
                Ok(persisted) => removed = removed.max(persisted),
                Err(err) => warn!(error = %err, "could not purge persisted sessions"),
            }
        }
        if removed > 0 {
            counter!(SESSION_PURGED).increment(removed as u64);
            gauge!(SESSION_ACTIVE).set(self.store.len() as f64);
            info!(removed, "expired sessions purged");
        }
        removed
    }

    /// Number of cached records, expired ones included
    pub fn active_session_count(&self) -> usize {
        self.store.len()
    }
}
