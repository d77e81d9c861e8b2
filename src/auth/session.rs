// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server-side session store.
//!
//! ## Security
//!
//! - Session ids are 256 bits from the OS RNG, hex encoded
//! - Sessions live only in memory and are lost on restart
//! - Expiry is rolling: every successful lookup extends it by the TTL

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{rngs::OsRng, RngCore};
use tokio::sync::RwLock;

use super::SessionIdentity;
use crate::models::RecordId;

/// Bytes of randomness in a session id.
const SESSION_ID_BYTES: usize = 32;

/// One live session.
#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: RecordId,
    expires_at: Instant,
}

/// In-memory session map, cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Rolling session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user_id` and return its id.
    pub async fn create(&self, user_id: RecordId) -> String {
        let mut raw = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut raw);
        let session_id = hex::encode(raw);

        let record = SessionRecord {
            user_id,
            expires_at: Instant::now() + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), record);

        tracing::debug!(user_id = %user_id, "Session created");
        session_id
    }

    /// Resolve a session id to the caller's identity, refreshing its expiry.
    ///
    /// Returns `None` for unknown or expired sessions; expired ones are
    /// removed.
    pub async fn resolve(&self, session_id: &str) -> Option<SessionIdentity> {
        self.resolve_at(session_id, Instant::now()).await
    }

    async fn resolve_at(&self, session_id: &str, now: Instant) -> Option<SessionIdentity> {
        let mut sessions = self.sessions.write().await;

        let record = sessions.get_mut(session_id)?;
        if now >= record.expires_at {
            sessions.remove(session_id);
            return None;
        }

        record.expires_at = now + self.ttl;
        Some(SessionIdentity::new(record.user_id, session_id))
    }

    /// End a session. Returns whether it existed.
    pub async fn destroy(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// End every session belonging to `user_id`.
    pub async fn destroy_for_user(&self, user_id: &RecordId) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| &record.user_id != user_id);
        before - sessions.len()
    }

    /// Drop all expired sessions.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| now < record.expires_at);
        before - sessions.len()
    }

    /// Number of sessions currently held (including not yet purged ones).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn create_and_resolve() {
        let store = SessionStore::new(TTL);
        let user = RecordId::new();

        let session_id = store.create(user).await;
        assert_eq!(session_id.len(), SESSION_ID_BYTES * 2);

        let identity = store.resolve(&session_id).await.unwrap();
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.session_id, session_id);
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let store = SessionStore::new(TTL);
        let user = RecordId::new();

        let first = store.create(user).await;
        let second = store.create(user).await;
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn unknown_session_resolves_to_none() {
        let store = SessionStore::new(TTL);
        assert!(store.resolve("does-not-exist").await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_removed() {
        let store = SessionStore::new(TTL);
        let session_id = store.create(RecordId::new()).await;

        let later = Instant::now() + TTL + Duration::from_secs(1);
        assert!(store.resolve_at(&session_id, later).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn resolve_extends_expiry() {
        let store = SessionStore::new(TTL);
        let session_id = store.create(RecordId::new()).await;
        let start = Instant::now();

        // Touch it before it expires, then go past the original deadline.
        let touch = start + TTL / 2;
        assert!(store.resolve_at(&session_id, touch).await.is_some());

        let past_original = start + TTL + Duration::from_secs(5);
        assert!(store.resolve_at(&session_id, past_original).await.is_some());
    }

    #[tokio::test]
    async fn destroy_ends_session() {
        let store = SessionStore::new(TTL);
        let session_id = store.create(RecordId::new()).await;

        assert!(store.destroy(&session_id).await);
        assert!(!store.destroy(&session_id).await);
        assert!(store.resolve(&session_id).await.is_none());
    }

    #[tokio::test]
    async fn destroy_for_user_only_touches_that_user() {
        let store = SessionStore::new(TTL);
        let alice = RecordId::new();
        let bob = RecordId::new();

        let a1 = store.create(alice).await;
        let a2 = store.create(alice).await;
        let b1 = store.create(bob).await;

        assert_eq!(store.destroy_for_user(&alice).await, 2);
        assert!(store.resolve(&a1).await.is_none());
        assert!(store.resolve(&a2).await.is_none());
        assert!(store.resolve(&b1).await.is_some());
    }

    #[tokio::test]
    async fn purge_drops_only_expired() {
        let store = SessionStore::new(TTL);
        store.create(RecordId::new()).await;
        store.create(RecordId::new()).await;

        assert_eq!(store.purge_expired().await, 0);

        let later = Instant::now() + TTL + Duration::from_secs(1);
        assert_eq!(store.purge_expired_at(later).await, 2);
        assert!(store.is_empty().await);
    }
}
