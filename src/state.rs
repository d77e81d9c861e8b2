// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::auth::SessionStore;
use crate::crypto::FieldCodec;
use crate::storage::JsonStorage;

/// Shared handler state.
///
/// The codec is read-only after startup and shared by every request. The
/// session store and storage handle are internally synchronized. Account
/// writes that depend on email uniqueness hold the account lock.
#[derive(Clone)]
pub struct AppState {
    storage: JsonStorage,
    codec: Arc<FieldCodec>,
    sessions: SessionStore,
    accounts: Arc<Mutex<()>>,
    cookie_secure: bool,
}

impl AppState {
    pub fn new(storage: JsonStorage, codec: FieldCodec, sessions: SessionStore) -> Self {
        Self {
            storage,
            codec: Arc::new(codec),
            sessions,
            accounts: Arc::new(Mutex::new(())),
            cookie_secure: false,
        }
    }

    /// Mark session cookies `Secure`.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Serialize an email lookup with the account write that follows it.
    pub async fn lock_accounts(&self) -> MutexGuard<'_, ()> {
        self.accounts.lock().await
    }
}

#[cfg(test)]
impl AppState {
    /// State over a fresh temp directory. Keep the `TempDir` alive for the
    /// duration of the test.
    pub(crate) fn for_tests() -> (Self, tempfile::TempDir) {
        use crate::storage::StoragePaths;

        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let mut storage = JsonStorage::new(StoragePaths::new(temp_dir.path()));
        storage.initialize().expect("Failed to initialize storage");

        let codec = FieldCodec::from_secret("test-encryption-key").expect("valid secret");
        let sessions = SessionStore::new(std::time::Duration::from_secs(3600));

        (Self::new(storage, codec, sessions), temp_dir)
    }
}
