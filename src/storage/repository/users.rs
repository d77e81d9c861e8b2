// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account repository.
//!
//! Accounts are stored under `users/` with an Argon2 password hash. Emails
//! are normalized (trimmed, lowercased) before they are stored or compared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Repository, StoredRecord};
use crate::models::{RecordId, UserProfile};
use crate::storage::paths::USERS;
use crate::storage::StorageResult;

/// User account as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn new(name: String, email: &str, password_hash: String) -> Self {
        Self {
            id: RecordId::new(),
            name,
            email: normalize_email(email),
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Public view without the password hash.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

impl StoredRecord for StoredUser {
    const COLLECTION: &'static str = USERS;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// Canonical form used for storing and matching emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user accounts.
pub type UserRepository<'a> = Repository<'a, StoredUser>;

impl Repository<'_, StoredUser> {
    /// Find the account registered under `email`, if any.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let email = normalize_email(email);
        Ok(self
            .list_where(|user| user.email == email)?
            .into_iter()
            .next())
    }
}
