// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for owned records.
//!
//! Every read, update or delete of a single item or card goes through
//! [`OwnershipGuard`]. The guard checks, in order:
//!
//! 1. the id is syntactically valid (`InvalidId`)
//! 2. the record exists (`NotFound`)
//! 3. the caller owns it (`NotOwner`)
//!
//! A caller without a session never reaches the guard; the `Auth`
//! extractor rejects the request first.

use crate::auth::SessionIdentity;
use crate::models::RecordId;

use super::StorageError;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Human readable kind used in error messages ("Item", "Card").
    const KIND: &'static str;

    /// Get the owner's user ID.
    fn owner_id(&self) -> &RecordId;
}

/// Why access to an owned record was refused.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid {} id", .kind.to_lowercase())]
    InvalidId { kind: &'static str },

    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("{kind} does not belong to you")]
    NotOwner {
        kind: &'static str,
        id: RecordId,
        user_id: RecordId,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AccessError {
    /// Error mapping for a write that follows a successful guard check. A
    /// record deleted in between reports as not found.
    pub fn on_write(kind: &'static str, id: RecordId) -> impl FnOnce(StorageError) -> Self {
        move |err| match err {
            StorageError::NotFound(_) => Self::NotFound { kind, id },
            other => Self::Storage(other),
        }
    }
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that `identity` owns this resource.
    ///
    /// # Errors
    /// Returns `AccessError::NotOwner` if the caller doesn't own the resource.
    fn verify_ownership(&self, id: &RecordId, identity: &SessionIdentity)
        -> Result<(), AccessError>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(
        &self,
        id: &RecordId,
        identity: &SessionIdentity,
    ) -> Result<(), AccessError> {
        if identity.is(self.owner_id()) {
            Ok(())
        } else {
            Err(AccessError::NotOwner {
                kind: T::KIND,
                id: *id,
                user_id: identity.user_id,
            })
        }
    }
}

/// Decide access to a looked-up record. Existence is checked before
/// ownership so a missing record is never reported as forbidden.
pub fn authorize<T: OwnedResource>(
    record: Option<T>,
    id: &RecordId,
    identity: &SessionIdentity,
) -> Result<T, AccessError> {
    let record = record.ok_or(AccessError::NotFound { kind: T::KIND, id: *id })?;
    record.verify_ownership(id, identity)?;
    Ok(record)
}

/// Per-request ownership check bound to the caller's session.
pub struct OwnershipGuard<'a> {
    identity: &'a SessionIdentity,
}

impl<'a> OwnershipGuard<'a> {
    pub fn new(identity: &'a SessionIdentity) -> Self {
        Self { identity }
    }

    /// Parse a raw path segment into a record id.
    pub fn parse_id(kind: &'static str, raw: &str) -> Result<RecordId, AccessError> {
        RecordId::parse(raw).map_err(|_| AccessError::InvalidId { kind })
    }

    /// Look up `id` and return the record only if the caller owns it.
    pub fn fetch<T, F>(&self, id: &RecordId, lookup: F) -> Result<T, AccessError>
    where
        T: OwnedResource,
        F: FnOnce(&RecordId) -> Result<Option<T>, StorageError>,
    {
        let record = lookup(id)?;
        authorize(record, id, self.identity).inspect_err(|e| {
            if let AccessError::NotOwner { kind, id, user_id } = e {
                tracing::warn!(
                    kind = *kind,
                    record_id = %id,
                    user_id = %user_id,
                    "Ownership check failed"
                );
            }
        })
    }

    /// Parse then fetch in one step.
    pub fn resolve<T, F>(&self, raw_id: &str, lookup: F) -> Result<T, AccessError>
    where
        T: OwnedResource,
        F: FnOnce(&RecordId) -> Result<Option<T>, StorageError>,
    {
        let id = Self::parse_id(T::KIND, raw_id)?;
        self.fetch(&id, lookup)
    }
}
