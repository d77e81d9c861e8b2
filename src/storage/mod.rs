// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage Module
//!
//! Persistent storage as JSON files under a configurable data directory.
//! Secret fields are encrypted by the field codec before a record reaches
//! this layer; storage itself only sees envelopes.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/
//!   users/
//!     {user_id}.json      # Account (name, email, Argon2 hash)
//!   items/
//!     {item_id}.json      # Saved login (username/password encrypted)
//!   cards/
//!     {card_id}.json      # Payment card (holder/number/expiry/code encrypted)
//!   audit/
//!     {date}/events.jsonl # Daily audit logs
//! ```
//!
//! ## Access Control
//!
//! Single-record access to items and cards goes through
//! [`ownership::OwnershipGuard`]; listings are filtered by owner in the
//! query itself.

pub mod audit;
pub mod json_fs;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use json_fs::{JsonStorage, StorageError, StorageResult};
pub use ownership::{authorize, AccessError, OwnedResource, OwnershipEnforcer, OwnershipGuard};
pub use paths::StoragePaths;
pub use repository::{
    normalize_email, CardFields, CardRepository, ItemFields, ItemRepository, Repository,
    StoredCard, StoredItem, StoredRecord, StoredUser, UserRepository,
};
