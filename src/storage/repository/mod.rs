// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to JSON storage.
//!
//! Each record type lives in its own collection directory, one file per
//! record. [`Repository`] provides the CRUD operations shared by every
//! collection; the per-type modules add their record types and any
//! collection-specific queries.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use super::ownership::OwnedResource;
use super::{JsonStorage, StorageError, StorageResult};
use crate::models::RecordId;

pub mod cards;
pub mod items;
pub mod users;

pub use cards::{CardFields, CardRepository, StoredCard};
pub use items::{ItemFields, ItemRepository, StoredItem};
pub use users::{normalize_email, StoredUser, UserRepository};

/// A record type persisted in its own collection.
pub trait StoredRecord: Serialize + DeserializeOwned {
    /// Collection directory name.
    const COLLECTION: &'static str;

    fn record_id(&self) -> &RecordId;
}

/// CRUD access to one collection.
pub struct Repository<'a, T> {
    storage: &'a JsonStorage,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: StoredRecord> Repository<'a, T> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Check if a record exists.
    pub fn exists(&self, id: &RecordId) -> bool {
        self.storage.exists(self.path(id))
    }

    /// Find a record by id. A missing record is `Ok(None)`.
    pub fn find(&self, id: &RecordId) -> StorageResult<Option<T>> {
        match self.storage.read_json(self.path(id)) {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persist a new record.
    pub fn create(&self, record: &T) -> StorageResult<()> {
        let id = record.record_id();
        if self.exists(id) {
            return Err(StorageError::AlreadyExists(format!(
                "{} {id}",
                T::COLLECTION
            )));
        }
        self.storage.write_json(self.path(id), record)
    }

    /// Overwrite an existing record. Last write wins.
    pub fn update(&self, record: &T) -> StorageResult<()> {
        let id = record.record_id();
        if !self.exists(id) {
            return Err(StorageError::NotFound(format!("{} {id}", T::COLLECTION)));
        }
        self.storage.write_json(self.path(id), record)
    }

    /// Delete a record.
    pub fn delete(&self, id: &RecordId) -> StorageResult<()> {
        self.storage
            .delete(self.path(id))
            .map_err(|e| match e {
                StorageError::NotFound(_) => {
                    StorageError::NotFound(format!("{} {id}", T::COLLECTION))
                }
                other => other,
            })
    }

    /// All records matching `filter`. No match is an empty list.
    ///
    /// Records deleted while listing are skipped; unreadable files are
    /// logged and skipped so one corrupt record cannot hide the rest.
    pub fn list_where<F>(&self, mut filter: F) -> StorageResult<Vec<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let dir = self.storage.paths().collection_dir(T::COLLECTION);
        let file_ids = self.storage.list_files(dir, "json")?;

        let mut records = Vec::new();
        for file_id in file_ids {
            let Ok(id) = RecordId::parse(&file_id) else {
                continue;
            };
            match self.find(&id) {
                Ok(Some(record)) if filter(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        collection = T::COLLECTION,
                        record_id = %id,
                        error = %e,
                        "Skipping unreadable record"
                    );
                }
            }
        }

        Ok(records)
    }

    /// List every record in the collection.
    pub fn list_all(&self) -> StorageResult<Vec<T>> {
        self.list_where(|_| true)
    }

    fn path(&self, id: &RecordId) -> std::path::PathBuf {
        self.storage.paths().record(T::COLLECTION, &id.to_string())
    }
}

impl<'a, T: StoredRecord + OwnedResource> Repository<'a, T> {
    /// List all records owned by a user.
    ///
    /// The owner filter is the query itself, so every returned record
    /// already belongs to `owner_id`.
    pub fn list_by_owner(&self, owner_id: &RecordId) -> StorageResult<Vec<T>> {
        self.list_where(|record| record.owner_id() == owner_id)
    }
}
