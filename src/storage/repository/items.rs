// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item repository.
//!
//! Items are saved logins. Each item is stored as a separate JSON file
//! under `items/`, with `username` and `password` held as codec envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Repository, StoredRecord};
use crate::crypto::{CryptoError, FieldCodec};
use crate::models::{Category, Item, RecordId};
use crate::storage::paths::ITEMS;
use crate::storage::OwnedResource;

/// Item as persisted. Secret fields are `iv:ciphertext` envelopes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredItem {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plaintext item fields, sealed into a [`StoredItem`] by the codec.
#[derive(Debug, Clone)]
pub struct ItemFields {
    pub name: String,
    pub username: String,
    pub password: String,
    pub category: Category,
    pub url: Option<String>,
    pub favorite: bool,
}

impl StoredItem {
    /// Encrypt `fields` into a new record owned by `owner_id`.
    pub fn seal(owner_id: RecordId, fields: ItemFields, codec: &FieldCodec) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            owner_id,
            name: fields.name,
            username: codec.encrypt(&fields.username),
            password: codec.encrypt(&fields.password),
            category: fields.category,
            url: fields.url,
            favorite: fields.favorite,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field. Id, owner and creation time are kept.
    pub fn overwrite(&mut self, fields: ItemFields, codec: &FieldCodec) {
        self.name = fields.name;
        self.username = codec.encrypt(&fields.username);
        self.password = codec.encrypt(&fields.password);
        self.category = fields.category;
        self.url = fields.url;
        self.favorite = fields.favorite;
        self.updated_at = Utc::now();
    }

    /// Decrypt into the API representation.
    pub fn reveal(&self, codec: &FieldCodec) -> Result<Item, CryptoError> {
        Ok(Item {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            username: codec.decrypt(&self.username)?,
            password: codec.decrypt(&self.password)?,
            category: self.category,
            url: self.url.clone(),
            favorite: self.favorite,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StoredRecord for StoredItem {
    const COLLECTION: &'static str = ITEMS;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl OwnedResource for StoredItem {
    const KIND: &'static str = "Item";

    fn owner_id(&self) -> &RecordId {
        &self.owner_id
    }
}

/// Repository for item operations.
pub type ItemRepository<'a> = Repository<'a, StoredItem>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonStorage, StoragePaths};
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonStorage, FieldCodec) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let codec = FieldCodec::from_secret("item-tests").unwrap();
        (temp, storage, codec)
    }

    fn fields(name: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            username: "alice".to_string(),
            password: "s3cret".to_string(),
            category: Category::Work,
            url: Some("https://example.com".to_string()),
            favorite: true,
        }
    }

    #[test]
    fn secrets_are_encrypted_on_disk() {
        let (_temp, storage, codec) = setup();
        let repo = ItemRepository::new(&storage);
        let item = StoredItem::seal(RecordId::new(), fields("Mail"), &codec);
        repo.create(&item).unwrap();

        let raw = std::fs::read_to_string(
            storage.paths().record(ITEMS, &item.id.to_string()),
        )
        .unwrap();
        assert!(!raw.contains("s3cret"));
        assert!(!raw.contains("\"alice\""));
        assert!(raw.contains("Mail"));
    }

    #[test]
    fn reveal_restores_plaintext() {
        let (_temp, storage, codec) = setup();
        let repo = ItemRepository::new(&storage);
        let owner = RecordId::new();
        let item = StoredItem::seal(owner, fields("Mail"), &codec);
        repo.create(&item).unwrap();

        let loaded = repo.find(&item.id).unwrap().unwrap().reveal(&codec).unwrap();
        assert_eq!(loaded.owner_id, owner);
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.password, "s3cret");
        assert_eq!(loaded.category, Category::Work);
        assert_eq!(loaded.url.as_deref(), Some("https://example.com"));
        assert!(loaded.favorite);
    }

    #[test]
    fn overwrite_keeps_identity() {
        let (_temp, _storage, codec) = setup();
        let owner = RecordId::new();
        let mut item = StoredItem::seal(owner, fields("Mail"), &codec);
        let (id, created_at) = (item.id, item.created_at);

        item.overwrite(
            ItemFields {
                name: "Bank".to_string(),
                username: "bob".to_string(),
                password: "hunter2".to_string(),
                category: Category::NoCategory,
                url: None,
                favorite: false,
            },
            &codec,
        );

        let revealed = item.reveal(&codec).unwrap();
        assert_eq!(revealed.id, id);
        assert_eq!(revealed.owner_id, owner);
        assert_eq!(revealed.created_at, created_at);
        assert_eq!(revealed.name, "Bank");
        assert_eq!(revealed.password, "hunter2");
        assert_eq!(revealed.url, None);
        assert!(revealed.updated_at >= created_at);
    }

    #[test]
    fn reveal_with_wrong_key_fails_or_differs() {
        let (_temp, _storage, codec) = setup();
        let item = StoredItem::seal(RecordId::new(), fields("Mail"), &codec);
        let other = FieldCodec::from_secret("some-other-key").unwrap();

        match item.reveal(&other) {
            Ok(revealed) => assert_ne!(revealed.password, "s3cret"),
            Err(e) => assert!(matches!(e, CryptoError::InvalidUtf8)),
        }
    }
}
