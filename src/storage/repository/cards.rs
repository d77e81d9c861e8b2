// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card repository.
//!
//! Each card is stored as a separate JSON file under `cards/`. The holder
//! name, number, expiry and security code are codec envelopes; the display
//! name, brand and favorite flag are stored in the clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Repository, StoredRecord};
use crate::crypto::{CryptoError, FieldCodec};
use crate::models::{Card, CardBrand, RecordId};
use crate::storage::paths::CARDS;
use crate::storage::OwnedResource;

/// Card as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCard {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub name: String,
    pub card_holder_name: String,
    pub card_number: String,
    pub expired_month: String,
    pub expired_year: String,
    pub card_code: String,
    pub brand: CardBrand,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plaintext card fields.
#[derive(Debug, Clone)]
pub struct CardFields {
    pub name: String,
    pub card_holder_name: String,
    pub card_number: String,
    pub expired_month: String,
    pub expired_year: String,
    pub card_code: String,
    pub brand: CardBrand,
}

impl StoredCard {
    pub fn seal(owner_id: RecordId, fields: CardFields, favorite: bool, codec: &FieldCodec) -> Self {
        let now = Utc::now();
        let mut card = Self {
            id: RecordId::new(),
            owner_id,
            name: String::new(),
            card_holder_name: String::new(),
            card_number: String::new(),
            expired_month: String::new(),
            expired_year: String::new(),
            card_code: String::new(),
            brand: CardBrand::default(),
            favorite,
            created_at: now,
            updated_at: now,
        };
        card.apply(fields, codec);
        card
    }

    /// Replace the editable fields. `favorite` is only changed when given.
    pub fn overwrite(&mut self, fields: CardFields, favorite: Option<bool>, codec: &FieldCodec) {
        self.apply(fields, codec);
        if let Some(favorite) = favorite {
            self.favorite = favorite;
        }
        self.updated_at = Utc::now();
    }

    fn apply(&mut self, fields: CardFields, codec: &FieldCodec) {
        self.name = fields.name;
        self.card_holder_name = codec.encrypt(&fields.card_holder_name);
        self.card_number = codec.encrypt(&fields.card_number);
        self.expired_month = codec.encrypt(&fields.expired_month);
        self.expired_year = codec.encrypt(&fields.expired_year);
        self.card_code = codec.encrypt(&fields.card_code);
        self.brand = fields.brand;
    }

    /// Decrypt into the API representation.
    pub fn reveal(&self, codec: &FieldCodec) -> Result<Card, CryptoError> {
        Ok(Card {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            card_holder_name: codec.decrypt(&self.card_holder_name)?,
            card_number: codec.decrypt(&self.card_number)?,
            expired_month: codec.decrypt(&self.expired_month)?,
            expired_year: codec.decrypt(&self.expired_year)?,
            card_code: codec.decrypt(&self.card_code)?,
            brand: self.brand,
            favorite: self.favorite,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StoredRecord for StoredCard {
    const COLLECTION: &'static str = CARDS;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl OwnedResource for StoredCard {
    const KIND: &'static str = "Card";

    fn owner_id(&self) -> &RecordId {
        &self.owner_id
    }
}

/// Repository for card operations.
pub type CardRepository<'a> = Repository<'a, StoredCard>;
