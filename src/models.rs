// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API, plus the identifier type
//! shared by every stored record. Response types carry decrypted values and
//! are only ever built from a stored record through the field codec.
//!
//! ## Model Categories
//!
//! - **Users**: signup, login, profile and password change
//! - **Items**: saved logins (username and password are secrets)
//! - **Cards**: payment cards (holder, number, expiry and code are secrets)
//!
//! Request fields are `Option`s so that a missing field is reported with a
//! descriptive 400 by the handler instead of a generic deserialization error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Record Identifier
// =============================================================================

/// Identifier of a stored record (users, items, cards).
///
/// Only values produced by [`RecordId::parse`] or [`RecordId::new`] exist, so
/// an id can always be used as a file name.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct RecordId(Uuid);

/// The string is not a syntactically valid record id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record id: {0:?}")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidRecordId> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidRecordId(raw.to_string()))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of a user account. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile change. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

// =============================================================================
// Item Models
// =============================================================================

/// Category of a saved login.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum Category {
    Work,
    Personal,
    Social,
    Banking,
    Other,
    #[default]
    #[serde(rename = "No category")]
    NoCategory,
}

/// A saved login with its secrets decrypted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Item {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub category: Option<Category>,
    pub url: Option<String>,
    pub favorite: Option<bool>,
}

/// Full replacement of an item's editable fields.
///
/// `name`, `username` and `password` are required. A missing `category`
/// resets to `No category`, a missing `favorite` to false, a missing `url`
/// clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub category: Option<Category>,
    pub url: Option<String>,
    pub favorite: Option<bool>,
}

// =============================================================================
// Card Models
// =============================================================================

/// Card network.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    Discover,
    #[serde(rename = "Diners Club")]
    DinersClub,
    #[serde(rename = "JCB")]
    Jcb,
    UnionPay,
    RuPay,
    #[default]
    Other,
}

/// A payment card with its secrets decrypted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Card {
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

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCardRequest {
    pub name: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_number: Option<String>,
    pub expired_month: Option<String>,
    pub expired_year: Option<String>,
    pub card_code: Option<String>,
    pub brand: Option<CardBrand>,
    pub favorite: Option<bool>,
}

/// Full replacement of a card's editable fields.
///
/// All text fields are required. A missing `brand` resets to `Other`; a
/// missing `favorite` keeps the stored flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCardRequest {
    pub name: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_number: Option<String>,
    pub expired_month: Option<String>,
    pub expired_year: Option<String>,
    pub card_code: Option<String>,
    pub brand: Option<CardBrand>,
    pub favorite: Option<bool>,
}
