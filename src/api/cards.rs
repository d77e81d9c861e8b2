// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment card endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{audit_denied, required, ApiJson};
use crate::{
    audit_log,
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::{Card, CardBrand, CreateCardRequest, UpdateCardRequest},
    state::AppState,
    storage::{AccessError, AuditEventType, CardFields, CardRepository, OwnershipGuard, StoredCard},
};

const KIND: &str = "Card";

/// Text fields shared by create and update requests.
struct CardInput {
    name: Option<String>,
    card_holder_name: Option<String>,
    card_number: Option<String>,
    expired_month: Option<String>,
    expired_year: Option<String>,
    card_code: Option<String>,
    brand: Option<CardBrand>,
}

impl CardInput {
    fn validate(self) -> Result<CardFields, ApiError> {
        Ok(CardFields {
            name: required(self.name, "name")?,
            card_holder_name: required(self.card_holder_name, "card_holder_name")?,
            card_number: required(self.card_number, "card_number")?,
            expired_month: required(self.expired_month, "expired_month")?,
            expired_year: required(self.expired_year, "expired_year")?,
            card_code: required(self.card_code, "card_code")?,
            brand: self.brand.unwrap_or_default(),
        })
    }
}

#[utoipa::path(
    get,
    path = "/v1/cards",
    tag = "Cards",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Caller's cards", body = [Card]),
        (status = 401, description = "No session"),
    )
)]
pub async fn list_cards(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = CardRepository::new(state.storage())
        .list_by_owner(&identity.user_id)?
        .iter()
        .map(|card| card.reveal(state.codec()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(cards))
}

#[utoipa::path(
    get,
    path = "/v1/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    tag = "Cards",
    security(("session_cookie" = [])),
    responses(
        (status = 200, body = Card),
        (status = 400, description = "Invalid card id", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Card belongs to another user", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    )
)]
pub async fn get_card(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let repo = CardRepository::new(state.storage());
    let card: StoredCard = audit_denied(
        state.storage(),
        OwnershipGuard::new(&identity).resolve(&card_id, |id| repo.find(id)),
    )?;

    Ok(Json(card.reveal(state.codec())?))
}

#[utoipa::path(
    post,
    path = "/v1/cards",
    request_body = CreateCardRequest,
    tag = "Cards",
    security(("session_cookie" = [])),
    responses(
        (status = 201, description = "Card created", body = Card),
        (status = 400, description = "Missing required field", body = ErrorBody),
        (status = 401, description = "No session"),
    )
)]
pub async fn create_card(
    Auth(identity): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let fields = CardInput {
        name: request.name,
        card_holder_name: request.card_holder_name,
        card_number: request.card_number,
        expired_month: request.expired_month,
        expired_year: request.expired_year,
        card_code: request.card_code,
        brand: request.brand,
    }
    .validate()?;

    let card = StoredCard::seal(
        identity.user_id,
        fields,
        request.favorite.unwrap_or(false),
        state.codec(),
    );
    CardRepository::new(state.storage()).create(&card)?;

    audit_log!(state.storage(), AuditEventType::CardCreated, identity, "card", card.id);
    tracing::info!(card_id = %card.id, user_id = %identity.user_id, "Card created");

    Ok((StatusCode::CREATED, Json(card.reveal(state.codec())?)))
}

/// Replace a card's fields.
///
/// All text fields are required. Absent `brand` resets to `Other`; absent
/// `favorite` keeps the stored flag.
#[utoipa::path(
    patch,
    path = "/v1/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    request_body = UpdateCardRequest,
    tag = "Cards",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Card updated", body = Card),
        (status = 400, description = "Invalid id or missing field", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Card belongs to another user", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    )
)]
pub async fn update_card(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    ApiJson(request): ApiJson<UpdateCardRequest>,
) -> Result<Json<Card>, ApiError> {
    let id = OwnershipGuard::parse_id(KIND, &card_id)?;
    let fields = CardInput {
        name: request.name,
        card_holder_name: request.card_holder_name,
        card_number: request.card_number,
        expired_month: request.expired_month,
        expired_year: request.expired_year,
        card_code: request.card_code,
        brand: request.brand,
    }
    .validate()?;

    let repo = CardRepository::new(state.storage());
    let mut card: StoredCard = audit_denied(
        state.storage(),
        OwnershipGuard::new(&identity).fetch(&id, |id| repo.find(id)),
    )?;

    card.overwrite(fields, request.favorite, state.codec());
    repo.update(&card)
        .map_err(AccessError::on_write(KIND, card.id))?;

    audit_log!(state.storage(), AuditEventType::CardUpdated, identity, "card", card.id);

    Ok(Json(card.reveal(state.codec())?))
}

#[utoipa::path(
    delete,
    path = "/v1/cards/{card_id}",
    params(("card_id" = String, Path, description = "Card identifier")),
    tag = "Cards",
    security(("session_cookie" = [])),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 400, description = "Invalid card id", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Card belongs to another user", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody),
    )
)]
pub async fn delete_card(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = CardRepository::new(state.storage());
    let card: StoredCard = audit_denied(
        state.storage(),
        OwnershipGuard::new(&identity).resolve(&card_id, |id| repo.find(id)),
    )?;

    repo.delete(&card.id)
        .map_err(AccessError::on_write(KIND, card.id))?;

    audit_log!(state.storage(), AuditEventType::CardDeleted, identity, "card", card.id);

    Ok(StatusCode::NO_CONTENT)
}
