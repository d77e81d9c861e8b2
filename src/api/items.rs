// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item (saved login) endpoints.
//!
//! All operations require a session. Single-item operations go through the
//! ownership guard; the list is filtered by owner in the query.

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
    models::{CreateItemRequest, Item, UpdateItemRequest},
    state::AppState,
    storage::{AccessError, AuditEventType, ItemFields, ItemRepository, OwnershipGuard, StoredItem},
};

const KIND: &str = "Item";

fn item_fields(
    name: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String, String), ApiError> {
    Ok((
        required(name, "name")?,
        required(username, "username")?,
        required(password, "password")?,
    ))
}

/// List the caller's items with secrets decrypted.
#[utoipa::path(
    get,
    path = "/v1/items",
    tag = "Items",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Caller's items", body = [Item]),
        (status = 401, description = "No session"),
    )
)]
pub async fn list_items(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let repo = ItemRepository::new(state.storage());
    let items = repo
        .list_by_owner(&identity.user_id)?
        .iter()
        .map(|item| item.reveal(state.codec()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item identifier")),
    tag = "Items",
    security(("session_cookie" = [])),
    responses(
        (status = 200, body = Item),
        (status = 400, description = "Invalid item id", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    )
)]
pub async fn get_item(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let repo = ItemRepository::new(state.storage());
    let guard = OwnershipGuard::new(&identity);
    let item: StoredItem = audit_denied(
        state.storage(),
        guard.resolve(&item_id, |id| repo.find(id)),
    )?;

    Ok(Json(item.reveal(state.codec())?))
}

#[utoipa::path(
    post,
    path = "/v1/items",
    request_body = CreateItemRequest,
    tag = "Items",
    security(("session_cookie" = [])),
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Missing required field", body = ErrorBody),
        (status = 401, description = "No session"),
    )
)]
pub async fn create_item(
    Auth(identity): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let (name, username, password) =
        item_fields(request.name, request.username, request.password)?;

    let fields = ItemFields {
        name,
        username,
        password,
        category: request.category.unwrap_or_default(),
        url: request.url,
        favorite: request.favorite.unwrap_or(false),
    };
    let item = StoredItem::seal(identity.user_id, fields, state.codec());
    ItemRepository::new(state.storage()).create(&item)?;

    audit_log!(state.storage(), AuditEventType::ItemCreated, identity, "item", item.id);
    tracing::info!(item_id = %item.id, user_id = %identity.user_id, "Item created");

    Ok((StatusCode::CREATED, Json(item.reveal(state.codec())?)))
}

/// Replace an item's fields.
///
/// `name`, `username` and `password` are required. Absent `category` resets
/// to `No category`, absent `favorite` to false, absent `url` clears it.
#[utoipa::path(
    patch,
    path = "/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item identifier")),
    request_body = UpdateItemRequest,
    tag = "Items",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Invalid id or missing field", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    )
)]
pub async fn update_item(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let id = OwnershipGuard::parse_id(KIND, &item_id)?;
    let (name, username, password) =
        item_fields(request.name, request.username, request.password)?;
    let fields = ItemFields {
        name,
        username,
        password,
        category: request.category.unwrap_or_default(),
        url: request.url,
        favorite: request.favorite.unwrap_or(false),
    };

    let repo = ItemRepository::new(state.storage());
    let guard = OwnershipGuard::new(&identity);
    let mut item: StoredItem = audit_denied(state.storage(), guard.fetch(&id, |id| repo.find(id)))?;

    item.overwrite(fields, state.codec());
    repo.update(&item)
        .map_err(AccessError::on_write(KIND, item.id))?;

    audit_log!(state.storage(), AuditEventType::ItemUpdated, identity, "item", item.id);

    Ok(Json(item.reveal(state.codec())?))
}

#[utoipa::path(
    delete,
    path = "/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item identifier")),
    tag = "Items",
    security(("session_cookie" = [])),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Invalid item id", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 403, description = "Item belongs to another user", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    )
)]
pub async fn delete_item(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = ItemRepository::new(state.storage());
    let guard = OwnershipGuard::new(&identity);
    let item: StoredItem = audit_denied(
        state.storage(),
        guard.resolve(&item_id, |id| repo.find(id)),
    )?;

    repo.delete(&item.id)
        .map_err(AccessError::on_write(KIND, item.id))?;

    audit_log!(state.storage(), AuditEventType::ItemDeleted, identity, "item", item.id);

    Ok(StatusCode::NO_CONTENT)
}
