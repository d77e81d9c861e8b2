// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::FromRequest,
    http::header::HeaderName,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    audit_log,
    auth::cookie::SESSION_COOKIE,
    error::{ApiError, ErrorBody},
    models::{
        Card, CardBrand, Category, ChangePasswordRequest, CreateCardRequest, CreateItemRequest,
        Item, LoginRequest, RecordId, SignupRequest, UpdateCardRequest, UpdateItemRequest,
        UpdateProfileRequest, UserProfile,
    },
    state::AppState,
    storage::{AccessError, AuditEvent, AuditEventType, JsonStorage},
};

pub mod cards;
pub mod health;
pub mod items;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// JSON body extractor whose rejections use the [`ApiError`] body shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Take a required text field, rejecting absent or blank values.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(format!("{field} is required"))),
    }
}

/// Record refused ownership checks in the audit log, passing the result on.
pub(crate) fn audit_denied<T>(
    storage: &JsonStorage,
    result: Result<T, AccessError>,
) -> Result<T, AccessError> {
    if let Err(AccessError::NotOwner { kind, id, user_id }) = &result {
        audit_log!(
            storage,
            AuditEvent::new(AuditEventType::PermissionDenied)
                .with_user(user_id)
                .with_resource(kind.to_lowercase(), id)
                .failed("not owner")
        );
    }
    result
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/{item_id}",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/cards", get(cards::list_cards).post(cards::create_card))
        .route(
            "/cards/{card_id}",
            get(cards::get_card)
                .patch(cards::update_card)
                .delete(cards::delete_card),
        )
        .route("/users/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/logout", post(users::logout))
        .route(
            "/users/me",
            get(users::get_current_user).patch(users::update_profile),
        )
        .route("/users/me/password", patch(users::change_password));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .fallback(route_not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        cards::list_cards,
        cards::get_card,
        cards::create_card,
        cards::update_card,
        cards::delete_card,
        users::signup,
        users::login,
        users::logout,
        users::get_current_user,
        users::update_profile,
        users::change_password,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            RecordId,
            Item,
            Category,
            CreateItemRequest,
            UpdateItemRequest,
            Card,
            CardBrand,
            CreateCardRequest,
            UpdateCardRequest,
            UserProfile,
            SignupRequest,
            LoginRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            ErrorBody,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "Items", description = "Saved logins"),
        (name = "Cards", description = "Payment cards"),
        (name = "Users", description = "Accounts and sessions"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;
