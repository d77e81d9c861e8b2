// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the session identity.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is SessionIdentity
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{cookie::session_id_from_headers, AuthError, SessionIdentity};
use crate::state::AppState;

/// Extractor for an authenticated caller.
///
/// Resolves the `sid` cookie against the session store. Resolving also
/// refreshes the session's rolling expiry.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_items(
///     Auth(identity): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Item>>, ApiError> {
///     // identity.user_id is the caller
/// }
/// ```
pub struct Auth(pub SessionIdentity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // An upstream layer may have resolved the session already
        if let Some(identity) = parts.extensions.get::<SessionIdentity>().cloned() {
            return Ok(Auth(identity));
        }

        let session_id =
            session_id_from_headers(&parts.headers).ok_or(AuthError::MissingSession)?;

        let identity = state
            .sessions()
            .resolve(&session_id)
            .await
            .ok_or(AuthError::SessionExpired)?;

        parts.extensions.insert(identity.clone());
        Ok(Auth(identity))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid session is present, instead of rejecting.
pub struct OptionalAuth(pub Option<SessionIdentity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(identity)) => Ok(OptionalAuth(Some(identity))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
