// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated caller representation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::RecordId;

/// Identity of the caller, resolved from a live server-side session.
///
/// Handlers receive this explicitly through the `Auth` extractor; nothing
/// reads the session from ambient request state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionIdentity {
    /// User the session was created for.
    pub user_id: RecordId,

    /// Opaque session id (cookie value). Never serialized.
    #[serde(skip)]
    pub session_id: String,
}

impl SessionIdentity {
    pub fn new(user_id: RecordId, session_id: impl Into<String>) -> Self {
        Self {
            user_id,
            session_id: session_id.into(),
        }
    }

    /// Whether this caller is the given user.
    pub fn is(&self, user_id: &RecordId) -> bool {
        &self.user_id == user_id
    }
}
