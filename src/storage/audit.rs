// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Account events, every item and card mutation, and refused ownership
//! checks are appended to a daily JSONL file under `audit/`. Secret field
//! values are never written to the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JsonStorage, StorageError, StorageResult};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    UserSignedUp,
    LoginSucceeded,
    LoginFailed,
    LoggedOut,
    ProfileUpdated,
    PasswordChanged,

    // Item events
    ItemCreated,
    ItemUpdated,
    ItemDeleted,

    // Card events
    CardCreated,
    CardUpdated,
    CardDeleted,

    PermissionDenied,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    /// User who triggered the event (if known).
    pub user_id: Option<String>,
    /// Resource affected (item or card id).
    pub resource_id: Option<String>,
    /// Resource type ("item", "card").
    pub resource_type: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            success: true,
            error: None,
        }
    }

    pub fn with_user(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_resource(mut self, resource_type: impl Into<String>, resource_id: impl ToString) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.to_string());
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> AuditRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Log an audit event.
    ///
    /// Events are appended to a daily log file in JSONL format.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().audit_events_file(&date);
        let line = serde_json::to_string(event)?;
        self.storage.append_line(path, &line)
    }

    /// Read audit events for a specific date. A day without events is empty.
    pub fn read_events(&self, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let path = self.storage.paths().audit_events_file(date);
        let content = match self.storage.read_to_string(path) {
            Ok(content) => content,
            Err(StorageError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StorageError::from))
            .collect()
    }
}

/// Helper macro for logging audit events.
///
/// Audit failures are logged and never fail the request.
#[macro_export]
macro_rules! audit_log {
    ($storage:expr, $event:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        if let Err(e) = repo.log(&$event) {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
    }};
    ($storage:expr, $event_type:expr, $identity:expr) => {
        $crate::audit_log!(
            $storage,
            $crate::storage::AuditEvent::new($event_type).with_user(&$identity.user_id)
        )
    };
    ($storage:expr, $event_type:expr, $identity:expr, $resource_type:expr, $resource_id:expr) => {
        $crate::audit_log!(
            $storage,
            $crate::storage::AuditEvent::new($event_type)
                .with_user(&$identity.user_id)
                .with_resource($resource_type, &$resource_id)
        )
    };
}
