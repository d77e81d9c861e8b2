// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Vaultkeep - Password Manager Backend
//!
//! Stores saved logins ("items") and payment cards per user. Sensitive
//! fields are encrypted with AES-256-CTR before they reach storage, and
//! every single-record access passes an ownership check against the
//! caller's session.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Cookie sessions and password hashing
//! - `crypto` - Field encryption codec
//! - `storage` - JSON file storage, repositories and ownership guard

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
