// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session-cookie authentication for the Vaultkeep API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email and password (`POST /v1/users/login`)
//! 2. Server verifies the Argon2 hash, creates a server-side session and
//!    returns it in an `HttpOnly` `sid` cookie
//! 3. Every protected handler takes an `Auth` extractor, which resolves the
//!    cookie to a [`SessionIdentity`] or rejects with 401
//! 4. Logout and password change destroy the session
//!
//! ## Security
//!
//! - All item, card and profile endpoints require a session
//! - Session expiry is rolling (default one hour of inactivity)
//! - Missing session (401) is reported separately from "not yours" (403)

pub mod cookie;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod password;
pub mod session;

pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use identity::SessionIdentity;
pub use session::SessionStore;
