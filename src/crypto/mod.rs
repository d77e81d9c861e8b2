// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Field Encryption
//!
//! Every sensitive field (item usernames and passwords, card numbers, codes
//! and expiry) is encrypted individually before it reaches storage and
//! decrypted individually before it leaves a handler.
//!
//! ## Scheme
//!
//! - Key: `SHA-256(ENCRYPTION_KEY)`, derived once at startup
//! - Cipher: AES-256 in CTR mode, 128-bit big-endian counter
//! - IV: 16 random bytes, fresh for every `encrypt` call
//! - Envelope: `hex(iv) ":" hex(ciphertext)`
//!
//! ## Security Note
//!
//! The envelope carries no authentication tag. Modified ciphertext decrypts
//! to different bytes (or fails UTF-8 validation) instead of being rejected.

pub mod codec;
pub mod envelope;

pub use codec::{CryptoError, FieldCodec};
pub use envelope::{Envelope, IV_LEN};
