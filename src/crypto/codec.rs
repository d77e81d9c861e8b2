// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-256-CTR codec for individual string fields.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use super::envelope::{Envelope, IV_LEN};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Errors raised while deriving the key or opening an envelope.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("encryption secret must not be empty")]
    EmptySecret,

    #[error("envelope is not of the form <iv>:<ciphertext>")]
    Malformed,

    #[error("envelope is not valid hex: {0}")]
    InvalidHex(#[source] hex::FromHexError),

    #[error("envelope IV must be 16 bytes, got {0}")]
    InvalidIvLength(usize),

    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}

/// Field codec holding the process-wide derived key.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct FieldCodec {
    key: [u8; 32],
}

impl FieldCodec {
    /// Derive the key from the configured secret.
    ///
    /// # Errors
    /// Returns `CryptoError::EmptySecret` for an empty secret.
    pub fn from_secret(secret: &str) -> Result<Self, CryptoError> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }

        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Ok(Self { key })
    }

    /// Encrypt a field under a freshly generated IV.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buf = plaintext.as_bytes().to_vec();
        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut buf);

        Envelope::new(iv, buf).to_string()
    }

    /// Decrypt a stored envelope back to the plaintext field.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let Envelope { iv, mut ciphertext } = Envelope::parse(encoded)?;

        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut ciphertext);

        String::from_utf8(ciphertext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FieldCodec {
        FieldCodec::from_secret("test-deployment-secret").unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            FieldCodec::from_secret(""),
            Err(CryptoError::EmptySecret)
        ));
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let codec = codec();
        for plaintext in ["", "alice", "s3cret", "4111 1111 1111 1111", "pässwörd ✓"] {
            let envelope = codec.encrypt(plaintext);
            assert_eq!(codec.decrypt(&envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn envelope_shape() {
        let envelope = codec().encrypt("s3cret");
        let (iv, ct) = envelope.split_once(':').unwrap();
        assert_eq!(iv.len(), IV_LEN * 2);
        // CTR keeps the plaintext length.
        assert_eq!(ct.len(), "s3cret".len() * 2);
        assert!(!envelope.contains("s3cret"));
    }

    #[test]
    fn same_plaintext_gives_different_envelopes() {
        let codec = codec();
        let first = codec.encrypt("same-value");
        let second = codec.encrypt("same-value");

        assert_ne!(first, second);
        assert_eq!(codec.decrypt(&first).unwrap(), "same-value");
        assert_eq!(codec.decrypt(&second).unwrap(), "same-value");
    }

    #[test]
    fn known_vector_matches_aes_256_ctr() {
        // NIST SP 800-38A F.5.5, first block.
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let codec = FieldCodec {
            key: key.try_into().unwrap(),
        };
        let iv = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap();
        let ct = hex::decode("601ec313775789a5b7a7f504bbf3d228").unwrap();
        let envelope = format!("{}:{}", hex::encode(&iv), hex::encode(&ct));

        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mut cipher = Aes256Ctr::new(&codec.key.into(), iv.as_slice().into());
        let mut buf = ct.clone();
        cipher.apply_keystream(&mut buf);
        assert_eq!(buf, pt);

        // Non-UTF-8 plaintext surfaces as an error, not as lossy text.
        assert!(matches!(
            codec.decrypt(&envelope),
            Err(CryptoError::InvalidUtf8)
        ));
    }

    #[test]
    fn tampered_ciphertext_never_yields_original() {
        let codec = codec();
        let envelope = codec.encrypt("s3cret-password");
        let (iv, ct) = envelope.split_once(':').unwrap();

        for pos in 0..ct.len() {
            let mut chars: Vec<char> = ct.chars().collect();
            chars[pos] = if chars[pos] == '0' { '1' } else { '0' };
            let tampered = format!("{iv}:{}", chars.into_iter().collect::<String>());

            if let Ok(plaintext) = codec.decrypt(&tampered) {
                assert_ne!(plaintext, "s3cret-password");
            }
        }
    }

    #[test]
    fn wrong_key_does_not_recover_plaintext() {
        let envelope = codec().encrypt("s3cret");
        let other = FieldCodec::from_secret("another-secret").unwrap();

        match other.decrypt(&envelope) {
            Ok(plaintext) => assert_ne!(plaintext, "s3cret"),
            Err(e) => assert!(matches!(e, CryptoError::InvalidUtf8)),
        }
    }

    #[test]
    fn swapped_iv_does_not_recover_plaintext() {
        let codec = codec();
        let first = codec.encrypt("first-secret");
        let second = codec.encrypt("other-secret");

        let (iv_a, _) = first.split_once(':').unwrap();
        let (_, ct_b) = second.split_once(':').unwrap();
        let mixed = format!("{iv_a}:{ct_b}");

        match codec.decrypt(&mixed) {
            Ok(plaintext) => assert_ne!(plaintext, "other-secret"),
            Err(e) => assert!(matches!(e, CryptoError::InvalidUtf8)),
        }
    }

    #[test]
    fn malformed_envelopes_fail() {
        let codec = codec();
        assert!(matches!(
            codec.decrypt("not-an-envelope"),
            Err(CryptoError::Malformed)
        ));
        assert!(matches!(
            codec.decrypt("abcd:0011"),
            Err(CryptoError::InvalidIvLength(2))
        ));
        assert!(matches!(
            codec.decrypt("plain:text"),
            Err(CryptoError::InvalidHex(_))
        ));
    }
}
