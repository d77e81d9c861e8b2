// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Serialized form of one encrypted field.

use std::fmt;

use super::CryptoError;

/// IV length required by AES-CTR (one cipher block).
pub const IV_LEN: usize = 16;

/// Separator between the hex IV and the hex ciphertext.
const SEPARATOR: char = ':';

/// An `(iv, ciphertext)` pair as stored in place of a plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self { iv, ciphertext }
    }

    /// Parse `hex(iv):hex(ciphertext)`.
    ///
    /// Splits on the first separator only; a second `:` ends up in the
    /// ciphertext half and fails hex decoding.
    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let (iv_hex, ct_hex) = encoded
            .split_once(SEPARATOR)
            .ok_or(CryptoError::Malformed)?;

        let iv_bytes = hex::decode(iv_hex).map_err(CryptoError::InvalidHex)?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidIvLength(iv_bytes.len()))?;
        let ciphertext = hex::decode(ct_hex).map_err(CryptoError::InvalidHex)?;

        Ok(Self { iv, ciphertext })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            hex::encode(self.iv),
            hex::encode(&self.ciphertext)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_hex_pair() {
        let envelope = Envelope::new([0xab; IV_LEN], vec![0x01, 0xff]);
        assert_eq!(
            envelope.to_string(),
            "abababababababababababababababab:01ff"
        );
    }

    #[test]
    fn parse_reads_what_display_writes() {
        let envelope = Envelope::new([7; IV_LEN], b"opaque".to_vec());
        let parsed = Envelope::parse(&envelope.to_string()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn parse_accepts_empty_ciphertext() {
        let parsed = Envelope::parse(&format!("{}:", "00".repeat(IV_LEN))).unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let result = Envelope::parse("00112233445566778899aabbccddeeff");
        assert!(matches!(result, Err(CryptoError::Malformed)));
    }

    #[test]
    fn parse_rejects_bad_hex() {
        let result = Envelope::parse("zz:00");
        assert!(matches!(result, Err(CryptoError::InvalidHex(_))));

        let iv = "00".repeat(IV_LEN);
        let result = Envelope::parse(&format!("{iv}:0g"));
        assert!(matches!(result, Err(CryptoError::InvalidHex(_))));
    }

    #[test]
    fn parse_rejects_extra_separator() {
        let iv = "00".repeat(IV_LEN);
        let result = Envelope::parse(&format!("{iv}:00:11"));
        assert!(matches!(result, Err(CryptoError::InvalidHex(_))));
    }

    #[test]
    fn parse_rejects_short_iv() {
        let result = Envelope::parse("0011:aabb");
        assert!(matches!(result, Err(CryptoError::InvalidIvLength(2))));
    }
}
