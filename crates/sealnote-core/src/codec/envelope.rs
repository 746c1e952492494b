//! Envelope wire format.
//!
//! ```text
//! sn1:<base64(nonce[24] || ciphertext || tag[16])>
//! ```
//!
//! `sn1:` names format version 1: XChaCha20-Poly1305 with a random 24-byte
//! nonce. The prefix is also the AEAD associated data, so a ciphertext cannot
//! be replayed under a different format label. Base64 is the standard
//! alphabet with canonical padding.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SealNoteError};

/// Format label and associated data for version 1 envelopes.
pub const ENVELOPE_PREFIX: &str = "sn1:";

/// XChaCha20 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest valid payload: the envelope of an empty note.
pub const MIN_PAYLOAD_LEN: usize = NONCE_LEN + TAG_LEN;

/// An encrypted note as persisted by the storage backend.
///
/// Opaque to everything but the codec; structure is only checked on open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(String);

impl Envelope {
    /// Wrap a string read back from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Build an envelope around raw `nonce || ciphertext || tag` bytes.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self(format!("{}{}", ENVELOPE_PREFIX, STANDARD.encode(payload)))
    }

    /// Decode the raw `nonce || ciphertext || tag` bytes.
    pub fn payload(&self) -> Result<Vec<u8>> {
        let encoded = self.0.strip_prefix(ENVELOPE_PREFIX).ok_or_else(|| {
            SealNoteError::MalformedEnvelope("unrecognized format prefix".to_string())
        })?;
        let payload = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| SealNoteError::MalformedEnvelope(format!("base64 decode: {}", e)))?;
        if payload.len() < MIN_PAYLOAD_LEN {
            return Err(SealNoteError::MalformedEnvelope(format!(
                "payload is {} bytes, expected at least {}",
                payload.len(),
                MIN_PAYLOAD_LEN
            )));
        }
        Ok(payload)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Envelope {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

impl FromStr for Envelope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded envelope fields.
pub(crate) struct EnvelopeParts {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the tag.
    pub sealed: Vec<u8>,
}

pub(crate) fn encode(nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Envelope {
    let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(sealed);
    Envelope::from_payload(&payload)
}

pub(crate) fn decode(envelope: &Envelope) -> Result<EnvelopeParts> {
    let mut payload = envelope.payload()?;
    let sealed = payload.split_off(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&payload);
    Ok(EnvelopeParts { nonce, sealed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let nonce = [1u8; NONCE_LEN];
        let sealed = [2u8; TAG_LEN + 3];
        let envelope = encode(&nonce, &sealed);

        assert!(envelope.as_str().starts_with(ENVELOPE_PREFIX));
        let payload = envelope.payload().unwrap();
        assert_eq!(&payload[..NONCE_LEN], &nonce);
        assert_eq!(&payload[NONCE_LEN..], &sealed);
    }

    #[test]
    fn test_decode_splits_fields() {
        let nonce = [9u8; NONCE_LEN];
        let sealed = vec![4u8; TAG_LEN];
        let parts = decode(&encode(&nonce, &sealed)).unwrap();

        assert_eq!(parts.nonce, nonce);
        assert_eq!(parts.sealed, sealed);
    }

    #[test]
    fn test_missing_prefix_is_malformed() {
        let err = Envelope::new("gAAAAABlegacyfernettoken").payload().unwrap_err();
        assert!(matches!(err, SealNoteError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_bad_base64_is_malformed() {
        let err = Envelope::new("sn1:!!not base64!!").payload().unwrap_err();
        assert!(matches!(err, SealNoteError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let short = Envelope::from_payload(&[0u8; MIN_PAYLOAD_LEN - 1]);
        let err = decode(&short).err().unwrap();
        assert!(err.to_string().contains("expected at least 40"));
    }

    #[test]
    fn test_empty_string_is_malformed() {
        assert!(Envelope::new("").payload().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        #[derive(Serialize, Deserialize)]
        struct Stored {
            note: Envelope,
        }

        let stored = Stored {
            note: Envelope::new("sn1:AAAA"),
        };
        let text = toml::to_string(&stored).unwrap();
        assert_eq!(text.trim(), r#"note = "sn1:AAAA""#);

        let back: Stored = toml::from_str(&text).unwrap();
        assert_eq!(back.note, stored.note);
    }
}
