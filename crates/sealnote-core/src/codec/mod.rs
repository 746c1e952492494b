//! Sealing and opening the note.
//!
//! [`SecureNoteCodec`] is a pure transform: no I/O, no state between calls.
//! Every `seal` draws a fresh random nonce, so concurrent calls on one codec
//! never share nonce or plaintext buffers.

pub mod envelope;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use crate::crypto::{self, KeyProvider, Plaintext, ScrubGuard};
use crate::error::{Result, SealNoteError};
use crate::security;

pub use envelope::{Envelope, ENVELOPE_PREFIX, MIN_PAYLOAD_LEN, NONCE_LEN, TAG_LEN};

/// Encrypts note plaintext into [`Envelope`]s and back.
#[derive(Debug, Clone)]
pub struct SecureNoteCodec<P> {
    provider: P,
}

impl<P: KeyProvider> SecureNoteCodec<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Seal `plaintext` into an envelope.
    ///
    /// The caller's buffer is overwritten with zeros before this returns,
    /// whether sealing succeeded or not.
    ///
    /// # Errors
    ///
    /// - `SealNoteError::Configuration` if the provider has no key
    /// - `SealNoteError::Encryption` if the cipher or random source fails
    pub fn seal(&self, plaintext: &mut [u8]) -> Result<Envelope> {
        let guard = ScrubGuard::new(plaintext);
        self.seal_bytes(&guard)
    }

    /// Seal editor text, consuming it. The string's bytes are wiped on return.
    pub fn seal_text(&self, text: String) -> Result<Envelope> {
        let mut bytes = Zeroizing::new(text.into_bytes());
        self.seal(&mut bytes)
    }

    /// Seal an already-owned [`Plaintext`], e.g. to re-encrypt an opened note.
    pub fn seal_plaintext(&self, plaintext: &Plaintext) -> Result<Envelope> {
        self.seal_bytes(plaintext.as_bytes())
    }

    /// Open an envelope produced by [`seal`](Self::seal).
    ///
    /// Opening is idempotent: the same envelope always yields the same bytes.
    ///
    /// # Errors
    ///
    /// - `SealNoteError::MalformedEnvelope` if the envelope cannot be parsed
    /// - `SealNoteError::Integrity` if the tag does not verify; no plaintext
    ///   is produced on this path
    pub fn open(&self, envelope: &Envelope) -> Result<Plaintext> {
        let parts = envelope::decode(envelope)?;
        let cipher = self.cipher()?;

        let plaintext = cipher
            .decrypt(
                XNonce::from_slice(&parts.nonce),
                Payload {
                    msg: &parts.sealed,
                    aad: ENVELOPE_PREFIX.as_bytes(),
                },
            )
            .map_err(|_| {
                log::warn!("Note envelope failed authentication");
                SealNoteError::Integrity
            })?;

        log::debug!("Opened note envelope ({} bytes)", plaintext.len());
        Ok(Plaintext::new(plaintext))
    }

    /// Overwrite every byte of `buffer` with zero.
    ///
    /// For buffers the UI layer holds after displaying a note.
    pub fn scrub(buffer: &mut [u8]) {
        crypto::scrub(buffer);
    }

    fn seal_bytes(&self, plaintext: &[u8]) -> Result<Envelope> {
        let cipher = self.cipher()?;

        let mut nonce = [0u8; NONCE_LEN];
        security::fill_random(&mut nonce)?;

        let sealed = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: ENVELOPE_PREFIX.as_bytes(),
                },
            )
            .map_err(|e| SealNoteError::Encryption(format!("Cipher rejected input: {}", e)))?;

        let envelope = envelope::encode(&nonce, &sealed);
        log::debug!(
            "Sealed note ({} bytes) into envelope of {} chars",
            plaintext.len(),
            envelope.len()
        );
        Ok(envelope)
    }

    fn cipher(&self) -> Result<XChaCha20Poly1305> {
        let key = self.provider.get_key()?;
        XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| SealNoteError::Encryption(format!("Cipher rejected key: {}", e)))
    }
}
