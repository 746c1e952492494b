//! The single encrypted note: codec plus store.
//!
//! `NoteVault` is what an editor shell holds. Edit events call
//! [`NoteVault::save_text`], load events call [`NoteVault::load`]. Errors are
//! returned as-is; whether a failed load shows an empty editor or a banner is
//! the shell's call.

use crate::codec::SecureNoteCodec;
use crate::crypto::{KeyProvider, Plaintext};
use crate::error::Result;
use crate::storage::EnvelopeStore;

#[derive(Debug)]
pub struct NoteVault<P, S> {
    codec: SecureNoteCodec<P>,
    store: S,
}

impl<P: KeyProvider, S: EnvelopeStore> NoteVault<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self {
            codec: SecureNoteCodec::new(provider),
            store,
        }
    }

    pub fn codec(&self) -> &SecureNoteCodec<P> {
        &self.codec
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Seal editor text and persist it. The text is wiped either way.
    pub fn save_text(&self, text: String) -> Result<()> {
        let envelope = self.codec.seal_text(text)?;
        self.store.save(&envelope)
    }

    /// Seal and persist a caller buffer, which is zeroed before return.
    pub fn save_bytes(&self, plaintext: &mut [u8]) -> Result<()> {
        let envelope = self.codec.seal(plaintext)?;
        self.store.save(&envelope)
    }

    /// Load and open the note. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Plaintext>> {
        match self.store.load()? {
            Some(envelope) => self.codec.open(&envelope).map(Some),
            None => Ok(None),
        }
    }

    /// Delete the persisted note.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
