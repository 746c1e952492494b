//! Envelope store trait definition.
//!
//! The codec never touches storage. A shell persists the envelope through an
//! `EnvelopeStore` after sealing and hands it back to the codec on load.

use crate::codec::Envelope;
use crate::error::Result;

/// Persistence backend for the single note envelope.
///
/// All implementations must ensure:
/// - `load` returns exactly the string passed to the last `save`
/// - Writes replace the previous envelope atomically where possible
pub trait EnvelopeStore: Send + Sync {
    /// Persist `envelope`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SealNoteError::Storage` if the backend cannot write.
    fn save(&self, envelope: &Envelope) -> Result<()>;

    /// Return the stored envelope, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Envelope>>;

    /// Remove the stored envelope. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
