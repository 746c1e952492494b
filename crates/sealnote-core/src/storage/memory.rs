//! In-process envelope store.

use std::sync::Mutex;

use crate::codec::Envelope;
use crate::error::{Result, SealNoteError};
use crate::storage::traits::EnvelopeStore;

/// Keeps the envelope in memory. For tests and shells that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryEnvelopeStore {
    slot: Mutex<Option<Envelope>>,
}

impl MemoryEnvelopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Envelope>>> {
        self.slot
            .lock()
            .map_err(|_| SealNoteError::Storage("Envelope store poisoned".to_string()))
    }
}

impl EnvelopeStore for MemoryEnvelopeStore {
    fn save(&self, envelope: &Envelope) -> Result<()> {
        *self.lock()? = Some(envelope.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Envelope>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces_previous() {
        let store = MemoryEnvelopeStore::new();
        store.save(&Envelope::new("sn1:first")).unwrap();
        store.save(&Envelope::new("sn1:second")).unwrap();

        assert_eq!(store.load().unwrap(), Some(Envelope::new("sn1:second")));
    }

    #[test]
    fn test_clear() {
        let store = MemoryEnvelopeStore::new();
        store.save(&Envelope::new("sn1:x")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
