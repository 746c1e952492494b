//! Single-file envelope store.

use std::path::{Path, PathBuf};

use crate::codec::Envelope;
use crate::error::{Result, SealNoteError};
use crate::fs::write_atomic;
use crate::storage::traits::EnvelopeStore;

/// Stores the envelope as the entire contents of one file.
#[derive(Debug, Clone)]
pub struct FileEnvelopeStore {
    path: PathBuf,
}

impl FileEnvelopeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EnvelopeStore for FileEnvelopeStore {
    fn save(&self, envelope: &Envelope) -> Result<()> {
        write_atomic(&self.path, envelope.as_str().as_bytes()).map_err(|e| {
            SealNoteError::Storage(format!("Failed to write note {}: {}", self.path.display(), e))
        })?;
        log::debug!("Saved note envelope to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Envelope>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SealNoteError::Storage(format!(
                    "Failed to read note {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        let encoded = String::from_utf8(bytes).map_err(|_| {
            SealNoteError::MalformedEnvelope(format!(
                "{} is not a text envelope",
                self.path.display()
            ))
        })?;
        Ok(Some(Envelope::new(encoded)))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SealNoteError::Storage(format!(
                "Failed to remove note {}: {}",
                self.path.display(),
                err
            ))),
        }
    }
}
