//! Plaintext scrubbing.
//!
//! Scrubbing is tied to scope: [`ScrubGuard`] wipes a borrowed buffer when it
//! goes out of scope and [`Plaintext`] wipes its own allocation on drop, so an
//! early `?` return or a panic unwind cannot skip the overwrite.
//!
//! # Limitations
//!
//! This is best effort. Copies made before the bytes reached us (editor
//! widgets, IPC buffers, a `Vec` that reallocated while growing) are out of
//! reach, and swap or core dumps are not addressed.

use std::fmt;
use std::ops::{Deref, DerefMut};

use zeroize::{Zeroize, Zeroizing};

use crate::error::{Result, SealNoteError};

/// Overwrite every byte of `buffer` with zero.
///
/// Uses volatile writes so the compiler cannot elide the store.
pub fn scrub(buffer: &mut [u8]) {
    buffer.zeroize();
}

/// Borrow of a plaintext buffer that is scrubbed when the guard drops.
pub struct ScrubGuard<'a> {
    buffer: &'a mut [u8],
}

impl<'a> ScrubGuard<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }
}

impl Deref for ScrubGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer
    }
}

impl DerefMut for ScrubGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer
    }
}

impl Drop for ScrubGuard<'_> {
    fn drop(&mut self) {
        scrub(self.buffer);
    }
}

/// Recovered note bytes. Zeroized on drop; `Debug` never prints the content.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Plaintext {
    bytes: Zeroizing<Vec<u8>>,
}

impl Plaintext {
    /// Take ownership of `bytes`; the allocation is wiped when this value drops.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// View the note as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|_| SealNoteError::InvalidInput("Note is not valid UTF-8".to_string()))
    }
}

impl From<String> for Plaintext {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

impl From<Vec<u8>> for Plaintext {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Plaintext {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plaintext")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_empty_buffer() {
        let mut buffer: [u8; 0] = [];
        scrub(&mut buffer);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_scrub_single_byte() {
        let mut buffer = [0xFFu8];
        scrub(&mut buffer);
        assert_eq!(buffer, [0u8]);
    }

    #[test]
    fn test_scrub_large_buffer() {
        let mut buffer = vec![0xA5u8; 1024 * 1024];
        scrub(&mut buffer);
        assert_eq!(buffer.len(), 1024 * 1024);
        assert!(buffer.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_guard_scrubs_on_drop() {
        let mut buffer = *b"hello world";
        {
            let guard = ScrubGuard::new(&mut buffer);
            assert_eq!(&guard[..], b"hello world");
        }
        assert!(buffer.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_guard_scrubs_on_early_return() {
        fn fails(buffer: &mut [u8]) -> Result<()> {
            let _guard = ScrubGuard::new(buffer);
            Err(SealNoteError::InvalidInput("bail".to_string()))
        }

        let mut buffer = *b"secret";
        assert!(fails(&mut buffer).is_err());
        assert_eq!(buffer, [0u8; 6]);
    }

    #[test]
    fn test_guard_scrubs_on_panic() {
        let mut buffer = *b"secret";
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScrubGuard::new(&mut buffer);
            panic!("editor crashed");
        }));
        assert!(result.is_err());
        assert_eq!(buffer, [0u8; 6]);
    }

    #[test]
    fn test_plaintext_debug_redacts() {
        let plaintext = Plaintext::from("top secret".to_string());
        let debug_output = format!("{:?}", plaintext);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("top secret"));
    }

    #[test]
    fn test_plaintext_as_str() {
        assert_eq!(Plaintext::from("note".to_string()).as_str().unwrap(), "note");
        assert!(Plaintext::new(vec![0xFF, 0xFE]).as_str().is_err());
    }
}
