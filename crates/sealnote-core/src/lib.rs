//! # SealNote Core
//!
//! Core library for SealNote - a desktop sticky note whose single note is
//! encrypted at rest.
//!
//! The crate seals note text into an authenticated envelope string, opens it
//! again, and keeps plaintext and key material alive for as short a time as
//! it can. Window management and IPC belong to the shell that embeds it.
//!
//! ## Architecture
//!
//! - **crypto**: key material, key providers, scrubbing
//! - **codec**: `SecureNoteCodec` and the envelope format
//! - **config**: TOML configuration and key-source selection
//! - **security**: keyfiles, OS keychain, random source
//! - **storage**: envelope persistence backends
//! - **vault**: codec + store for the one note
//!
//! ## Example
//!
//! ```
//! use sealnote_core::{KeyMaterial, SecureNoteCodec, StaticKeyProvider};
//!
//! let codec = SecureNoteCodec::new(StaticKeyProvider::new(KeyMaterial::generate().unwrap()));
//! let envelope = codec.seal_text("hello world".to_string()).unwrap();
//! let note = codec.open(&envelope).unwrap();
//! assert_eq!(note.as_str().unwrap(), "hello world");
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod security;
pub mod storage;
pub mod vault;

pub use codec::{Envelope, SecureNoteCodec};
pub use config::{KeySource, SealNoteConfig};
pub use crypto::{scrub, KeyMaterial, KeyProvider, Plaintext, ScrubGuard, StaticKeyProvider};
pub use error::{ErrorKind, Result, SealNoteError};
pub use storage::{EnvelopeStore, FileEnvelopeStore, MemoryEnvelopeStore};
pub use vault::NoteVault;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
