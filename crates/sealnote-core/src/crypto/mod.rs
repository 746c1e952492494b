//! Key handling and plaintext hygiene for SealNote.
//!
//! Built on well-audited libraries:
//! - **XChaCha20-Poly1305** (via the codec): authenticated encryption
//! - **Argon2id**: memory-hard passphrase key derivation
//! - **zeroize**: volatile wiping of keys and plaintext
//!
//! ## Security Model
//!
//! - One 256-bit key per installation, injected through a [`KeyProvider`]
//! - Key material and recovered plaintext are zeroized on drop
//! - Caller plaintext is scrubbed on every exit path of `seal`
//! - Keys, passphrases, and plaintext never reach logs or error messages
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the encrypted note file
//! - Tampering with the persisted envelope
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Inspection of a running process's memory

pub mod key;
pub mod passphrase;
pub mod scrub;

pub use key::{
    derive_key, KeyMaterial, KeyProvider, StaticKeyProvider, DEFAULT_KEY_ENV,
    DEFAULT_PASSPHRASE_ENV, KEY_LENGTH,
};
pub use passphrase::validate_passphrase;
pub use scrub::{scrub, Plaintext, ScrubGuard};
