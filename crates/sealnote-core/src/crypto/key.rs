//! Key material and key providers.
//!
//! The codec never owns a key directly. It asks a [`KeyProvider`] for the
//! active key on every call, which keeps the key source injectable and lets
//! tests run with a distinct key each.
//!
//! Keys are loaded once at startup. A missing or malformed key is a
//! [`SealNoteError::Configuration`] raised by the constructor, so a shell that
//! builds its provider first fails fast instead of mid-session.
//!
//! A single static key shared by every installation is a known weakness:
//! prefer per-installation keys (generated keyfile, passphrase derivation,
//! or the OS keychain) over a key baked into a deployment.

use std::path::Path;
use std::sync::Arc;

use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{KeySource, SealNoteConfig};
use crate::crypto::passphrase::validate_passphrase;
use crate::error::{Result, SealNoteError};
use crate::security;

/// Argon2id parameters.
///
/// - Memory: 64 MB (64 * 1024 KB)
/// - Iterations: 3
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 64 * 1024;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;

/// Minimum salt length accepted for passphrase derivation.
const MIN_SALT_LENGTH: usize = 16;

/// Length of key material in bytes (256 bits for XChaCha20-Poly1305).
pub const KEY_LENGTH: usize = 32;

/// Environment variable holding a base64 key for [`KeySource::Env`].
pub const DEFAULT_KEY_ENV: &str = "SEALNOTE_KEY";

/// Environment variable holding the passphrase for an encrypted keyfile.
pub const DEFAULT_PASSPHRASE_ENV: &str = "SEALNOTE_PASSPHRASE";

/// A 256-bit symmetric key.
///
/// Zeroized on drop. `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; KEY_LENGTH],
}

impl KeyMaterial {
    /// Wrap raw key bytes.
    ///
    /// Rejects an all-zero key, which only ever shows up as an unfilled
    /// placeholder.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Result<Self> {
        let key = Self { key: bytes };
        if key.key.iter().all(|b| *b == 0) {
            return Err(SealNoteError::Configuration(
                "Key material is all zeros".to_string(),
            ));
        }
        Ok(key)
    }

    /// Copy key bytes out of a slice, which must be exactly [`KEY_LENGTH`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LENGTH {
            return Err(SealNoteError::Configuration(format!(
                "Key must be {} bytes (got {})",
                KEY_LENGTH,
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        key.copy_from_slice(bytes);
        Self::from_bytes(*key)
    }

    /// Generate a fresh random key from the OS random source.
    pub fn generate() -> Result<Self> {
        let key = security::generate_key_bytes()?;
        Self::from_bytes(*key)
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher setup.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Standard base64 encoding, suitable for an environment variable or the
    /// OS keychain.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(self.key))
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a key from a passphrase using Argon2id.
///
/// Same passphrase and salt always produce the same key; the salt must be
/// unique per installation and stored alongside the note.
///
/// # Examples
///
/// ```
/// use sealnote_core::crypto::derive_key;
///
/// let salt = b"per-install-salt-0001";
/// let key = derive_key("my-passphrase", salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Result<KeyMaterial> {
    validate_passphrase(passphrase)?;

    if salt.len() < MIN_SALT_LENGTH {
        return Err(SealNoteError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            MIN_SALT_LENGTH
        )));
    }

    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(KEY_LENGTH),
    )
    .map_err(|e| SealNoteError::Configuration(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key_bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key_bytes[..])
        .map_err(|e| SealNoteError::Configuration(format!("Key derivation failed: {}", e)))?;

    KeyMaterial::from_bytes(*key_bytes)
}

/// Source of the symmetric key used by the codec.
///
/// Implementations hold the key as read-only shared state: `get_key` may be
/// called concurrently and must not mutate anything.
pub trait KeyProvider: Send + Sync {
    /// Return the active key.
    ///
    /// # Errors
    ///
    /// Returns `SealNoteError::Configuration` if no key is configured.
    fn get_key(&self) -> Result<&KeyMaterial>;
}

impl<P: KeyProvider + ?Sized> KeyProvider for Arc<P> {
    fn get_key(&self) -> Result<&KeyMaterial> {
        (**self).get_key()
    }
}

impl<P: KeyProvider + ?Sized> KeyProvider for &P {
    fn get_key(&self) -> Result<&KeyMaterial> {
        (**self).get_key()
    }
}

/// A provider holding one key for the life of the process.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: KeyMaterial,
}

impl StaticKeyProvider {
    /// Inject an already-loaded key.
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    /// Load a standard-base64 key.
    ///
    /// The encoded value is never echoed back in the error.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim().as_bytes())
                .map_err(|_| SealNoteError::Configuration("Key is not valid base64".to_string()))?,
        );
        Ok(Self::new(KeyMaterial::from_slice(&decoded)?))
    }

    /// Load a base64 key from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_env_with(var, process_env)
    }

    /// Like [`Self::from_env`], reading variables through `lookup` instead
    /// of the process environment.
    pub fn from_env_with<F>(var: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(var)
            .filter(|v| !v.trim().is_empty())
            .map(Zeroizing::new)
            .ok_or_else(|| SealNoteError::Configuration(format!("{} is not set", var)))?;
        let provider = Self::from_base64(&value)?;
        log::info!("Loaded note key from environment variable {}", var);
        Ok(provider)
    }

    /// Load a raw 32-byte keyfile.
    pub fn from_keyfile(path: &Path) -> Result<Self> {
        let bytes = security::read_keyfile_plain(path)?;
        let provider = Self::new(KeyMaterial::from_slice(&bytes)?);
        log::info!("Loaded note key from keyfile {}", path.display());
        Ok(provider)
    }

    /// Load a passphrase-encrypted keyfile.
    pub fn from_encrypted_keyfile(path: &Path, passphrase: &str) -> Result<Self> {
        let bytes = security::read_keyfile_encrypted(path, passphrase)?;
        let provider = Self::new(KeyMaterial::from_slice(&bytes)?);
        log::info!("Loaded note key from encrypted keyfile {}", path.display());
        Ok(provider)
    }

    /// Derive the key from a passphrase with Argon2id.
    pub fn from_passphrase(passphrase: &str, salt: &[u8]) -> Result<Self> {
        let provider = Self::new(derive_key(passphrase, salt)?);
        log::info!("Loaded note key from passphrase derivation");
        Ok(provider)
    }

    /// Load a base64 key stored in the OS keychain.
    pub fn from_keychain(account: &str) -> Result<Self> {
        let stored = security::keychain_get(account)?.ok_or_else(|| {
            SealNoteError::Configuration(format!("No key in keychain for account {}", account))
        })?;
        let provider = Self::from_base64(&stored)?;
        log::info!("Loaded note key from keychain account {}", account);
        Ok(provider)
    }

    /// Build the provider named by the `[key]` section of the config.
    pub fn from_config(config: &SealNoteConfig) -> Result<Self> {
        Self::from_config_with_env(config, process_env)
    }

    /// Like [`Self::from_config`], reading `SEALNOTE_KEY`-style variables
    /// and `SEALNOTE_PASSPHRASE` through `lookup`.
    pub fn from_config_with_env<F>(config: &SealNoteConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        config.validate()?;
        log::debug!("Resolving note key from source {:?}", config.key.source);
        match config.key.source {
            KeySource::Env => Self::from_env_with(config.key_env_var(), lookup),
            KeySource::Keyfile => Self::from_keyfile(&config.keyfile_path()?),
            KeySource::PassphraseKeyfile => {
                let passphrase = passphrase_from(DEFAULT_PASSPHRASE_ENV, lookup)?;
                Self::from_encrypted_keyfile(&config.keyfile_path()?, passphrase.expose_secret())
            }
            KeySource::Keychain => Self::from_keychain(&config.keychain_account()),
        }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn get_key(&self) -> Result<&KeyMaterial> {
        Ok(&self.key)
    }
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn passphrase_from<F>(var: &str, lookup: F) -> Result<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| SealNoteError::Configuration(format!("{} is not set", var)))
}
