//! Keyfile, keychain, and random-source helpers used to provision and load
//! the note key.
//!
//! Encrypted keyfiles use Age passphrase encryption (scrypt under the hood),
//! so a stolen keyfile is only as weak as its passphrase.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::iter;
use std::path::Path;

use age::secrecy::SecretString;
use zeroize::Zeroizing;

use crate::crypto::{KeyMaterial, KEY_LENGTH};
use crate::crypto::validate_passphrase;
use crate::error::{Result, SealNoteError};

/// Keychain service name under which keys are stored.
pub const KEYCHAIN_SERVICE: &str = "sealnote";

/// Fill `buf` from the OS random source.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf)
        .map_err(|e| SealNoteError::Encryption(format!("Random source failed: {}", e)))
}

/// Generate a fresh 256-bit key from the OS random source.
pub fn generate_key_bytes() -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    let mut bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    fill_random(&mut bytes[..])?;
    Ok(bytes)
}

/// Write a raw key to a new keyfile (mode 0600 on Unix).
///
/// Refuses to overwrite an existing keyfile: losing the old key loses the note.
pub fn write_keyfile_plain(path: &Path, key: &KeyMaterial) -> Result<()> {
    write_new_keyfile(path, key.as_bytes())?;
    log::info!("Wrote keyfile {}", path.display());
    Ok(())
}

/// Write a key to a new keyfile, encrypted under `passphrase`.
pub fn write_keyfile_encrypted(path: &Path, key: &KeyMaterial, passphrase: &str) -> Result<()> {
    validate_passphrase(passphrase)?;
    let encrypted = encrypt_with_passphrase(key.as_bytes(), passphrase)?;
    write_new_keyfile(path, &encrypted)?;
    log::info!("Wrote encrypted keyfile {}", path.display());
    Ok(())
}

/// Read a raw keyfile.
pub fn read_keyfile_plain(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        SealNoteError::Configuration(format!("Failed to read keyfile {}: {}", path.display(), e))
    })?;
    Ok(Zeroizing::new(bytes))
}

/// Read and decrypt a passphrase-encrypted keyfile.
pub fn read_keyfile_encrypted(path: &Path, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let encrypted = std::fs::read(path).map_err(|e| {
        SealNoteError::Configuration(format!("Failed to read keyfile {}: {}", path.display(), e))
    })?;
    decrypt_with_passphrase(&encrypted, passphrase)
}

/// Fetch the base64 key stored for `account`, if any.
pub fn keychain_get(account: &str) -> Result<Option<Zeroizing<String>>> {
    let entry = keychain_entry(account)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(Zeroizing::new(value))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(SealNoteError::Configuration(format!(
            "Keychain read failed: {}",
            err
        ))),
    }
}

/// Store `key` (base64) in the keychain for `account`.
pub fn keychain_set(account: &str, key: &KeyMaterial) -> Result<()> {
    let entry = keychain_entry(account)?;
    entry
        .set_password(&key.to_base64())
        .map_err(|e| SealNoteError::Storage(format!("Keychain write failed: {}", e)))
}

/// Remove the stored key for `account`. Missing entries are not an error.
pub fn keychain_clear(account: &str) -> Result<()> {
    let entry = keychain_entry(account)?;
    match entry.delete_password() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(SealNoteError::Storage(format!(
            "Keychain delete failed: {}",
            err
        ))),
    }
}

/// Stable short identifier for a note path, used as the default keychain
/// account.
pub fn note_hash(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let hash = blake3::hash(canonical.to_string_lossy().as_bytes());
    hash.to_hex()[..16].to_string()
}

fn keychain_entry(account: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYCHAIN_SERVICE, account)
        .map_err(|e| SealNoteError::Configuration(format!("Keychain entry failed: {}", e)))
}

fn encrypt_with_passphrase(data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(passphrase.to_string()));

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| SealNoteError::Encryption(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(data)
        .map_err(|e| SealNoteError::Encryption(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| SealNoteError::Encryption(format!("Encryption finish failed: {}", e)))?;

    Ok(encrypted)
}

fn decrypt_with_passphrase(encrypted: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let decryptor = age::Decryptor::new(encrypted)
        .map_err(|e| SealNoteError::Configuration(format!("Keyfile is not readable: {}", e)))?;

    let identity = age::scrypt::Identity::new(SecretString::from(passphrase.to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => {
                SealNoteError::Configuration("Incorrect keyfile passphrase".to_string())
            }
            _ => SealNoteError::Configuration(format!("Keyfile decryption failed: {}", e)),
        })?;

    let mut decrypted = Zeroizing::new(Vec::new());
    reader.read_to_end(&mut decrypted).map_err(|e| {
        SealNoteError::Configuration(format!("Failed to read decrypted keyfile: {}", e))
    })?;

    Ok(decrypted)
}

fn write_new_keyfile(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SealNoteError::Storage(format!(
                "Failed to create keyfile directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            SealNoteError::Storage(format!("Keyfile already exists: {}", path.display()))
        } else {
            SealNoteError::Storage(format!("Failed to write keyfile {}: {}", path.display(), e))
        }
    })?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}
