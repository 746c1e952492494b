//! TOML configuration: where the note lives and where its key comes from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_KEY_ENV;
use crate::error::{Result, SealNoteError};
use crate::security::note_hash;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealNoteConfig {
    pub note: NoteSection,
    pub key: KeySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySection {
    pub source: KeySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Where the note key is loaded from at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Base64 key in an environment variable
    Env,
    /// Raw key in a 0600 file on this device
    Keyfile,
    /// Age-encrypted keyfile unlocked by `SEALNOTE_PASSPHRASE`
    PassphraseKeyfile,
    /// Base64 key in the OS keychain
    Keychain,
}

impl SealNoteConfig {
    /// Build a config for `source`. Paths must be valid UTF-8 to survive the
    /// TOML round trip.
    pub fn new(
        note_path: PathBuf,
        source: KeySource,
        keyfile_path: Option<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            note: NoteSection {
                path: path_to_string(&note_path, "note")?,
            },
            key: KeySection {
                source,
                env_var: None,
                path: keyfile_path
                    .map(|path| path_to_string(&path, "keyfile"))
                    .transpose()?,
                account: None,
            },
        })
    }

    pub fn note_path(&self) -> PathBuf {
        PathBuf::from(&self.note.path)
    }

    /// Environment variable for [`KeySource::Env`].
    pub fn key_env_var(&self) -> &str {
        self.key
            .env_var
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_KEY_ENV)
    }

    /// Keyfile path for the keyfile sources.
    pub fn keyfile_path(&self) -> Result<PathBuf> {
        self.key
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                SealNoteError::Configuration(format!(
                    "key path is required for {}",
                    self.key.source.as_str()
                ))
            })
    }

    /// Keychain account; defaults to a hash of the note path.
    pub fn keychain_account(&self) -> String {
        self.key
            .account
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| note_hash(&self.note_path()))
    }

    /// Check that the fields required by the key source are present.
    pub fn validate(&self) -> Result<()> {
        if self.note.path.trim().is_empty() {
            return Err(SealNoteError::Configuration(
                "note path cannot be empty".to_string(),
            ));
        }
        match self.key.source {
            KeySource::Keyfile | KeySource::PassphraseKeyfile => {
                self.keyfile_path()?;
            }
            KeySource::Env | KeySource::Keychain => {}
        }
        Ok(())
    }
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Env => "env",
            KeySource::Keyfile => "keyfile",
            KeySource::PassphraseKeyfile => "passphrase_keyfile",
            KeySource::Keychain => "keychain",
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_note_path() -> Result<PathBuf> {
    Ok(xdg_data_dir()?.join("note.enc"))
}

pub fn default_keyfile_path() -> Result<PathBuf> {
    Ok(xdg_config_dir()?.join("note.key"))
}

impl Default for SealNoteConfig {
    /// Note in the XDG data dir, key from `SEALNOTE_KEY`. Falls back to a
    /// relative `note.enc` when no home directory is known.
    fn default() -> Self {
        let note_path = default_note_path()
            .ok()
            .and_then(|path| path.to_str().map(str::to_string))
            .unwrap_or_else(|| "note.enc".to_string());
        Self {
            note: NoteSection { path: note_path },
            key: KeySection {
                source: KeySource::Env,
                env_var: None,
                path: None,
                account: None,
            },
        }
    }
}

fn path_to_string(path: &Path, what: &str) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        SealNoteError::Configuration(format!(
            "{} path is not valid UTF-8: {}",
            what,
            path.display()
        ))
    })
}

pub fn read_config(path: &Path) -> Result<SealNoteConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SealNoteError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let config: SealNoteConfig = toml::from_str(&contents).map_err(|e| {
        SealNoteError::Configuration(format!("Failed to parse config {}: {}", path.display(), e))
    })?;
    config.validate()?;
    Ok(config)
}

/// Read the config at the default path, or the defaults when no file exists.
pub fn load_config() -> Result<SealNoteConfig> {
    let path = default_config_path()?;
    if path.exists() {
        log::debug!("Reading config {}", path.display());
        return read_config(&path);
    }
    log::debug!("No config at {}; using defaults", path.display());
    Ok(SealNoteConfig::default())
}

pub fn write_config(path: &Path, config: &SealNoteConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SealNoteError::Storage(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| SealNoteError::Configuration(format!("TOML error: {}", e)))?;
    std::fs::write(path, contents).map_err(|e| {
        SealNoteError::Storage(format!("Failed to write config {}: {}", path.display(), e))
    })?;
    Ok(())
}

pub fn xdg_config_dir() -> Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sealnote"));
        }
    }
    Ok(home_dir()?.join(".config").join("sealnote"))
}

pub fn xdg_data_dir() -> Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sealnote"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("sealnote"))
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| {
        SealNoteError::Configuration("HOME is not set; cannot resolve default paths".to_string())
    })?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sealnote").join("config.toml");
        let config = SealNoteConfig::new(
            dir.path().join("note.enc"),
            KeySource::Keyfile,
            Some(dir.path().join("note.key")),
        )
        .unwrap();

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.key.source, KeySource::Keyfile);
        assert_eq!(loaded.note_path(), dir.path().join("note.enc"));
        assert_eq!(loaded.keyfile_path().unwrap(), dir.path().join("note.key"));
    }

    #[test]
    fn test_parse_snake_case_source() {
        let config: SealNoteConfig = toml::from_str(
            "[note]\npath = \"/tmp/note.enc\"\n\n[key]\nsource = \"passphrase_keyfile\"\npath = \"/tmp/note.key\"\n",
        )
        .unwrap();
        assert_eq!(config.key.source, KeySource::PassphraseKeyfile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keyfile_source_requires_path() {
        let config = SealNoteConfig::new(PathBuf::from("/tmp/note.enc"), KeySource::Keyfile, None).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SealNoteError::Configuration(_)));
        assert!(err.to_string().contains("key path is required for keyfile"));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[note]\npath = \"/tmp/note.enc\"\n\n[key]\nsource = \"hardcoded\"\n",
        )
        .unwrap();

        let err = read_config(&path).unwrap_err();
        assert!(matches!(err, SealNoteError::Configuration(_)));
    }

    #[test]
    fn test_env_var_defaults() {
        let mut config = SealNoteConfig::new(PathBuf::from("/tmp/note.enc"), KeySource::Env, None).unwrap();
        assert_eq!(config.key_env_var(), DEFAULT_KEY_ENV);

        config.key.env_var = Some("MY_NOTE_KEY".to_string());
        assert_eq!(config.key_env_var(), "MY_NOTE_KEY");
    }

    #[test]
    fn test_keychain_account_defaults_to_note_hash() {
        let config = SealNoteConfig::new(
            PathBuf::from("/tmp/sealnote-test/note.enc"),
            KeySource::Keychain,
            None,
        )
        .unwrap();
        assert_eq!(config.keychain_account(), note_hash(&config.note_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad = PathBuf::from(OsStr::from_bytes(b"/tmp/note-\xFF.enc"));

        let err = SealNoteConfig::new(bad.clone(), KeySource::Env, None).unwrap_err();
        assert!(matches!(err, SealNoteError::Configuration(_)));
        assert!(err.to_string().contains("note path is not valid UTF-8"));

        let err = SealNoteConfig::new(PathBuf::from("/tmp/note.enc"), KeySource::Keyfile, Some(bad))
            .unwrap_err();
        assert!(err.to_string().contains("keyfile path is not valid UTF-8"));
    }
}
