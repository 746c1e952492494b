//! Filesystem utilities for atomic operations.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On Unix `fs::rename` replaces the destination atomically, so a failure
/// leaves the destination untouched. On Windows the rename fails if the
/// destination exists, so it is removed and the rename retried.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    let initial_err = match fs::rename(temp_path, destination) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    #[cfg(windows)]
    {
        if temp_path.exists() && destination.exists() {
            let _ = fs::remove_file(destination);
            if fs::rename(temp_path, destination).is_ok() {
                return Ok(());
            }
        }
    }

    let _ = fs::remove_file(temp_path);
    Err(io::Error::new(
        initial_err.kind(),
        format!("Atomic rename failed: {}", initial_err),
    ))
}

/// Replace `destination` with `contents` through a synced temp sibling, so a
/// crash mid-write leaves either the old file or the new one.
///
/// New files are created with mode 0600 on Unix.
pub fn write_atomic(destination: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_sibling(destination);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let written = options.open(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    rename_with_fallback(&temp_path, destination)
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".tmp-{}-{}-{}", std::process::id(), nanos, seq));
    destination.with_file_name(name)
}
