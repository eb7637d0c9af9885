//! One file per key in a data directory.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::{Storage, StorageError, StorageKey};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a uniquely named temporary file that is then renamed over
/// the target, so a crash or a concurrent writer never leaves a half-written
/// value behind. Files are readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Unavailable(format!("{}: {e}", dir.display())))?;
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!(
            ".{key}.json.{}.{}.tmp",
            std::process::id(),
            Uuid::new_v4().simple()
        ))
    }
}

fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn write_atomic(tmp: &Path, target: &Path, value: &str) -> std::io::Result<()> {
    let written = create_private(tmp).and_then(|mut file| {
        file.write_all(value.as_bytes())?;
        file.sync_all()
    });
    match written.and_then(|()| std::fs::rename(tmp, target)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = std::fs::remove_file(tmp);
            Err(e)
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.temp_path(key), &self.path(key), value)
            .map_err(|source| StorageError::Io { key, source })
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }
}
