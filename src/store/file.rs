//! Directory-backed store backend.
//!
//! Each key maps to one file inside a capability-scoped directory. Writes go
//! to a sibling temporary file that is renamed over the target, so a crash
//! leaves either the old value or the new one.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::debug;

use super::{KeyValueStore, StoreError, validate_key};

/// Store that keeps one file per key under a root directory.
#[derive(Debug)]
pub struct FileStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] if the directory cannot be created or
    /// opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, StoreError> {
        let path = root.as_ref();
        let open_err = |source| StoreError::Open {
            path: path.to_string(),
            source,
        };
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(open_err)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(open_err)?;
        debug!(root = %path, "opened file store");
        Ok(Self {
            root: path.to_owned(),
            dir,
        })
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn root(&self) -> &Utf8Path { &self.root }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        key: key.to_owned(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        match self.dir.read_to_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let tmp = format!("{key}.tmp");
        self.dir.write(&tmp, value).map_err(io_err(key))?;
        self.dir.rename(&tmp, &self.dir, key).map_err(io_err(key))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        match self.dir.remove_file(key) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_err(key)(e)),
            _ => Ok(()),
        }
    }
}
