use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{KeyValueStore, StoreError};

/// Directory-backed store keeping one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the record files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let write_err = |source| StoreError::Write {
            key: key.to_owned(),
            source,
        };

        // Temp file in the same directory so the rename stays on one filesystem.
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(value.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&path).map_err(|err| write_err(err.error))?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote record file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopening_the_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let data_dir = dir.path().join("nested");
        FileStore::new(&data_dir).set("taskflow_lists", "[1,2]")?;

        let reopened = FileStore::new(&data_dir);
        assert_eq!(reopened.get("taskflow_lists")?.as_deref(), Some("[1,2]"));
        assert!(data_dir.join("taskflow_lists.json").exists());
        Ok(())
    }

    #[test]
    fn missing_file_reads_as_absent_and_remove_is_noop() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path());
        assert!(store.get("taskflow_tasks")?.is_none());
        store.remove("taskflow_tasks")?;

        store.set("taskflow_tasks", "[]")?;
        store.remove("taskflow_tasks")?;
        assert!(store.get("taskflow_tasks")?.is_none());
        Ok(())
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let store = FileStore::new("/tmp/taskflow-never-written");
        assert!(matches!(store.get("../etc/passwd"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(StoreError::InvalidKey(_))));
    }
}
