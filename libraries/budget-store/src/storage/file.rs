/// File-backed slice storage - one JSON document per key
use budget_core::error::{BudgetError, Result};
use budget_core::traits::SliceStorage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the data directory if needed
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the document holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BudgetError::storage(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl SliceStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.base_path)?;

        // Write beside the target then rename, so readers never see half a document
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.read("expenses").unwrap(), None);
    }

    #[test]
    fn write_creates_directory_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.write("users", r#"{"users":[]}"#).unwrap();
        storage.write("users", r#"{"users":[1]}"#).unwrap();

        assert_eq!(
            storage.read("users").unwrap().as_deref(),
            Some(r#"{"users":[1]}"#)
        );
        assert!(dir.path().join("nested").join("users.json").exists());
        assert!(!dir.path().join("nested").join("users.json.tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("auth", "{}").unwrap();
        storage.remove("auth").unwrap();
        storage.remove("auth").unwrap();
        assert_eq!(storage.read("auth").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let storage = FileStorage::new("/tmp/unused");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("").is_err());
        assert!(storage.path_for("auth").is_ok());
    }
}
