use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Backing store for the serialized history document.
pub trait HistoryStorage: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, document: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("history file {path} unavailable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history storage unavailable: {0}")]
    Unavailable(String),
}

/// Stores the history as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    path: PathBuf,
}

impl FileHistoryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn write(&self, document: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        // Staged write; readers never observe a partial document.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, document).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))
    }
}

/// Process-local storage used by tests and the CLI when persistence is disabled.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStorage {
    document: Mutex<Option<String>>,
}

impl InMemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }
}

impl HistoryStorage for InMemoryHistoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .document
            .lock()
            .map_err(|_| StorageError::Unavailable("history lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn write(&self, document: &str) -> Result<(), StorageError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| StorageError::Unavailable("history lock poisoned".to_string()))?;
        *guard = Some(document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempdir().expect("temp dir");
        let storage = FileHistoryStorage::new(dir.path().join("history.json"));
        assert!(storage.read().expect("read succeeds").is_none());
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().expect("temp dir");
        let storage = FileHistoryStorage::new(dir.path().join("nested").join("history.json"));
        storage.write("[]").expect("write succeeds");
        assert_eq!(storage.read().expect("read succeeds").as_deref(), Some("[]"));
    }
}
