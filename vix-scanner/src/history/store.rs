//! Persistence of the rolling buffers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::buffers::PersistedHistory;

/// History load/save errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed history in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the rolling buffers live between runs.
pub trait HistoryStore {
    /// Last saved buffers, or `None` on first run.
    fn load(&self) -> Result<Option<PersistedHistory>, PersistenceError>;

    fn save(&self, history: &PersistedHistory) -> Result<(), PersistenceError>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Option<PersistedHistory>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no history file found, starting fresh");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let history = serde_json::from_str(&content).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "loaded history");
        Ok(Some(history))
    }

    fn save(&self, history: &PersistedHistory) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let content = serde_json::to_string(history).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("vix-scanner-{}-{}", std::process::id(), name))
            .join("history.json")
    }

    #[test]
    fn test_missing_file_is_none() {
        let store = JsonHistoryStore::new(temp_path("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save-load");
        let store = JsonHistoryStore::new(&path);
        let history = PersistedHistory {
            vix_trend: vec![55, 61],
            regime_week: vec!["TRANSITION".to_string()],
            date_week: vec!["06-01".to_string()],
            ..Default::default()
        };

        store.save(&history).unwrap();
        assert_eq!(store.load().unwrap(), Some(history));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let err = JsonHistoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Json { .. }));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
