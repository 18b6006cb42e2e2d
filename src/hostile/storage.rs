//! Storage backends for the definitions document.
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use super::errors::StoreError;

/// Where the serialised definitions document lives.
pub trait DefinitionStorage: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn read_document(&self) -> Result<Option<String>, StoreError>;

    fn write_document(&self, contents: &str) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

/// Stores the document in a TOML file, creating parent directories on write.
#[derive(Debug, Clone)]
pub struct TomlFileStorage {
    path: PathBuf,
}

impl TomlFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DefinitionStorage for TomlFileStorage {
    fn read_document(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    fn write_document(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        fs::write(&self.path, contents).map_err(|err| StoreError::io(&self.path, err))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the document in a shared buffer; clones observe the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn with_document(contents: impl Into<String>) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DefinitionStorage for MemoryStorage {
    fn read_document(&self) -> Result<Option<String>, StoreError> {
        Ok(self.document())
    }

    fn write_document(&self, contents: &str) -> Result<(), StoreError> {
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory document".to_string()
    }
}
