//! Schema document stores

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::SchemaError;
use crate::model::SchemaDefinition;

/// Loads and saves schema documents by path
pub trait SchemaStore: Send + Sync {
    /// The schema stored at `path`, or `None` when nothing is stored there
    fn load(&self, path: &Path) -> Result<Option<SchemaDefinition>, SchemaError>;

    fn save(&self, schema: &SchemaDefinition, path: &Path) -> Result<(), SchemaError>;

    fn exists(&self, path: &Path) -> bool;

    fn delete(&self, path: &Path) -> Result<(), SchemaError>;

    fn rename(&self, from: &Path, to: &Path) -> Result<(), SchemaError>;
}

fn to_json(schema: &SchemaDefinition) -> Result<String, SchemaError> {
    serde_json::to_string_pretty(schema).map_err(|e| SchemaError::SchemaSerializeError {
        name: schema.name.clone(),
        source: e,
    })
}

fn from_json(json: &str, path: &Path) -> Result<SchemaDefinition, SchemaError> {
    let mut schema: SchemaDefinition =
        serde_json::from_str(json).map_err(|e| SchemaError::SchemaParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    schema.refresh_foreign_key_caches();
    schema.set_file(path);
    Ok(schema)
}

/// Writes `json` to `path`, creating missing parent directories
pub fn write_json_file(path: &Path, json: &str) -> Result<(), SchemaError> {
    let write_error = |source| SchemaError::SchemaWriteError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, json).map_err(write_error)
}

/// Pretty-printed JSON files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaStore for JsonFileStore {
    fn load(&self, path: &Path) -> Result<Option<SchemaDefinition>, SchemaError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SchemaError::SchemaReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        let schema = from_json(&json, path)?;
        tracing::debug!(path = %path.display(), tables = schema.table_count(), "Loaded schema");
        Ok(Some(schema))
    }

    fn save(&self, schema: &SchemaDefinition, path: &Path) -> Result<(), SchemaError> {
        write_json_file(path, &to_json(schema)?)?;
        tracing::debug!(path = %path.display(), schema = %schema.name, "Saved schema");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn delete(&self, path: &Path) -> Result<(), SchemaError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SchemaError::SchemaWriteError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), SchemaError> {
        fs::rename(from, to).map_err(|e| SchemaError::SchemaWriteError {
            path: to.to_path_buf(),
            source: e,
        })
    }
}

/// Keeps serialized documents in memory. Used for schemas that are never
/// written to disk, such as the working copy of a name mapping pass.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.documents.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl SchemaStore for MemoryStore {
    fn load(&self, path: &Path) -> Result<Option<SchemaDefinition>, SchemaError> {
        let documents = self.documents.lock();
        documents
            .get(path)
            .map(|json| from_json(json, path))
            .transpose()
    }

    fn save(&self, schema: &SchemaDefinition, path: &Path) -> Result<(), SchemaError> {
        let json = to_json(schema)?;
        self.documents.lock().insert(path.to_path_buf(), json);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.documents.lock().contains_key(path)
    }

    fn delete(&self, path: &Path) -> Result<(), SchemaError> {
        self.documents.lock().remove(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), SchemaError> {
        let mut documents = self.documents.lock();
        match documents.remove(from) {
            Some(json) => {
                documents.insert(to.to_path_buf(), json);
                Ok(())
            }
            None => Err(SchemaError::SchemaWriteError {
                path: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "source document not found"),
            }),
        }
    }
}
