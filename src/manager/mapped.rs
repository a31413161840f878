//! A schema persisted together with the name map applied to it

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaError;
use crate::model::SchemaDefinition;
use crate::naming::{ColumnPropertyName, SchemaNameMap, TableClassName};
use crate::persistence::write_json_file;

use super::{ManagerResult, SchemaManager};

/// Minimum number of map entries to dispatch through rayon. Entries still
/// apply one at a time under the manager lock, each refreshing only the
/// tables it touches.
const PARALLEL_THRESHOLD: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedSchemaDefinition {
    pub schema_name_map: SchemaNameMap,
    pub schema_definition: SchemaDefinition,
    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl MappedSchemaDefinition {
    pub fn new(schema_definition: SchemaDefinition, schema_name_map: SchemaNameMap) -> Self {
        Self {
            schema_name_map,
            schema_definition,
            file_path: None,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| SchemaError::SchemaReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut mapped: MappedSchemaDefinition = serde_json::from_str(&json)
            .map_err(|e| SchemaError::SchemaParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        mapped.schema_definition.refresh_foreign_key_caches();
        mapped.file_path = Some(path.to_path_buf());
        Ok(mapped)
    }

    /// Applies the name map, then writes map and schema to `path`, or to the
    /// file this definition was loaded from.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        self.map_names()?;
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| self.file_path.clone())
            .context("No file path to save the mapped schema to")?;

        let json = serde_json::to_string_pretty(self).map_err(|e| SchemaError::SchemaSerializeError {
            name: self.schema_definition.name.clone(),
            source: e,
        })?;
        write_json_file(&path, &json)?;
        self.file_path = Some(path.clone());
        Ok(path)
    }

    /// Sets every mapped class and property name on the schema. Entries
    /// naming tables or columns the schema lacks are skipped.
    pub fn map_names(&mut self) -> Result<()> {
        let manager = SchemaManager::in_memory(self.schema_definition.clone());
        let map = &self.schema_name_map;

        let set_class = |entry: &TableClassName| {
            manager.set_table_class_name(&entry.table_name, &entry.class_name)
        };
        let tables = &map.table_names_to_class_names;
        let table_results: Vec<ManagerResult> = if tables.len() >= PARALLEL_THRESHOLD {
            tables.par_iter().map(set_class).collect()
        } else {
            tables.iter().map(set_class).collect()
        };

        let set_property = |entry: &ColumnPropertyName| {
            manager.set_column_property_name(&entry.table_name, &entry.column_name, &entry.property_name)
        };
        let columns = &map.column_names_to_property_names;
        let column_results: Vec<ManagerResult> = if columns.len() >= PARALLEL_THRESHOLD {
            columns.par_iter().map(set_property).collect()
        } else {
            columns.iter().map(set_property).collect()
        };

        for result in table_results.iter().chain(&column_results).filter(|r| !r.success) {
            warn!(message = %result.message, "Skipped name map entry");
        }

        self.schema_definition = manager.current_schema()?;
        Ok(())
    }
}
