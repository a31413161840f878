//! Naming policies for persisted and generated artifacts

use std::path::{Path, PathBuf};

use crate::model::SchemaDefinition;
use crate::types::TypeSchema;

/// Directory used for a schema's generated artifacts
pub trait SchemaPathProvider: Send + Sync {
    fn schema_temp_path(&self, schema: &SchemaDefinition, type_schema: Option<&TypeSchema>) -> PathBuf;
}

/// `{root}/DaoTemp_{schema name}`; ignores the type schema
#[derive(Debug, Clone)]
pub struct SchemaTempPathProvider {
    root: PathBuf,
}

impl SchemaTempPathProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SchemaPathProvider for SchemaTempPathProvider {
    fn schema_temp_path(&self, schema: &SchemaDefinition, _type_schema: Option<&TypeSchema>) -> PathBuf {
        self.root.join(format!("DaoTemp_{}", schema.name))
    }
}

/// `{data_dir}/Schemas/{schema name}.json`
pub fn schema_file_path(data_dir: &Path, schema_name: &str) -> PathBuf {
    data_dir.join("Schemas").join(format!("{}.json", schema_name))
}
