//! rust-daoschema: relational schemas for generated data access layers
//!
//! This library infers a relational schema (tables, keys, foreign keys and
//! many-to-many xrefs) from a graph of described application types, manages
//! it through idempotent mutations, and persists it as JSON for code
//! generators to consume.

pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod manager;
pub mod model;
pub mod naming;
pub mod persistence;
pub mod provider;
pub mod simple;
pub mod types;
pub mod util;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub use config::Settings;
pub use error::SchemaError;

use manager::{MappedSchemaDefinition, SchemaManager};
use model::SchemaDefinition;
use naming::{NameCollisionResolver, SchemaNameMap};
use persistence::{JsonFileStore, SchemaStore};
use provider::{register_augmentations, SchemaDefinitionCreateResult, SchemaProvider};
use simple::SimpleSchema;
use types::TypeCatalog;

/// Options for inferring a schema from a type catalog
#[derive(Debug, Clone)]
pub struct InferOptions {
    /// Path to the type catalog JSON file
    pub catalog_path: PathBuf,
    /// Root type names; every catalog type when empty
    pub roots: Vec<String>,
    /// Name of the schema to write; derived from the roots when absent
    pub schema_name: Option<String>,
    pub settings: Settings,
}

/// Infer a schema from a type catalog and persist it
pub fn infer_schema(options: InferOptions) -> Result<SchemaDefinitionCreateResult> {
    // Step 1: Load the type catalog
    let catalog = TypeCatalog::load(&options.catalog_path)?;
    info!(path = %options.catalog_path.display(), types = catalog.len(), "Loaded type catalog");

    // Step 2: Pick the root types
    let roots: Vec<&str> = if options.roots.is_empty() {
        catalog.type_names().collect()
    } else {
        options.roots.iter().map(String::as_str).collect()
    };

    // Step 3: Infer and write the schema
    let manager = Arc::new(SchemaManager::with_file_store(options.settings.manager_options()));
    let provider = SchemaProvider::new(options.settings.provider_options(), Arc::clone(&manager));
    let result = provider.create_schema_definition(&catalog, &roots, options.schema_name.as_deref())?;

    // Step 4: Persist, unless every mutation already did
    if !manager.auto_save() {
        manager.save()?;
    }
    info!(
        schema = %result.schema.name,
        path = %manager.schema_file_path(&result.schema.name).display(),
        "Schema written"
    );
    Ok(result)
}

/// Options for importing a simplified schema document
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Path to the simplified schema JSON file
    pub simple_schema_path: PathBuf,
    pub settings: Settings,
}

/// Apply a simplified schema document and persist the result
pub fn import_simple_schema(options: ImportOptions) -> Result<SchemaDefinition> {
    let json = fs::read_to_string(&options.simple_schema_path).with_context(|| {
        format!(
            "Failed to read simplified schema {}",
            options.simple_schema_path.display()
        )
    })?;
    let simple = SimpleSchema::parse(&json)?;

    let manager = SchemaManager::with_file_store(options.settings.manager_options());
    register_augmentations(&options.settings.provider_options(), &manager);
    let schema = manager.apply_simple_schema(&simple)?;
    if !manager.auto_save() {
        manager.save()?;
    }
    Ok(schema)
}

/// Load a persisted schema
pub fn load_schema(path: &Path) -> Result<SchemaDefinition> {
    JsonFileStore::new()
        .load(path)?
        .with_context(|| format!("Schema file not found: {}", path.display()))
}

/// Build a collision-free name map for the schema at `schema_path`, apply it
/// and save map and schema together to `output_path`.
pub fn map_schema_names(
    schema_path: &Path,
    output_path: &Path,
    resolver: &NameCollisionResolver,
) -> Result<MappedSchemaDefinition> {
    let schema = load_schema(schema_path)?;
    let name_map = SchemaNameMap::from_schema(&schema, resolver);
    let mut mapped = MappedSchemaDefinition::new(schema, name_map);
    mapped.save(Some(output_path))?;
    Ok(mapped)
}
