//! Common test utilities for rust-daoschema tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use rust_daoschema::error::SchemaError;
use rust_daoschema::manager::{SchemaManager, SchemaManagerOptions};
use rust_daoschema::model::SchemaDefinition;
use rust_daoschema::persistence::{JsonFileStore, SchemaStore};
use rust_daoschema::types::{FieldDescriptor, ScalarType, TypeCatalog, TypeDescriptor};
use rust_daoschema::Settings;

/// Test context with a temporary data directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub data_dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            data_dir,
        }
    }

    pub fn manager_options(&self) -> SchemaManagerOptions {
        SchemaManagerOptions {
            data_dir: self.data_dir.clone(),
            ..Default::default()
        }
    }

    /// File-backed manager rooted at the temp directory, auto-saving
    pub fn manager(&self) -> SchemaManager {
        SchemaManager::with_file_store(self.manager_options())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            data_dir: self.data_dir.clone(),
            ..Default::default()
        }
    }

    pub fn schema_path(&self, schema_name: &str) -> PathBuf {
        self.data_dir.join("Schemas").join(format!("{}.json", schema_name))
    }

    /// Reads the schema persisted under `schema_name`, panicking if absent
    pub fn read_schema(&self, schema_name: &str) -> SchemaDefinition {
        JsonFileStore::new()
            .load(&self.schema_path(schema_name))
            .expect("Schema file should parse")
            .unwrap_or_else(|| panic!("Schema {} should be on disk", schema_name))
    }

    /// Schema files currently under `{data_dir}/Schemas`
    pub fn schema_files(&self) -> Vec<String> {
        let dir = self.data_dir.join("Schemas");
        let mut names: Vec<String> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Writes `contents` to `name` inside the temp directory
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.data_dir.join(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }
}

/// Store wrapper counting loads and saves, and saves that started while
/// another was still writing
#[derive(Default)]
pub struct CountingStore {
    inner: JsonFileStore,
    loads: AtomicUsize,
    saves: AtomicUsize,
    active_saves: AtomicUsize,
    overlapping_saves: AtomicUsize,
}

impl CountingStore {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn overlapping_saves(&self) -> usize {
        self.overlapping_saves.load(Ordering::SeqCst)
    }
}

impl SchemaStore for CountingStore {
    fn load(&self, path: &Path) -> Result<Option<SchemaDefinition>, SchemaError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for concurrent first access
        std::thread::sleep(std::time::Duration::from_millis(20));
        self.inner.load(path)
    }

    fn save(&self, schema: &SchemaDefinition, path: &Path) -> Result<(), SchemaError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.active_saves.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapping_saves.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
        let result = self.inner.save(schema, path);
        self.active_saves.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn delete(&self, path: &Path) -> Result<(), SchemaError> {
        self.inner.delete(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), SchemaError> {
        self.inner.rename(from, to)
    }
}

// ============================================================================
// Type catalog fixtures
// ============================================================================

pub fn id() -> FieldDescriptor {
    FieldDescriptor::scalar("Id", ScalarType::ULong)
}

/// `Blog` holds a collection of `Post`; `Post` references its blog by field
/// and by `BlogId`.
pub fn blog_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::new("Blog", "Blogging")
                .field(id())
                .field(FieldDescriptor::scalar("Title", ScalarType::String))
                .field(FieldDescriptor::collection_of("Posts", "Post")),
        )
        .with(
            TypeDescriptor::new("Post", "Blogging")
                .field(id())
                .field(FieldDescriptor::scalar("Body", ScalarType::String))
                .field(FieldDescriptor::scalar("BlogId", ScalarType::ULong))
                .field(FieldDescriptor::reference("Blog", "Blog")),
        )
}

/// `Order` and `Product` hold collections of each other
pub fn order_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::new("Order", "Shop")
                .field(id())
                .field(FieldDescriptor::scalar("Placed", ScalarType::DateTime))
                .field(FieldDescriptor::collection_of("Products", "Product")),
        )
        .with(
            TypeDescriptor::new("Product", "Shop")
                .field(id())
                .field(FieldDescriptor::scalar("Price", ScalarType::Decimal))
                .field(FieldDescriptor::collection_of("Orders", "Order")),
        )
}

/// `Dog` extends `Animal`, which extends `Entity`
pub fn animal_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::new("Entity", "Zoo")
                .field(FieldDescriptor::scalar("Created", ScalarType::DateTime)),
        )
        .with(
            TypeDescriptor::new("Animal", "Zoo")
                .extends("Entity")
                .field(FieldDescriptor::scalar("Name", ScalarType::String)),
        )
        .with(
            TypeDescriptor::new("Dog", "Zoo")
                .extends("Animal")
                .field(FieldDescriptor::scalar("Breed", ScalarType::String)),
        )
}

pub const BLOG_CATALOG_JSON: &str = r#"{ "types": [
    { "name": "Blog", "namespace": "Blogging", "fields": [
        { "name": "Id", "type": "ULong", "key": true },
        { "name": "Title", "type": "String" },
        { "name": "Posts", "type": "Post[]" } ] },
    { "name": "Post", "namespace": "Blogging", "fields": [
        { "name": "Id", "type": "ULong" },
        { "name": "Body", "type": "String" },
        { "name": "BlogId", "type": "ULong" },
        { "name": "Blog", "type": "Blog" } ] } ] }"#;

pub const SIMPLE_SCHEMA_JSON: &str = r#"{
    "nameSpace": "Blogging.Data",
    "schemaName": "Blogging",
    "tables": [
        { "name": "Blog", "cols": [
            { "name": "Title", "type": "String", "null": false, "maxLength": 200 } ] },
        { "name": "Post", "cols": [
            { "name": "Body", "type": "String" } ],
          "fks": [ { "column": "BlogId", "table": "Blog" } ] },
        { "name": "Tag", "cols": [ { "name": "Label", "type": "String" } ] }
    ],
    "xrefs": [ ["Post", "Tag"] ]
}"#;
