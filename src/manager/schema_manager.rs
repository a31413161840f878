//! The schema manager: mutation orchestration over a current schema

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SchemaError;
use crate::model::{Column, SchemaDefinition, Table, XrefInfo, XrefTable};
use crate::naming::NameFormatter;
use crate::persistence::{schema_file_path, JsonFileStore, MemoryStore, SchemaStore};
use crate::util::julian_date;

use super::augmentation::SchemaManagerAugmentation;
use super::{file_lock, ops, ManagerResult};

/// Options controlling where and when a manager persists its schema
#[derive(Debug, Clone)]
pub struct SchemaManagerOptions {
    /// Root data directory; schemas live under `{data_dir}/Schemas`
    pub data_dir: PathBuf,
    /// Persist the full schema after every successful mutation
    pub auto_save: bool,
    /// Back up instead of deleting an existing schema file being replaced
    pub backup_existing: bool,
}

impl Default for SchemaManagerOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            auto_save: true,
            backup_existing: false,
        }
    }
}

type Augmentations = RwLock<Vec<Arc<dyn SchemaManagerAugmentation>>>;

/// Owns a current schema definition and applies idempotent mutations to it.
///
/// Mutations report expected failures through [`ManagerResult`] instead of
/// returning errors. The current schema is loaded lazily on first access;
/// concurrent first access performs exactly one load. Saves are serialized
/// by a lock separate from the load lock.
pub struct SchemaManager {
    data_dir: PathBuf,
    store: Arc<dyn SchemaStore>,
    current: RwLock<Option<SchemaDefinition>>,
    load_lock: Mutex<()>,
    save_lock: Mutex<()>,
    auto_save: AtomicBool,
    backup_existing: AtomicBool,
    pre_column_augmentations: Augmentations,
    post_column_augmentations: Augmentations,
}

impl std::fmt::Debug for SchemaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaManager")
            .field("data_dir", &self.data_dir)
            .field("auto_save", &self.auto_save())
            .field("backup_existing", &self.backup_existing())
            .field("loaded", &self.current.read().is_some())
            .finish()
    }
}

impl SchemaManager {
    pub fn new(options: SchemaManagerOptions, store: Arc<dyn SchemaStore>) -> Self {
        Self {
            data_dir: options.data_dir,
            store,
            current: RwLock::new(None),
            load_lock: Mutex::new(()),
            save_lock: Mutex::new(()),
            auto_save: AtomicBool::new(options.auto_save),
            backup_existing: AtomicBool::new(options.backup_existing),
            pre_column_augmentations: RwLock::new(Vec::new()),
            post_column_augmentations: RwLock::new(Vec::new()),
        }
    }

    /// Manager persisting JSON files under `options.data_dir`
    pub fn with_file_store(options: SchemaManagerOptions) -> Self {
        Self::new(options, Arc::new(JsonFileStore::new()))
    }

    /// Manager over `schema` that never touches the filesystem
    pub fn in_memory(schema: SchemaDefinition) -> Self {
        let options = SchemaManagerOptions {
            auto_save: false,
            ..Default::default()
        };
        let manager = Self::new(options, Arc::new(MemoryStore::new()));
        manager.manage_schema(schema);
        manager
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save.load(Ordering::Acquire)
    }

    pub fn set_auto_save(&self, auto_save: bool) {
        self.auto_save.store(auto_save, Ordering::Release);
    }

    pub fn backup_existing(&self) -> bool {
        self.backup_existing.load(Ordering::Acquire)
    }

    pub fn set_backup_existing(&self, backup_existing: bool) {
        self.backup_existing.store(backup_existing, Ordering::Release);
    }

    pub fn schema_file_path(&self, schema_name: &str) -> PathBuf {
        schema_file_path(&self.data_dir, schema_name)
    }

    pub fn schema_exists(&self, schema_name: &str) -> bool {
        self.store.exists(&self.schema_file_path(schema_name))
    }

    fn load_schema(&self, schema_name: &str) -> Result<SchemaDefinition, SchemaError> {
        let path = self.schema_file_path(schema_name);
        let mut schema = match self.store.load(&path)? {
            Some(schema) => schema,
            None => {
                let mut schema = SchemaDefinition::new(schema_name);
                schema.set_file(&path);
                schema
            }
        };
        schema.name = schema_name.to_string();
        Ok(schema)
    }

    fn ensure_loaded(&self) -> Result<(), SchemaError> {
        if self.current.read().is_some() {
            return Ok(());
        }
        let _guard = self.load_lock.lock();
        if self.current.read().is_some() {
            return Ok(());
        }
        let name = format!("Default_{}", julian_date(Utc::now()));
        let schema = self.load_schema(&name)?;
        debug!(schema = %schema.name, "Loaded default schema");
        *self.current.write() = Some(schema);
        Ok(())
    }

    /// Runs `f` against the current schema, loading the default schema first
    /// if none has been set.
    pub fn with_current<R>(&self, f: impl FnOnce(&SchemaDefinition) -> R) -> Result<R, SchemaError> {
        self.ensure_loaded()?;
        let current = self.current.read();
        match current.as_ref() {
            Some(schema) => Ok(f(schema)),
            None => Ok(f(&SchemaDefinition::default())),
        }
    }

    /// Snapshot of the current schema
    pub fn current_schema(&self) -> Result<SchemaDefinition, SchemaError> {
        self.with_current(SchemaDefinition::clone)
    }

    pub fn table(&self, table_name: &str) -> Result<Option<Table>, SchemaError> {
        self.with_current(|schema| schema.table(table_name).cloned())
    }

    pub fn get_xref(&self, xref_table_name: &str) -> Result<Option<XrefTable>, SchemaError> {
        self.with_current(|schema| schema.xref(xref_table_name).cloned())
    }

    pub fn left_xrefs_for(&self, table_name: &str) -> Result<Vec<XrefInfo>, SchemaError> {
        self.with_current(|schema| schema.left_xrefs_for(table_name))
    }

    pub fn right_xrefs_for(&self, table_name: &str) -> Result<Vec<XrefInfo>, SchemaError> {
        self.with_current(|schema| schema.right_xrefs_for(table_name))
    }

    /// Makes `schema` the current schema
    pub fn manage_schema(&self, schema: SchemaDefinition) {
        debug!(schema = %schema.name, "Managing schema");
        *self.current.write() = Some(schema);
    }

    /// Makes the schema stored at `path` current, creating and saving an
    /// empty default schema there if none exists.
    pub fn manage_schema_file(&self, path: &Path) -> Result<()> {
        let mut schema = match self.store.load(path)? {
            Some(schema) => schema,
            None => {
                let schema = SchemaDefinition::default();
                self.store
                    .save(&schema, path)
                    .with_context(|| format!("Failed to create schema file {}", path.display()))?;
                schema
            }
        };
        schema.set_file(path);
        self.manage_schema(schema);
        Ok(())
    }

    /// Loads the named schema, saving it if it does not exist yet, and makes
    /// it current. When `use_existing` is false an existing file is first
    /// deleted, or backed up if backups are enabled.
    pub fn set_schema(&self, schema_name: &str, use_existing: bool) -> Result<SchemaDefinition> {
        let path = self.schema_file_path(schema_name);
        let lock = file_lock::named(&path);
        let _guard = lock.lock();

        let exists = self.store.exists(&path);
        if !use_existing && exists {
            if self.backup_existing() {
                let suffix = Uuid::new_v4().simple().to_string();
                let backup_name = format!(
                    "{}_{}_{}",
                    schema_name,
                    julian_date(Utc::now()),
                    &suffix[..4]
                );
                let backup = self.schema_file_path(&backup_name);
                self.store.rename(&path, &backup)?;
                info!(schema = schema_name, backup = %backup.display(), "Backed up existing schema");
            } else {
                self.store.delete(&path)?;
                info!(schema = schema_name, "Deleted existing schema");
            }
        }

        let schema = self.load_schema(schema_name)?;
        if !self.store.exists(&path) {
            self.store.save(&schema, &path)?;
        }
        self.manage_schema(schema.clone());
        Ok(schema)
    }

    /// Like [`set_schema`](Self::set_schema), but fails if the schema
    /// already exists.
    pub fn set_new_schema(&self, schema_name: &str) -> Result<SchemaDefinition> {
        if self.schema_exists(schema_name) {
            return Err(SchemaError::SchemaAlreadyExists {
                name: schema_name.to_string(),
            }
            .into());
        }
        self.set_schema(schema_name, true)
    }

    /// Persists the current schema to its file, or to the default path for
    /// its name.
    pub fn save(&self) -> Result<(), SchemaError> {
        let _guard = self.save_lock.lock();
        let current = self.current.read();
        let Some(schema) = current.as_ref() else {
            return Ok(());
        };
        let path = schema
            .file()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.schema_file_path(&schema.name));
        self.store.save(schema, &path)
    }

    fn mutate(
        &self,
        action: &str,
        op: impl FnOnce(&mut SchemaDefinition) -> Result<String, SchemaError>,
    ) -> ManagerResult {
        let outcome = self
            .ensure_loaded()
            .and_then(|()| {
                let mut current = self.current.write();
                let schema = current.get_or_insert_with(SchemaDefinition::default);
                op(schema).map(|message| (message, schema.name.clone()))
            })
            .and_then(|(message, schema_name)| {
                if self.auto_save() {
                    self.save()?;
                }
                Ok((message, schema_name))
            });

        match outcome {
            Ok((message, schema_name)) => {
                debug!(action, %message, "Schema updated");
                let mut result = ManagerResult::success(message);
                result.schema_name = Some(schema_name);
                result
            }
            Err(e) => {
                warn!(action, error = %e, "Schema update failed");
                ManagerResult::from_error(&e)
            }
        }
    }

    /// Adds a table; an existing table of the same name is left untouched.
    pub fn add_table(&self, table_name: &str, class_name: Option<&str>) -> ManagerResult {
        self.mutate("add_table", |schema| {
            Ok(ops::add_table(schema, table_name, class_name))
        })
    }

    /// Adds a column unless one of the same name exists on the table
    pub fn add_column(&self, table_name: &str, column: Column) -> ManagerResult {
        self.mutate("add_column", |schema| ops::add_column(schema, table_name, column))
    }

    pub fn remove_column(&self, table_name: &str, column_name: &str) -> ManagerResult {
        self.mutate("remove_column", |schema| {
            Ok(ops::remove_column(schema, table_name, column_name))
        })
    }

    pub fn remove_table(&self, table_name: &str) -> ManagerResult {
        self.mutate("remove_table", |schema| Ok(ops::remove_table(schema, table_name)))
    }

    /// Makes `column_name` the table's only key column
    pub fn set_key_column(&self, table_name: &str, column_name: &str) -> ManagerResult {
        self.mutate("set_key_column", |schema| {
            ops::set_key_column(schema, table_name, column_name)
        })
    }

    /// Links `referencing_table.referencing_column` to the key of
    /// `target_table`. The column must be an integral type.
    pub fn set_foreign_key(
        &self,
        target_table: &str,
        referencing_table: &str,
        referencing_column: &str,
    ) -> ManagerResult {
        self.set_foreign_key_with(target_table, referencing_table, referencing_column, None, None)
    }

    pub fn set_foreign_key_with(
        &self,
        target_table: &str,
        referencing_table: &str,
        referencing_column: &str,
        referenced_key: Option<&str>,
        formatter: Option<&dyn NameFormatter>,
    ) -> ManagerResult {
        self.mutate("set_foreign_key", |schema| {
            ops::set_foreign_key(
                schema,
                target_table,
                referencing_table,
                referencing_column,
                referenced_key,
                formatter,
            )
        })
    }

    /// Records an xref between two tables without creating its junction table
    pub fn add_xref(&self, left: &str, right: &str) -> ManagerResult {
        self.mutate("add_xref", |schema| Ok(ops::add_xref(schema, left, right)))
    }

    pub fn remove_xref(&self, xref_table_name: &str) -> ManagerResult {
        self.mutate("remove_xref", |schema| {
            Ok(match schema.remove_xref(xref_table_name) {
                Some(_) => format!("XrefTable {} was removed.", xref_table_name),
                None => format!("XrefTable {} was not found.", xref_table_name),
            })
        })
    }

    /// Creates the `{left}{right}` junction table and its foreign keys
    pub fn set_xref(&self, left: &str, right: &str) -> ManagerResult {
        self.mutate("set_xref", |schema| ops::set_xref(schema, left, right))
    }

    pub fn set_table_class_name(&self, table_name: &str, class_name: &str) -> ManagerResult {
        self.mutate("set_table_class_name", |schema| {
            ops::set_table_class_name(schema, table_name, class_name)
        })
    }

    pub fn set_column_property_name(
        &self,
        table_name: &str,
        column_name: &str,
        property_name: &str,
    ) -> ManagerResult {
        self.mutate("set_column_property_name", |schema| {
            ops::set_column_property_name(schema, table_name, column_name, property_name)
        })
    }

    pub fn add_pre_column_augmentation(&self, augmentation: Arc<dyn SchemaManagerAugmentation>) {
        self.pre_column_augmentations.write().push(augmentation);
    }

    pub fn add_post_column_augmentation(&self, augmentation: Arc<dyn SchemaManagerAugmentation>) {
        self.post_column_augmentations.write().push(augmentation);
    }

    /// Runs the pre-column hooks for `table_name` in registration order
    pub fn execute_pre_column_augmentations(&self, table_name: &str) -> Result<()> {
        Self::execute_augmentations(&self.pre_column_augmentations, table_name, self)
            .with_context(|| format!("Pre-column augmentation failed for table {}", table_name))
    }

    /// Runs the post-column hooks for `table_name` in registration order
    pub fn execute_post_column_augmentations(&self, table_name: &str) -> Result<()> {
        Self::execute_augmentations(&self.post_column_augmentations, table_name, self)
            .with_context(|| format!("Post-column augmentation failed for table {}", table_name))
    }

    fn execute_augmentations(hooks: &Augmentations, table_name: &str, manager: &SchemaManager) -> Result<()> {
        // Hooks may register further hooks through the manager
        let hooks: Vec<_> = hooks.read().clone();
        for hook in hooks {
            hook.execute(table_name, manager)?;
        }
        Ok(())
    }
}
