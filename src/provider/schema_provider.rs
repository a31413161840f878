//! Materialising inferred type schemas as schema definitions

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::manager::{
    AddAuditColumnsAugmentation, AddIdKeyColumnAugmentation, SchemaManager,
};
use crate::model::{Column, DataType, ForeignKeyColumn, KeyColumn, SchemaDefinition};
use crate::naming::{EchoTableNameProvider, TableNameProvider};
use crate::persistence::{SchemaPathProvider, SchemaTempPathProvider};
use crate::types::{
    infer_type_schema, FieldDescriptor, TypeInheritanceDescriptor, TypeSchema, TypeSchemaWarnings,
    TypeSource, DEFAULT_KEY_FIELD,
};
use crate::util::letters_only;

use super::{DataNamespaces, ProviderOptions};

/// Registers the built-in augmentations enabled in `options`: the `Id` key
/// before columns, the audit columns after them.
pub fn register_augmentations(options: &ProviderOptions, manager: &SchemaManager) {
    if options.add_id_field {
        manager.add_pre_column_augmentation(Arc::new(AddIdKeyColumnAugmentation));
    }
    if options.add_audit_fields {
        manager.add_post_column_augmentation(Arc::new(AddAuditColumnsAugmentation {
            include_created_by: options.include_created_by,
            include_modified_by: options.include_modified_by,
        }));
    }
}

/// Everything produced by one schema creation pass
#[derive(Debug, Clone)]
pub struct SchemaDefinitionCreateResult {
    pub schema: SchemaDefinition,
    pub type_schema: TypeSchema,
    /// Key columns added for types that declare no key
    pub missing_key_columns: Vec<KeyColumn>,
    /// Foreign key columns added for children lacking a referencing field
    pub missing_foreign_key_columns: Vec<ForeignKeyColumn>,
    pub warnings: TypeSchemaWarnings,
}

impl SchemaDefinitionCreateResult {
    /// Every synthesized column, keys first
    pub fn missing_columns(&self) -> Vec<Column> {
        self.missing_key_columns
            .iter()
            .map(|k| k.column().clone())
            .chain(self.missing_foreign_key_columns.iter().map(|fk| fk.column.clone()))
            .collect()
    }
}

/// Builds type schemas from described types and writes them into a
/// [`SchemaManager`] as tables, keys, foreign keys and xrefs.
pub struct SchemaProvider {
    options: ProviderOptions,
    manager: Arc<SchemaManager>,
    table_name_provider: Arc<dyn TableNameProvider>,
    path_provider: Arc<dyn SchemaPathProvider>,
}

impl SchemaProvider {
    /// Registers the augmentations enabled in `options` on `manager`.
    pub fn new(options: ProviderOptions, manager: Arc<SchemaManager>) -> Self {
        register_augmentations(&options, &manager);
        let path_provider = Arc::new(SchemaTempPathProvider::new(manager.data_dir()));
        Self {
            options,
            manager,
            table_name_provider: Arc::new(EchoTableNameProvider),
            path_provider,
        }
    }

    pub fn with_table_name_provider(mut self, provider: Arc<dyn TableNameProvider>) -> Self {
        self.table_name_provider = provider;
        self
    }

    pub fn with_path_provider(mut self, provider: Arc<dyn SchemaPathProvider>) -> Self {
        self.path_provider = provider;
        self
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    pub fn manager(&self) -> &Arc<SchemaManager> {
        &self.manager
    }

    /// Namespaces derived from the first root type
    pub fn data_namespaces(&self, source: &dyn TypeSource, roots: &[&str]) -> DataNamespaces {
        DataNamespaces::for_type(roots.first().and_then(|root| source.descriptor(root)))
    }

    /// Directory for the generated artifacts of `result`
    pub fn schema_temp_path(&self, result: &SchemaDefinitionCreateResult) -> PathBuf {
        self.path_provider
            .schema_temp_path(&result.schema, Some(&result.type_schema))
    }

    pub fn create_type_schema(
        &self,
        source: &dyn TypeSource,
        roots: &[&str],
        name: Option<&str>,
    ) -> Result<TypeSchema> {
        info!(roots = ?roots, "Creating type schema started");
        let type_schema = infer_type_schema(source, roots, name)?;
        if self.options.fail_on_warnings {
            type_schema.warnings.clone().into_result()?;
        }
        info!(schema = %type_schema.name, "Creating type schema finished");
        Ok(type_schema)
    }

    /// Infers a type schema from `roots` and writes it into a freshly
    /// replaced schema named `schema_name`, or `_{type schema name}_`.
    pub fn create_schema_definition(
        &self,
        source: &dyn TypeSource,
        roots: &[&str],
        schema_name: Option<&str>,
    ) -> Result<SchemaDefinitionCreateResult> {
        let type_schema = self.create_type_schema(source, roots, schema_name)?;
        let schema_name = schema_name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("_{}_", type_schema.name));
        self.manager.set_schema(&schema_name, false)?;

        info!(schema = %schema_name, "Writing schema started");
        self.add_schema_tables(source, &type_schema)?;
        let missing_key_columns = self.add_missing_keys(source, &type_schema)?;
        let missing_foreign_key_columns = self.add_missing_foreign_keys(source, &type_schema)?;

        for fk in &type_schema.foreign_keys {
            let result = self.manager.set_foreign_key(
                &self.table_name(source, &fk.primary_key_type),
                &self.table_name(source, &fk.foreign_key_type),
                &fk.foreign_key_field.name,
            );
            if !result.success {
                warn!(
                    parent = %fk.primary_key_type,
                    child = %fk.foreign_key_type,
                    message = %result.message,
                    "Foreign key not applied"
                );
            }
        }
        for xref in &type_schema.xrefs {
            self.manager
                .set_xref(
                    &self.table_name(source, &xref.left),
                    &self.table_name(source, &xref.right),
                )
                .into_result()?;
        }

        let schema = self.manager.current_schema()?;
        info!(
            schema = %schema.name,
            tables = schema.table_count(),
            foreign_keys = schema.foreign_keys().len(),
            "Writing schema finished"
        );
        Ok(SchemaDefinitionCreateResult {
            schema,
            warnings: type_schema.warnings.clone(),
            type_schema,
            missing_key_columns,
            missing_foreign_key_columns,
        })
    }

    fn table_name(&self, source: &dyn TypeSource, type_name: &str) -> String {
        match source.descriptor(type_name) {
            Some(descriptor) => self.table_name_provider.table_name(descriptor),
            None => type_name.to_string(),
        }
    }

    fn add_schema_tables(&self, source: &dyn TypeSource, type_schema: &TypeSchema) -> Result<()> {
        for type_name in &type_schema.tables {
            if self.options.use_inheritance {
                self.add_inheritance_tables(source, type_name)?;
                continue;
            }
            let table_name = self.table_name(source, type_name);
            self.manager.add_table(&table_name, None).into_result()?;
            self.manager.execute_pre_column_augmentations(&table_name)?;
            self.add_field_columns(&table_name, source.writable_fields(type_name))?;
            self.manager.execute_post_column_augmentations(&table_name)?;
        }
        Ok(())
    }

    /// One table per inheritance level, most-ancestral first. The first
    /// level's `Id` is its key; every later level's `Id` references the
    /// previous level's.
    fn add_inheritance_tables(&self, source: &dyn TypeSource, type_name: &str) -> Result<()> {
        let inheritance = TypeInheritanceDescriptor::new(source, type_name)?;
        debug!(type_name, depth = inheritance.depth(), "Splitting inheritance chain");

        let mut inherit_from: Option<String> = None;
        for level in inheritance.root_first() {
            let table_name = self.table_name_provider.table_name(level.descriptor);
            self.manager.add_table(&table_name, None).into_result()?;
            self.manager.execute_pre_column_augmentations(&table_name)?;
            self.add_field_columns(&table_name, level.declared_fields().collect())?;
            self.manager.execute_post_column_augmentations(&table_name)?;

            self.manager
                .add_column(
                    &table_name,
                    Column::new(DEFAULT_KEY_FIELD, DataType::ULong).with_allow_null(false),
                )
                .into_result()?;
            let linked = match &inherit_from {
                Some(parent) => self.manager.set_foreign_key_with(
                    parent,
                    &table_name,
                    DEFAULT_KEY_FIELD,
                    Some(DEFAULT_KEY_FIELD),
                    None,
                ),
                None => self.manager.set_key_column(&table_name, DEFAULT_KEY_FIELD),
            };
            linked.into_result()?;
            inherit_from = Some(table_name);
        }
        Ok(())
    }

    /// Adds a column per mappable field. Collections are skipped, as are
    /// unmapped fields unless the default data type behavior includes them.
    fn add_field_columns(&self, table_name: &str, fields: Vec<&FieldDescriptor>) -> Result<()> {
        let has_designated_key = fields.iter().any(|f| f.key);
        for field in fields {
            if field.field_type.is_collection() {
                continue;
            }
            let data_type = match field.field_type.data_type() {
                DataType::Default => match self.options.default_data_type_behavior.data_type() {
                    Some(data_type) => data_type,
                    None => continue,
                },
                data_type => data_type,
            };
            let column_name = letters_only(&field.name);
            self.manager
                .add_column(table_name, Column::new(column_name.as_str(), data_type))
                .into_result()?;
            if field.key || (!has_designated_key && field.name == DEFAULT_KEY_FIELD) {
                self.manager.set_key_column(table_name, &column_name).into_result()?;
            }
        }
        Ok(())
    }

    fn add_missing_keys(&self, source: &dyn TypeSource, type_schema: &TypeSchema) -> Result<Vec<KeyColumn>> {
        let mut missing: Vec<KeyColumn> = Vec::new();
        for fk in type_schema
            .foreign_keys
            .iter()
            .filter(|fk| fk.primary_key_field.synthesized)
        {
            let table_name = self.table_name(source, &fk.primary_key_type);
            if self.options.use_inheritance
                && self.is_inheritance_link(&table_name, &fk.primary_key_field.name)?
            {
                continue;
            }
            let mut column = Column::new(fk.primary_key_field.name.as_str(), DataType::ULong)
                .with_allow_null(false);
            column.table_name = table_name.clone();
            let key = KeyColumn::from(column);

            self.manager
                .add_column(&table_name, key.column().clone())
                .into_result()?;
            self.manager.set_key_column(&table_name, key.name()).into_result()?;
            if !missing.contains(&key) {
                missing.push(key);
            }
        }
        Ok(missing)
    }

    /// A derived level's `Id` already references its parent level and
    /// stays a foreign key.
    fn is_inheritance_link(&self, table_name: &str, column_name: &str) -> Result<bool> {
        let table = self.manager.table(table_name)?;
        Ok(table
            .and_then(|t| t.column(column_name).map(|c| c.as_foreign_key().is_some()))
            .unwrap_or(false))
    }

    fn add_missing_foreign_keys(
        &self,
        source: &dyn TypeSource,
        type_schema: &TypeSchema,
    ) -> Result<Vec<ForeignKeyColumn>> {
        let mut missing = Vec::new();
        for fk in type_schema
            .foreign_keys
            .iter()
            .filter(|fk| fk.foreign_key_field.synthesized)
        {
            let parent_table = self.table_name(source, &fk.primary_key_type);
            let child_table = self.table_name(source, &fk.foreign_key_type);
            let referenced_key = fk.primary_key_field.name.as_str();

            let mut column = Column::new(fk.foreign_key_field.name.as_str(), DataType::ULong);
            column.table_name = child_table.clone();
            self.manager
                .add_column(&child_table, column.clone())
                .into_result()?;
            self.manager
                .set_foreign_key_with(&parent_table, &child_table, &column.name, Some(referenced_key), None)
                .into_result()?;
            missing.push(ForeignKeyColumn::new(column, parent_table, referenced_key));
        }
        Ok(missing)
    }
}

impl std::fmt::Debug for SchemaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaProvider")
            .field("options", &self.options)
            .field("manager", &self.manager)
            .finish()
    }
}
