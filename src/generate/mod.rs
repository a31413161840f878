//! Code generation boundary.
//!
//! [`DaoGenerator`] walks a finished schema and asks a [`DaoCodeWriter`] for
//! each artifact in a fixed order. What the artifacts contain is up to the
//! writer.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::error::SchemaError;
use crate::model::{SchemaDefinition, Table};

/// Emits the generated artifacts of a schema
pub trait DaoCodeWriter {
    fn set_namespace(&mut self, namespace: &str);

    /// Once per schema, before any table
    fn write_context_class(&mut self, schema: &SchemaDefinition, root: &Path) -> Result<()>;

    /// Only called when a partials directory is configured
    fn write_partial(&mut self, schema: &SchemaDefinition, partials_dir: &Path, table: &Table) -> Result<()>;

    fn write_dao_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;

    fn write_query_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;

    fn write_paged_query_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;

    /// Alternate view class; only called when enabled on the generator
    fn write_qi_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;

    fn write_collection_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;

    fn write_columns_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()>;
}

/// Drives a [`DaoCodeWriter`] over a schema
#[derive(Debug)]
pub struct DaoGenerator<W: DaoCodeWriter> {
    writer: W,
    namespace: String,
    generate_qi_classes: bool,
}

impl<W: DaoCodeWriter> DaoGenerator<W> {
    pub fn new(namespace: &str, writer: W) -> Self {
        Self {
            writer,
            namespace: namespace.to_string(),
            generate_qi_classes: false,
        }
    }

    pub fn with_qi_classes(mut self, generate_qi_classes: bool) -> Self {
        self.generate_qi_classes = generate_qi_classes;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Writes the context class, then every table's artifacts in table
    /// insertion order.
    pub fn generate(
        &mut self,
        schema: &SchemaDefinition,
        root: &Path,
        partials_dir: Option<&Path>,
    ) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(SchemaError::NamespaceNotSpecified.into());
        }
        info!(schema = %schema.name, namespace = %self.namespace, tables = schema.table_count(), "Generating");

        self.writer.set_namespace(&self.namespace);
        self.writer.write_context_class(schema, root)?;

        for table in schema.tables() {
            debug!(table = table.name(), "Writing table artifacts");
            if let Some(partials_dir) = partials_dir {
                self.writer.write_partial(schema, partials_dir, table)?;
            }
            self.writer.write_dao_class(schema, root, table)?;
            self.writer.write_query_class(schema, root, table)?;
            self.writer.write_paged_query_class(schema, root, table)?;
            if self.generate_qi_classes {
                self.writer.write_qi_class(schema, root, table)?;
            }
            self.writer.write_collection_class(schema, root, table)?;
            self.writer.write_columns_class(schema, root, table)?;
        }
        Ok(())
    }
}

impl<W: DaoCodeWriter + ?Sized> DaoCodeWriter for &mut W {
    fn set_namespace(&mut self, namespace: &str) {
        (**self).set_namespace(namespace)
    }

    fn write_context_class(&mut self, schema: &SchemaDefinition, root: &Path) -> Result<()> {
        (**self).write_context_class(schema, root)
    }

    fn write_partial(&mut self, schema: &SchemaDefinition, partials_dir: &Path, table: &Table) -> Result<()> {
        (**self).write_partial(schema, partials_dir, table)
    }

    fn write_dao_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_dao_class(schema, root, table)
    }

    fn write_query_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_query_class(schema, root, table)
    }

    fn write_paged_query_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_paged_query_class(schema, root, table)
    }

    fn write_qi_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_qi_class(schema, root, table)
    }

    fn write_collection_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_collection_class(schema, root, table)
    }

    fn write_columns_class(&mut self, schema: &SchemaDefinition, root: &Path, table: &Table) -> Result<()> {
        (**self).write_columns_class(schema, root, table)
    }
}
