//! Applying simplified schema documents through the manager

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::generate::{DaoCodeWriter, DaoGenerator};
use crate::model::{Column, DataType, SchemaDefinition};
use crate::simple::{SimpleForeignKey, SimpleSchema};

use super::{ManagerResult, SchemaManager};

impl SchemaManager {
    /// Replaces the schema named by `simple` with its tables, xrefs and
    /// foreign keys.
    ///
    /// Each table is created, then its pre-column hooks run, then its
    /// columns are added, then its post-column hooks run. Xrefs follow once
    /// every table exists; declared foreign keys come last, each getting a
    /// ULong column on the declaring table.
    pub fn apply_simple_schema(&self, simple: &SimpleSchema) -> Result<SchemaDefinition> {
        simple.validate()?;
        self.set_schema(simple.schema_name(), false)?;

        let mut pending: Vec<(&str, &SimpleForeignKey)> = Vec::new();
        for table in &simple.tables {
            self.add_table(&table.name, None).into_result()?;
            self.execute_pre_column_augmentations(&table.name)?;
            for column in &table.cols {
                self.add_column(&table.name, column.to_column()).into_result()?;
            }
            pending.extend(table.fks.iter().map(|fk| (table.name.as_str(), fk)));
            self.execute_post_column_augmentations(&table.name)?;
        }

        for xref in &simple.xrefs {
            self.set_xref(xref.left(), xref.right()).into_result()?;
        }

        for (table_name, fk) in pending {
            self.add_column(table_name, Column::new(fk.column.as_str(), DataType::ULong))
                .into_result()?;
            self.set_foreign_key(&fk.table, table_name, &fk.column)
                .into_result()?;
        }

        let schema = self.current_schema()?;
        info!(
            schema = %schema.name,
            tables = schema.table_count(),
            foreign_keys = schema.foreign_keys().len(),
            "Applied simplified schema"
        );
        Ok(schema)
    }

    /// Parses `json`, applies it and generates code for the result with
    /// `writer`.
    pub fn generate_from_simple_schema<W: DaoCodeWriter>(
        &self,
        json: &str,
        writer: &mut W,
        root: &Path,
        partials_dir: Option<&Path>,
    ) -> ManagerResult {
        let simple = match SimpleSchema::parse(json) {
            Ok(simple) => simple,
            Err(e) => return ManagerResult::from_error(&e),
        };

        let outcome = self.apply_simple_schema(&simple).and_then(|schema| {
            let mut generator = DaoGenerator::new(simple.name_space(), &mut *writer);
            generator.generate(&schema, root, partials_dir)
        });

        let mut result = match outcome {
            Ok(()) => ManagerResult::success("Generation completed"),
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed");
                ManagerResult::from_error(&*e)
            }
        };
        result.namespace = Some(simple.name_space().to_string());
        result.schema_name = Some(simple.schema_name().to_string());
        result
    }
}
