//! Hooks run around the column generation of each table

use anyhow::Result;

use crate::model::{Column, DataType};

use super::SchemaManager;

/// A hook invoked with a table name and the manager generating it. Hooks may
/// perform any further mutation through the manager.
pub trait SchemaManagerAugmentation: Send + Sync {
    fn execute(&self, table_name: &str, manager: &SchemaManager) -> Result<()>;
}

/// Adds an `Id` ULong key column
#[derive(Debug, Clone, Copy, Default)]
pub struct AddIdKeyColumnAugmentation;

impl SchemaManagerAugmentation for AddIdKeyColumnAugmentation {
    fn execute(&self, table_name: &str, manager: &SchemaManager) -> Result<()> {
        manager
            .add_column(table_name, Column::new("Id", DataType::ULong).with_allow_null(false))
            .into_result()?;
        manager.set_key_column(table_name, "Id").into_result()?;
        Ok(())
    }
}

/// Adds `Created` and `Modified` timestamps, optionally with the users
/// responsible for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddAuditColumnsAugmentation {
    pub include_created_by: bool,
    pub include_modified_by: bool,
}

impl SchemaManagerAugmentation for AddAuditColumnsAugmentation {
    fn execute(&self, table_name: &str, manager: &SchemaManager) -> Result<()> {
        let mut columns = vec![
            Column::new("Created", DataType::DateTime),
            Column::new("Modified", DataType::DateTime),
        ];
        if self.include_created_by {
            columns.push(Column::new("CreatedBy", DataType::String));
        }
        if self.include_modified_by {
            columns.push(Column::new("ModifiedBy", DataType::String));
        }
        for column in columns {
            manager.add_column(table_name, column).into_result()?;
        }
        Ok(())
    }
}
