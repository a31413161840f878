//! Simplified schema documents.
//!
//! A compact JSON description of tables, columns, foreign keys and xrefs:
//!
//! ```json
//! {
//!   "nameSpace": "Blogging.Data",
//!   "schemaName": "Blogging",
//!   "tables": [
//!     { "name": "Blog", "cols": [{ "name": "Title", "type": "String", "null": false }] },
//!     { "name": "Post", "fks": [{ "column": "BlogId", "table": "Blog" }] }
//!   ],
//!   "xrefs": [["Post", "Tag"]]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SchemaError;
use crate::model::{Column, DataType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleSchema {
    #[serde(default)]
    pub name_space: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub tables: Vec<SimpleTable>,
    #[serde(default)]
    pub xrefs: Vec<SimpleXref>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTable {
    pub name: String,
    #[serde(default)]
    pub cols: Vec<SimpleColumn>,
    #[serde(default)]
    pub fks: Vec<SimpleForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleColumn {
    pub name: String,
    #[serde(rename = "type", deserialize_with = "deserialize_data_type")]
    pub data_type: DataType,
    #[serde(default = "default_null")]
    pub null: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
}

fn default_null() -> bool {
    true
}

fn deserialize_data_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DataType, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl SimpleColumn {
    pub fn to_column(&self) -> Column {
        Column::new(self.name.as_str(), self.data_type)
            .with_allow_null(self.null)
            .with_max_length(self.max_length)
    }
}

/// `column` on the declaring table references `table`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleForeignKey {
    pub column: String,
    pub table: String,
}

/// `[left, right]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleXref(pub String, pub String);

impl SimpleXref {
    pub fn left(&self) -> &str {
        &self.0
    }

    pub fn right(&self) -> &str {
        &self.1
    }
}

fn parse_error(message: impl Into<String>) -> SchemaError {
    SchemaError::SimpleSchemaParse {
        message: message.into(),
    }
}

impl SimpleSchema {
    /// Parses and validates a simplified schema document
    pub fn parse(json: &str) -> Result<Self, SchemaError> {
        let schema: SimpleSchema =
            serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn name_space(&self) -> &str {
        self.name_space.as_deref().unwrap_or_default()
    }

    pub fn schema_name(&self) -> &str {
        self.schema_name.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name_space().trim().is_empty() {
            return Err(SchemaError::NamespaceNotSpecified);
        }
        if self.schema_name().trim().is_empty() {
            return Err(SchemaError::SchemaNameNotSpecified);
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(parse_error("table name is required"));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
            if let Some(column) = table.cols.iter().find(|c| c.name.trim().is_empty()) {
                return Err(parse_error(format!(
                    "column name is required on table {} ({})",
                    table.name, column.data_type
                )));
            }
            if table
                .fks
                .iter()
                .any(|fk| fk.column.trim().is_empty() || fk.table.trim().is_empty())
            {
                return Err(parse_error(format!(
                    "foreign keys on table {} need both column and table",
                    table.name
                )));
            }
        }

        for (i, xref) in self.xrefs.iter().enumerate() {
            if xref.left().trim().is_empty() || xref.right().trim().is_empty() {
                return Err(parse_error(format!("xref {} needs two table names", i)));
            }
        }
        Ok(())
    }
}
