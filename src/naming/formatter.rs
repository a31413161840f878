//! Name formatters, name maps and table name providers

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::SchemaDefinition;
use crate::types::TypeDescriptor;

use super::{class_name, NameCollisionResolver};

/// Maps table and column names to generated class and property names
pub trait NameFormatter: Send + Sync {
    fn format_class_name(&self, table_name: &str) -> String;
    fn format_property_name(&self, table_name: &str, column_name: &str) -> String;
}

/// Identity formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoNameFormatter;

impl NameFormatter for EchoNameFormatter {
    fn format_class_name(&self, table_name: &str) -> String {
        table_name.to_string()
    }

    fn format_property_name(&self, _table_name: &str, column_name: &str) -> String {
        column_name.to_string()
    }
}

/// Maps a type descriptor to the name of the table storing it
pub trait TableNameProvider: Send + Sync {
    fn table_name(&self, descriptor: &TypeDescriptor) -> String;
}

/// Uses the type name as the table name
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTableNameProvider;

impl TableNameProvider for EchoTableNameProvider {
    fn table_name(&self, descriptor: &TypeDescriptor) -> String {
        descriptor.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableClassName {
    pub table_name: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPropertyName {
    pub table_name: String,
    pub column_name: String,
    pub property_name: String,
}

/// Explicit table → class and column → property names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNameMap {
    #[serde(default)]
    pub table_names_to_class_names: Vec<TableClassName>,
    #[serde(default)]
    pub column_names_to_property_names: Vec<ColumnPropertyName>,
}

impl SchemaNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped class name, or one derived from the table name
    pub fn class_name(&self, table_name: &str) -> String {
        self.table_names_to_class_names
            .iter()
            .find(|m| m.table_name == table_name)
            .map(|m| m.class_name.clone())
            .unwrap_or_else(|| class_name(table_name))
    }

    /// Mapped property name, or the column name
    pub fn property_name(&self, table_name: &str, column_name: &str) -> String {
        self.column_names_to_property_names
            .iter()
            .find(|m| m.table_name == table_name && m.column_name == column_name)
            .map(|m| m.property_name.clone())
            .unwrap_or_else(|| column_name.to_string())
    }

    pub fn set_class_name(&mut self, table_name: &str, class_name: &str) {
        match self
            .table_names_to_class_names
            .iter_mut()
            .find(|m| m.table_name == table_name)
        {
            Some(existing) => existing.class_name = class_name.to_string(),
            None => self.table_names_to_class_names.push(TableClassName {
                table_name: table_name.to_string(),
                class_name: class_name.to_string(),
            }),
        }
    }

    pub fn set_property_name(&mut self, table_name: &str, column_name: &str, property_name: &str) {
        match self
            .column_names_to_property_names
            .iter_mut()
            .find(|m| m.table_name == table_name && m.column_name == column_name)
        {
            Some(existing) => existing.property_name = property_name.to_string(),
            None => self.column_names_to_property_names.push(ColumnPropertyName {
                table_name: table_name.to_string(),
                column_name: column_name.to_string(),
                property_name: property_name.to_string(),
            }),
        }
    }

    /// Builds a map for every table and column of `schema`. Class names are
    /// unique across the schema; property names are unique within their
    /// class and never equal to the class name.
    pub fn from_schema(schema: &SchemaDefinition, resolver: &NameCollisionResolver) -> Self {
        let mut map = SchemaNameMap::new();
        let mut used_classes: HashSet<String> = HashSet::new();
        for table in schema.tables() {
            let class = resolver.resolve(&class_name(table.name()), |n| used_classes.contains(n));
            used_classes.insert(class.clone());
            map.set_class_name(table.name(), &class);

            let mut used_properties: HashSet<String> = HashSet::new();
            used_properties.insert(class.clone());
            for column in table.columns() {
                let property =
                    resolver.resolve(&class_name(column.name()), |n| used_properties.contains(n));
                used_properties.insert(property.clone());
                map.set_property_name(table.name(), column.name(), &property);
            }
        }
        map
    }
}

/// Formatter backed by a [`SchemaNameMap`]
#[derive(Debug, Clone, Default)]
pub struct SchemaNameMapFormatter {
    pub name_map: Option<SchemaNameMap>,
}

impl SchemaNameMapFormatter {
    pub fn new(name_map: SchemaNameMap) -> Self {
        Self {
            name_map: Some(name_map),
        }
    }
}

impl NameFormatter for SchemaNameMapFormatter {
    fn format_class_name(&self, table_name: &str) -> String {
        match &self.name_map {
            Some(map) => map.class_name(table_name),
            None => table_name.to_string(),
        }
    }

    fn format_property_name(&self, table_name: &str, column_name: &str) -> String {
        match &self.name_map {
            Some(map) => map.property_name(table_name, column_name),
            None => column_name.to_string(),
        }
    }
}
