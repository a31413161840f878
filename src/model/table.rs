//! Tables and cross-reference tables

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::naming;
use crate::util::strip_whitespace;

use super::named_list::{Named, NamedList};
use super::{Column, ForeignKeyColumn, KeyColumn, TableColumn};

impl Named for TableColumn {
    fn name(&self) -> &str {
        TableColumn::name(self)
    }
}

impl Named for ForeignKeyColumn {
    fn name(&self) -> &str {
        ForeignKeyColumn::name(self)
    }
}

/// A relational table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(default)]
    columns: NamedList<TableColumn>,
    /// Foreign keys defined on this table
    #[serde(default)]
    foreign_keys: NamedList<ForeignKeyColumn>,
    /// Foreign keys of other tables pointing at this one; a cache maintained
    /// by the owning schema definition
    #[serde(default)]
    referencing_foreign_keys: Vec<ForeignKeyColumn>,
}

impl Named for Table {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Table {
    /// New table; whitespace is stripped from `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: strip_whitespace(name),
            class_name: None,
            columns: NamedList::new(),
            foreign_keys: NamedList::new(),
            referencing_foreign_keys: Vec::new(),
        }
    }

    pub fn with_class_name(mut self, class_name: Option<&str>) -> Self {
        self.class_name = class_name.map(str::to_string);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicit class name, or one derived from the table name
    pub fn class_name(&self) -> String {
        match &self.class_name {
            Some(class_name) if !class_name.is_empty() => class_name.clone(),
            _ => naming::class_name(&self.name),
        }
    }

    pub fn set_class_name(&mut self, class_name: &str) {
        self.class_name = Some(class_name.to_string());
    }

    pub fn columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name) || self.foreign_keys.contains(name)
    }

    /// Column by name as a plain column, including foreign keys known only
    /// through the table's foreign key list.
    pub(crate) fn column_definition(&self, name: &str) -> Result<Column, SchemaError> {
        if let Some(column) = self.columns.get(name) {
            return Ok(column.clone().into_column());
        }
        if let Some(fk) = self.foreign_keys.get(name) {
            return Ok(fk.column.clone());
        }
        Err(self.column_not_found(name))
    }

    /// Adds `column` unless a column of the same name exists. Returns whether it was added.
    pub fn add_column(&mut self, column: impl Into<TableColumn>) -> bool {
        let mut column = column.into();
        column.set_table_name(&self.name);
        if let TableColumn::ForeignKey(fk) = &column {
            if fk.referenced_table == self.name {
                self.referencing_foreign_keys.push(fk.clone());
            }
            if !self.foreign_keys.contains(fk.name()) {
                self.foreign_keys.insert_if_absent(fk.clone());
            }
        }
        self.columns.insert_if_absent(column)
    }

    pub fn remove_column(&mut self, name: &str) -> Option<TableColumn> {
        self.columns.remove(name)
    }

    /// Replaces a column in place, keeping its position, or appends it.
    pub(crate) fn replace_column(&mut self, column: impl Into<TableColumn>) {
        let mut column = column.into();
        column.set_table_name(&self.name);
        self.columns.upsert(column);
    }

    /// The key column, if one has been set
    pub fn key(&self) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.key())
    }

    /// Name of the key column, or `Id` when none is set
    pub fn key_name(&self) -> String {
        self.key()
            .map(|k| k.name().to_string())
            .unwrap_or_else(|| KeyColumn::default_key().name().to_string())
    }

    /// Makes `name` the single key column, demoting any previous key back to
    /// a plain column.
    pub fn set_key_column(&mut self, name: &str) -> Result<(), SchemaError> {
        if !self.columns.contains(name) {
            return Err(self.column_not_found(name));
        }
        let previous = self
            .columns
            .iter()
            .find(|c| c.key() && c.name() != name)
            .cloned();
        if let Some(previous) = previous {
            self.columns.upsert(TableColumn::Column(previous.into_column()));
        }
        if let Some(target) = self.columns.get(name).cloned() {
            if !target.key() {
                self.columns
                    .upsert(TableColumn::Key(KeyColumn::from(target.into_column())));
            }
        }
        Ok(())
    }

    pub fn property_name(&self, column_name: &str) -> Option<&str> {
        self.columns
            .get(column_name)
            .map(TableColumn::property_name)
            .or_else(|| {
                self.foreign_keys
                    .get(column_name)
                    .map(|fk| fk.column.property_name())
            })
    }

    pub fn set_property_name(
        &mut self,
        column_name: &str,
        property_name: &str,
    ) -> Result<(), SchemaError> {
        if let Some(column) = self.columns.get_mut(column_name) {
            column.set_property_name(property_name);
            if let Some(fk) = self.foreign_keys.get_mut(column_name) {
                fk.column.property_name = Some(property_name.to_string());
            }
            return Ok(());
        }
        if let Some(fk) = self.foreign_keys.get_mut(column_name) {
            fk.column.property_name = Some(property_name.to_string());
            return Ok(());
        }
        Err(self.column_not_found(column_name))
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKeyColumn> {
        self.foreign_keys.iter()
    }

    pub fn referencing_foreign_keys(&self) -> &[ForeignKeyColumn] {
        &self.referencing_foreign_keys
    }

    pub(crate) fn set_foreign_keys(&mut self, foreign_keys: Vec<ForeignKeyColumn>) {
        self.foreign_keys.clear();
        for fk in foreign_keys {
            self.foreign_keys.upsert(fk);
        }
    }

    pub(crate) fn set_referencing_foreign_keys(&mut self, foreign_keys: Vec<ForeignKeyColumn>) {
        self.referencing_foreign_keys = foreign_keys;
    }

    /// Mirrors updated foreign key attributes onto the matching column.
    pub(crate) fn sync_foreign_key_column(&mut self, fk: &ForeignKeyColumn) {
        if let Some(TableColumn::ForeignKey(existing)) = self.columns.get_mut(fk.name()) {
            *existing = fk.clone();
        }
    }

    fn column_not_found(&self, column: &str) -> SchemaError {
        SchemaError::ColumnNotFound {
            table: self.name.clone(),
            column: column.to_string(),
        }
    }
}

/// Many-to-many junction between two tables; named `{left}{right}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "XrefParts", into = "XrefParts")]
pub struct XrefTable {
    name: String,
    left: String,
    right: String,
}

#[derive(Serialize, Deserialize)]
struct XrefParts {
    left: String,
    right: String,
}

impl From<XrefParts> for XrefTable {
    fn from(parts: XrefParts) -> Self {
        XrefTable::new(&parts.left, &parts.right)
    }
}

impl From<XrefTable> for XrefParts {
    fn from(xref: XrefTable) -> Self {
        XrefParts {
            left: xref.left,
            right: xref.right,
        }
    }
}

impl Named for XrefTable {
    fn name(&self) -> &str {
        &self.name
    }
}

impl XrefTable {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            name: xref_table_name(left, right),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }
}

/// Junction table name for `left` and `right`
pub fn xref_table_name(left: &str, right: &str) -> String {
    strip_whitespace(&format!("{}{}", left, right))
}

/// One side of an xref as seen from a participating table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefInfo {
    pub table_name: String,
    pub xref_table_name: String,
    pub list_table_name: String,
}

impl XrefInfo {
    /// Name of the generated collection property for the other side
    pub fn property_name(&self) -> String {
        naming::pluralize(&self.list_table_name)
    }
}
