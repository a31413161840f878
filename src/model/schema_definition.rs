//! Schema definition: the root aggregate of tables, foreign keys and xrefs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

use super::named_list::NamedList;
use super::{ForeignKeyColumn, Table, XrefInfo, XrefTable};

/// The complete schema. Equality ignores the backing file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    pub name: String,
    /// Type of the database this schema was extracted from, if any
    #[serde(default = "default_db_type")]
    pub db_type: String,
    #[serde(skip)]
    file: Option<PathBuf>,
    #[serde(default)]
    tables: NamedList<Table>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKeyColumn>,
    #[serde(default)]
    xrefs: NamedList<XrefTable>,
}

fn default_db_type() -> String {
    "UnSpecified".to_string()
}

impl PartialEq for SchemaDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.db_type == other.db_type
            && self.tables == other.tables
            && self.foreign_keys == other.foreign_keys
            && self.xrefs == other.xrefs
    }
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        Self::new("Default")
    }
}

impl SchemaDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            db_type: default_db_type(),
            file: None,
            tables: NamedList::new(),
            foreign_keys: Vec::new(),
            xrefs: NamedList::new(),
        }
    }

    /// File the schema was loaded from or will be saved to
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn set_file(&mut self, file: impl Into<PathBuf>) {
        self.file = Some(file.into());
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.names()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    /// Adds `table`, replacing an existing table of the same name.
    pub fn add_table(&mut self, table: Table) -> String {
        let name = table.name().to_string();
        if self.tables.upsert(table) {
            format!("Table {} was updated.", name)
        } else {
            format!("Table {} was added.", name)
        }
    }

    /// Replaces every table; duplicate names are rejected and leave the
    /// schema untouched.
    pub fn set_tables(&mut self, tables: Vec<Table>) -> Result<(), SchemaError> {
        let mut replacement = NamedList::new();
        for table in tables {
            let name = table.name().to_string();
            if !replacement.insert_if_absent(table) {
                return Err(SchemaError::DuplicateTable { table: name });
            }
        }
        self.tables = replacement;
        self.refresh_foreign_key_caches();
        Ok(())
    }

    /// Removes a table together with the foreign keys defined on it or
    /// pointing at it.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        let removed = self.tables.remove(name)?;
        let dangling: Vec<ForeignKeyColumn> = self
            .foreign_keys
            .iter()
            .filter(|fk| fk.table_name() == name || fk.referenced_table == name)
            .cloned()
            .collect();
        self.foreign_keys
            .retain(|fk| fk.table_name() != name && fk.referenced_table != name);
        for fk in dangling.iter().filter(|fk| fk.table_name() != name) {
            if let Some(table) = self.tables.get_mut(fk.table_name()) {
                let column = fk.column.clone();
                table.replace_column(column);
            }
        }
        self.refresh_foreign_key_caches();
        Some(removed)
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyColumn] {
        &self.foreign_keys
    }

    /// Adds `fk`, updating in place a foreign key with the same
    /// `(table, column)` identity.
    pub fn add_foreign_key(&mut self, fk: ForeignKeyColumn) -> String {
        match self.foreign_keys.iter_mut().find(|e| e.is_same_key(&fk)) {
            Some(existing) => {
                let message = format!("ForeignKey {} was updated.", fk.reference_name);
                *existing = fk;
                message
            }
            None => {
                let message = format!("ForeignKey {} was added.", fk.reference_name);
                self.foreign_keys.push(fk);
                message
            }
        }
    }

    /// Removes the foreign key identified by `(table_name, column_name)`.
    pub fn remove_foreign_key(&mut self, table_name: &str, column_name: &str) -> Option<ForeignKeyColumn> {
        let position = self
            .foreign_keys
            .iter()
            .position(|fk| fk.identity() == (table_name, column_name))?;
        Some(self.foreign_keys.remove(position))
    }

    /// Foreign keys defined on `table_name`
    pub fn foreign_keys_for_table(&self, table_name: &str) -> Vec<ForeignKeyColumn> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.table_name() == table_name)
            .cloned()
            .collect()
    }

    /// Foreign keys whose referenced table is `table_name`
    pub fn referencing_foreign_keys_for_table(&self, table_name: &str) -> Vec<ForeignKeyColumn> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.referenced_table == table_name)
            .cloned()
            .collect()
    }

    /// Rebuilds every table's forward and back reference lists from the
    /// schema's foreign key list.
    pub fn refresh_foreign_key_caches(&mut self) {
        let names: Vec<String> = self.tables.names().map(str::to_string).collect();
        self.refresh_foreign_key_caches_for(&names);
    }

    /// Rebuilds the reference lists of `table_names` only. Table names are
    /// matched exactly.
    pub fn refresh_foreign_key_caches_for(&mut self, table_names: &[String]) {
        for name in table_names {
            let forward = self.foreign_keys_for_table(name);
            let back = self.referencing_foreign_keys_for_table(name);
            if let Some(table) = self.tables.get_mut(name) {
                for fk in &forward {
                    table.sync_foreign_key_column(fk);
                }
                table.set_foreign_keys(forward);
                table.set_referencing_foreign_keys(back);
            }
        }
    }

    pub(crate) fn foreign_keys_mut(&mut self) -> std::slice::IterMut<'_, ForeignKeyColumn> {
        self.foreign_keys.iter_mut()
    }

    pub fn xrefs(&self) -> impl Iterator<Item = &XrefTable> {
        self.xrefs.iter()
    }

    pub fn xref(&self, name: &str) -> Option<&XrefTable> {
        self.xrefs.get(name)
    }

    pub fn add_xref(&mut self, xref: XrefTable) -> String {
        let name = xref.name().to_string();
        if self.xrefs.upsert(xref) {
            format!("XrefTable {} was updated.", name)
        } else {
            format!("XrefTable {} was added.", name)
        }
    }

    pub fn remove_xref(&mut self, name: &str) -> Option<XrefTable> {
        self.xrefs.remove(name)
    }

    /// Xrefs where `table_name` is the left side
    pub fn left_xrefs_for(&self, table_name: &str) -> Vec<XrefInfo> {
        self.xrefs
            .iter()
            .filter(|x| x.left() == table_name)
            .map(|x| XrefInfo {
                table_name: table_name.to_string(),
                xref_table_name: x.name().to_string(),
                list_table_name: x.right().to_string(),
            })
            .collect()
    }

    /// Xrefs where `table_name` is the right side
    pub fn right_xrefs_for(&self, table_name: &str) -> Vec<XrefInfo> {
        self.xrefs
            .iter()
            .filter(|x| x.right() == table_name)
            .map(|x| XrefInfo {
                table_name: table_name.to_string(),
                xref_table_name: x.name().to_string(),
                list_table_name: x.left().to_string(),
            })
            .collect()
    }

    /// Merges `other` into this schema, upserting tables, foreign keys and xrefs.
    pub fn combine_with(&mut self, other: &SchemaDefinition) -> &mut Self {
        for table in other.tables() {
            self.add_table(table.clone());
        }
        for fk in other.foreign_keys() {
            self.add_foreign_key(fk.clone());
        }
        for xref in other.xrefs() {
            self.add_xref(xref.clone());
        }
        self.refresh_foreign_key_caches();
        self
    }

    /// Checks that every foreign key's source and target tables exist.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for fk in &self.foreign_keys {
            for table in [fk.table_name(), fk.referenced_table.as_str()] {
                if !self.tables.contains(table) {
                    return Err(SchemaError::DanglingForeignKey {
                        table: fk.table_name().to_string(),
                        column: fk.name().to_string(),
                        missing: table.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
