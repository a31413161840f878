//! Schema column element types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int,
    UInt,
    Long,
    ULong,
    Decimal,
    String,
    ByteArray,
    DateTime,
    /// No direct column mapping
    #[default]
    Default,
}

impl DataType {
    /// Integral kinds are the only valid foreign key sources.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::UInt | DataType::Long | DataType::ULong
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::Int => "Int",
            DataType::UInt => "UInt",
            DataType::Long => "Long",
            DataType::ULong => "ULong",
            DataType::Decimal => "Decimal",
            DataType::String => "String",
            DataType::ByteArray => "ByteArray",
            DataType::DateTime => "DateTime",
            DataType::Default => "Default",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Ok(DataType::Boolean),
            "int" => Ok(DataType::Int),
            "uint" => Ok(DataType::UInt),
            "long" => Ok(DataType::Long),
            "ulong" => Ok(DataType::ULong),
            "decimal" => Ok(DataType::Decimal),
            "string" => Ok(DataType::String),
            "bytearray" => Ok(DataType::ByteArray),
            "datetime" => Ok(DataType::DateTime),
            "default" => Ok(DataType::Default),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

/// Plain column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub allow_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub table_name: String,
    /// Name of the generated property, when it differs from the column name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

impl Column {
    /// Nullable column with no table assigned yet
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            allow_null: true,
            max_length: None,
            table_name: String::new(),
            property_name: None,
        }
    }

    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    pub fn with_max_length(mut self, max_length: Option<u32>) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn property_name(&self) -> &str {
        self.property_name.as_deref().unwrap_or(&self.name)
    }
}

/// Key/identity column.
///
/// Never nullable and always a key: the wrapped column's nullability is
/// pinned on construction and on deserialization, and assignments are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Column", into = "Column")]
pub struct KeyColumn {
    column: Column,
}

impl KeyColumn {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column::new(name, data_type).into()
    }

    /// The `Id` ULong key assumed for tables without one
    pub fn default_key() -> Self {
        Self::new("Id", DataType::ULong)
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn data_type(&self) -> DataType {
        self.column.data_type
    }

    pub fn allow_null(&self) -> bool {
        false
    }

    pub fn key(&self) -> bool {
        true
    }

    /// Ignored: key columns never allow nulls.
    pub fn set_allow_null(&mut self, _allow_null: bool) {}

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn into_column(self) -> Column {
        self.column
    }
}

impl From<Column> for KeyColumn {
    fn from(mut column: Column) -> Self {
        column.allow_null = false;
        Self { column }
    }
}

impl From<KeyColumn> for Column {
    fn from(key: KeyColumn) -> Self {
        key.column
    }
}

/// Column referencing the key of another table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyColumn {
    #[serde(flatten)]
    pub column: Column,
    pub referenced_table: String,
    pub referenced_key: String,
    #[serde(default)]
    pub referencing_class: String,
    #[serde(default)]
    pub referenced_class: String,
    #[serde(default)]
    pub table_class_name: String,
    #[serde(default)]
    pub reference_name: String,
}

impl ForeignKeyColumn {
    pub fn new(
        column: Column,
        referenced_table: impl Into<String>,
        referenced_key: impl Into<String>,
    ) -> Self {
        let referenced_table = referenced_table.into();
        let reference_name = reference_name_for(&column.table_name, &referenced_table, &column.name);
        Self {
            referencing_class: column.table_name.clone(),
            table_class_name: column.table_name.clone(),
            referenced_class: referenced_table.clone(),
            column,
            referenced_table,
            referenced_key: referenced_key.into(),
            reference_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn table_name(&self) -> &str {
        &self.column.table_name
    }

    /// Identity used for upserts into a schema's foreign key list
    pub fn identity(&self) -> (&str, &str) {
        (&self.column.table_name, &self.column.name)
    }

    pub fn is_same_key(&self, other: &ForeignKeyColumn) -> bool {
        self.identity() == other.identity()
    }
}

fn reference_name_for(table: &str, referenced_table: &str, column: &str) -> String {
    format!("FK_{}_{}_{}", table, referenced_table, column)
}

/// A column as stored on a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableColumn {
    Column(Column),
    Key(KeyColumn),
    ForeignKey(ForeignKeyColumn),
}

impl TableColumn {
    fn base(&self) -> &Column {
        match self {
            TableColumn::Column(c) => c,
            TableColumn::Key(k) => k.column(),
            TableColumn::ForeignKey(fk) => &fk.column,
        }
    }

    fn base_mut(&mut self) -> &mut Column {
        match self {
            TableColumn::Column(c) => c,
            TableColumn::Key(k) => &mut k.column,
            TableColumn::ForeignKey(fk) => &mut fk.column,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn data_type(&self) -> DataType {
        self.base().data_type
    }

    pub fn allow_null(&self) -> bool {
        match self {
            TableColumn::Key(k) => k.allow_null(),
            _ => self.base().allow_null,
        }
    }

    pub fn set_allow_null(&mut self, allow_null: bool) {
        match self {
            TableColumn::Key(k) => k.set_allow_null(allow_null),
            _ => self.base_mut().allow_null = allow_null,
        }
    }

    pub fn key(&self) -> bool {
        matches!(self, TableColumn::Key(_))
    }

    pub fn max_length(&self) -> Option<u32> {
        self.base().max_length
    }

    pub fn table_name(&self) -> &str {
        &self.base().table_name
    }

    pub(crate) fn set_table_name(&mut self, table_name: &str) {
        self.base_mut().table_name = table_name.to_string();
    }

    pub fn property_name(&self) -> &str {
        self.base().property_name()
    }

    pub fn set_property_name(&mut self, property_name: impl Into<String>) {
        self.base_mut().property_name = Some(property_name.into());
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKeyColumn> {
        match self {
            TableColumn::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    /// Drops any key or foreign key role, keeping name, type and nullability.
    pub fn into_column(self) -> Column {
        match self {
            TableColumn::Column(c) => c,
            TableColumn::Key(k) => {
                let mut column = k.into_column();
                column.allow_null = false;
                column
            }
            TableColumn::ForeignKey(fk) => fk.column,
        }
    }
}

impl From<Column> for TableColumn {
    fn from(column: Column) -> Self {
        TableColumn::Column(column)
    }
}

impl From<KeyColumn> for TableColumn {
    fn from(key: KeyColumn) -> Self {
        TableColumn::Key(key)
    }
}

impl From<ForeignKeyColumn> for TableColumn {
    fn from(fk: ForeignKeyColumn) -> Self {
        TableColumn::ForeignKey(fk)
    }
}
