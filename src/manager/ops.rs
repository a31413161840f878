//! Schema mutations applied to a borrowed schema definition.
//!
//! The manager runs these under its write lock; composite operations such as
//! [`set_xref`] call the simpler ones directly so the whole composite runs
//! under a single lock and is saved once.

use crate::error::SchemaError;
use crate::model::{
    xref_table_name, Column, DataType, ForeignKeyColumn, SchemaDefinition, Table, XrefTable,
};
use crate::naming::NameFormatter;

fn table_not_found(table: &str) -> SchemaError {
    SchemaError::TableNotFound {
        table: table.to_string(),
    }
}

fn table_mut<'a>(schema: &'a mut SchemaDefinition, table: &str) -> Result<&'a mut Table, SchemaError> {
    schema.table_mut(table).ok_or_else(|| table_not_found(table))
}

pub(crate) fn add_table(schema: &mut SchemaDefinition, name: &str, class_name: Option<&str>) -> String {
    let table = Table::new(name).with_class_name(class_name);
    if schema.contains_table(table.name()) {
        return format!("Table {} already exists.", table.name());
    }
    schema.add_table(table)
}

pub(crate) fn add_column(
    schema: &mut SchemaDefinition,
    table_name: &str,
    column: Column,
) -> Result<String, SchemaError> {
    let column_name = column.name.clone();
    let table = table_mut(schema, table_name)?;
    if table.add_column(column) {
        Ok(format!("Column {} was added to table {}.", column_name, table_name))
    } else {
        Ok(format!("Column {} already exists on table {}.", column_name, table_name))
    }
}

pub(crate) fn remove_column(schema: &mut SchemaDefinition, table_name: &str, column_name: &str) -> String {
    let removed = schema
        .table_mut(table_name)
        .and_then(|table| table.remove_column(column_name))
        .is_some();
    let removed_fk = schema.remove_foreign_key(table_name, column_name).is_some();
    if removed_fk {
        schema.refresh_foreign_key_caches();
    }
    if removed || removed_fk {
        format!("Column {} was removed from table {}.", column_name, table_name)
    } else {
        format!("Column {} was not found on table {}.", column_name, table_name)
    }
}

pub(crate) fn remove_table(schema: &mut SchemaDefinition, table_name: &str) -> String {
    match schema.remove_table(table_name) {
        Some(_) => format!("Table {} was removed.", table_name),
        None => format!("Table {} was not found.", table_name),
    }
}

pub(crate) fn set_key_column(
    schema: &mut SchemaDefinition,
    table_name: &str,
    column_name: &str,
) -> Result<String, SchemaError> {
    table_mut(schema, table_name)?.set_key_column(column_name)?;
    if schema.remove_foreign_key(table_name, column_name).is_some() {
        schema.refresh_foreign_key_caches();
    }
    Ok(format!("Column {} is now the key of table {}.", column_name, table_name))
}

/// Makes `referencing_table.referencing_column` a foreign key to
/// `target_table`. Nothing is mutated unless every check passes.
pub(crate) fn set_foreign_key(
    schema: &mut SchemaDefinition,
    target_table: &str,
    referencing_table: &str,
    referencing_column: &str,
    referenced_key: Option<&str>,
    formatter: Option<&dyn NameFormatter>,
) -> Result<String, SchemaError> {
    let target = schema
        .table(target_table)
        .ok_or_else(|| table_not_found(target_table))?;
    let referenced_key = referenced_key
        .map(str::to_string)
        .unwrap_or_else(|| target.key_name());
    let referenced_class = target.class_name();

    let referencing = schema
        .table(referencing_table)
        .ok_or_else(|| table_not_found(referencing_table))?;
    let mut column = referencing.column_definition(referencing_column)?;
    if !column.data_type.is_integral() {
        return Err(SchemaError::NonNumericForeignKey {
            table: referencing_table.to_string(),
            column: referencing_column.to_string(),
            data_type: column.data_type,
        });
    }
    let referencing_class = referencing.class_name();

    column.table_name = referencing.name().to_string();
    let mut fk = ForeignKeyColumn::new(column, target.name(), referenced_key);
    fk.referencing_class = referencing_class.clone();
    fk.table_class_name = referencing_class;
    fk.referenced_class = referenced_class;
    if let Some(formatter) = formatter {
        let class_name = formatter.format_class_name(referencing_table);
        fk.referencing_class = class_name.clone();
        fk.table_class_name = class_name;
        fk.referenced_class = formatter.format_class_name(target_table);
        fk.column.property_name =
            Some(formatter.format_property_name(referencing_table, referencing_column));
    }

    let message = schema.add_foreign_key(fk.clone());
    table_mut(schema, referencing_table)?.replace_column(fk);
    schema.refresh_foreign_key_caches();
    Ok(message)
}

pub(crate) fn add_xref(schema: &mut SchemaDefinition, left: &str, right: &str) -> String {
    schema.add_xref(XrefTable::new(left, right))
}

/// Creates the `{left}{right}` junction table with its key, uuid and the two
/// foreign keys. Missing side tables are created empty.
pub(crate) fn set_xref(schema: &mut SchemaDefinition, left: &str, right: &str) -> Result<String, SchemaError> {
    for side in [left, right] {
        add_table(schema, side, None);
    }
    add_xref(schema, left, right);

    let xref_table = xref_table_name(left, right);
    let left_column = format!("{}Id", left);
    let right_column = format!("{}Id", right);
    add_table(schema, &xref_table, None);
    add_column(schema, &xref_table, Column::new("Id", DataType::ULong).with_allow_null(false))?;
    set_key_column(schema, &xref_table, "Id")?;
    add_column(schema, &xref_table, Column::new("Uuid", DataType::String).with_allow_null(false))?;
    add_column(schema, &xref_table, Column::new(left_column.as_str(), DataType::ULong).with_allow_null(false))?;
    add_column(schema, &xref_table, Column::new(right_column.as_str(), DataType::ULong).with_allow_null(false))?;
    set_foreign_key(schema, left, &xref_table, &left_column, None, None)?;
    set_foreign_key(schema, right, &xref_table, &right_column, None, None)?;
    Ok(format!("Xref {} was set.", xref_table))
}

/// Sets a table's class name and re-propagates it onto every foreign key
/// defined on or referencing the table.
pub(crate) fn set_table_class_name(
    schema: &mut SchemaDefinition,
    table_name: &str,
    class_name: &str,
) -> Result<String, SchemaError> {
    table_mut(schema, table_name)?.set_class_name(class_name);
    let mut touched = vec![table_name.to_string()];
    for fk in schema.foreign_keys_mut() {
        let referencing = fk.table_name() == table_name;
        let referenced = fk.referenced_table == table_name;
        if referencing {
            fk.referencing_class = class_name.to_string();
            fk.table_class_name = class_name.to_string();
        }
        if referenced {
            fk.referenced_class = class_name.to_string();
        }
        if referencing || referenced {
            touched.push(fk.table_name().to_string());
            touched.push(fk.referenced_table.clone());
        }
    }
    touched.sort();
    touched.dedup();
    schema.refresh_foreign_key_caches_for(&touched);
    Ok(format!("Table {} class name set to {}.", table_name, class_name))
}

pub(crate) fn set_column_property_name(
    schema: &mut SchemaDefinition,
    table_name: &str,
    column_name: &str,
    property_name: &str,
) -> Result<String, SchemaError> {
    table_mut(schema, table_name)?.set_property_name(column_name, property_name)?;
    let mut touched = Vec::new();
    for fk in schema.foreign_keys_mut() {
        if fk.identity() == (table_name, column_name) {
            fk.column.property_name = Some(property_name.to_string());
            touched.push(fk.table_name().to_string());
            touched.push(fk.referenced_table.clone());
        }
    }
    if !touched.is_empty() {
        schema.refresh_foreign_key_caches_for(&touched);
    }
    Ok(format!(
        "Column {}.{} property name set to {}.",
        table_name, column_name, property_name
    ))
}
