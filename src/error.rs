//! Error types for rust-daoschema

use std::path::PathBuf;
use thiserror::Error;

use crate::model::DataType;

/// Errors that can occur while inferring, mutating or persisting a schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("The specified table {table} was not found")]
    TableNotFound { table: String },

    #[error("The specified column {column} was not found on the table {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("The specified column must be a number type: {table}.{column} is {data_type}")]
    NonNumericForeignKey {
        table: String,
        column: String,
        data_type: DataType,
    },

    #[error("Table named {table} defined more than once")]
    DuplicateTable { table: String },

    #[error("Foreign key {table}.{column} references missing table {missing}")]
    DanglingForeignKey {
        table: String,
        column: String,
        missing: String,
    },

    #[error("Type descriptor not found: {name}")]
    UnknownType { name: String },

    #[error("Please specify nameSpace")]
    NamespaceNotSpecified,

    #[error("Please specify schemaName")]
    SchemaNameNotSpecified,

    #[error("The specified schema already exists: {name}")]
    SchemaAlreadyExists { name: String },

    #[error("No types specified")]
    NoTypesSpecified,

    #[error("Invalid simplified schema: {message}")]
    SimpleSchemaParse { message: String },

    #[error("Invalid type catalog: {message}")]
    TypeCatalogParse { message: String },

    #[error("Invalid settings file {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    #[error("Type schema warnings:\n{warnings}")]
    TypeSchemaWarnings { warnings: String },

    #[error("Failed to read schema file: {path}")]
    SchemaReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write schema file: {path}")]
    SchemaWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize schema {name}")]
    SchemaSerializeError {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse schema file: {path}")]
    SchemaParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
