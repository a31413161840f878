//! Schema manager: idempotent mutation of a current schema definition
//!
//! Wraps a [`SchemaDefinition`](crate::model::SchemaDefinition) with table,
//! column, key, foreign key and xref operations, lazy loading, auto-save and
//! augmentation hooks.

mod augmentation;
mod file_lock;
mod mapped;
mod ops;
mod result;
mod schema_manager;
mod simple_import;

pub use augmentation::{
    AddAuditColumnsAugmentation, AddIdKeyColumnAugmentation, SchemaManagerAugmentation,
};
pub use mapped::MappedSchemaDefinition;
pub use result::ManagerResult;
pub use schema_manager::{SchemaManager, SchemaManagerOptions};
