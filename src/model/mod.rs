//! Relational schema model

mod elements;
mod named_list;
mod schema_definition;
mod table;

pub use elements::*;
pub use named_list::{Named, NamedList};
pub use schema_definition::SchemaDefinition;
pub use table::{xref_table_name, Table, XrefInfo, XrefTable};
