//! Schema persistence and artifact path policies

mod path_provider;
mod store;

pub use path_provider::{schema_file_path, SchemaPathProvider, SchemaTempPathProvider};
pub use store::{write_json_file, JsonFileStore, MemoryStore, SchemaStore};
