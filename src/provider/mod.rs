//! Schema provider: turns described types into a schema definition
//!
//! Inference yields a [`TypeSchema`](crate::types::TypeSchema); the provider
//! writes it through a [`SchemaManager`](crate::manager::SchemaManager),
//! optionally splitting inheritance chains into one table per level.

mod namespaces;
mod options;
mod schema_provider;

pub use namespaces::{DataNamespaces, DEFAULT_BASE_NAMESPACE};
pub use options::{DefaultDataTypeBehavior, ProviderOptions};
pub use schema_provider::{register_augmentations, SchemaDefinitionCreateResult, SchemaProvider};
