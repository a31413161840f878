//! Integration tests for writing inferred schemas through the provider

use std::sync::Arc;

use pretty_assertions::assert_eq;

use rust_daoschema::manager::SchemaManager;
use rust_daoschema::model::{DataType, SchemaDefinition};
use rust_daoschema::naming::TableNameProvider;
use rust_daoschema::provider::{DefaultDataTypeBehavior, ProviderOptions, SchemaProvider};
use rust_daoschema::types::{FieldDescriptor, ScalarType, TypeCatalog, TypeDescriptor};

use crate::common::{animal_catalog, blog_catalog, id, order_catalog, TestContext};

fn provider(ctx: &TestContext, options: ProviderOptions) -> SchemaProvider {
    SchemaProvider::new(options, Arc::new(ctx.manager()))
}

fn columns(schema: &SchemaDefinition, table: &str) -> Vec<String> {
    schema
        .table(table)
        .unwrap_or_else(|| panic!("table {} should exist", table))
        .column_names()
        .map(str::to_string)
        .collect()
}

/// `Library` has no key and `Shelf` no reference back to it
fn library_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::new("Library", "Books")
                .field(FieldDescriptor::scalar("Name", ScalarType::String))
                .field(FieldDescriptor::collection_of("Shelves", "Shelf")),
        )
        .with(TypeDescriptor::new("Shelf", "Books").field(id()))
}

// ============================================================================
// Basic Schema Creation Tests
// ============================================================================

#[test]
fn test_blog_schema() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let result = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .unwrap();
    let schema = &result.schema;

    assert_eq!(schema.name, "_SchemaFor_Blogging_");
    assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["Blog", "Post"]);
    assert_eq!(columns(schema, "Blog"), vec!["Id", "Title"]);
    assert_eq!(columns(schema, "Post"), vec!["Id", "Body", "BlogId"]);
    assert_eq!(schema.table("Blog").unwrap().key_name(), "Id");

    assert_eq!(schema.foreign_keys().len(), 1);
    assert_eq!(schema.foreign_keys()[0].reference_name, "FK_Post_Blog_BlogId");
    assert!(result.missing_columns().is_empty());
    assert!(result.warnings.is_empty());

    assert_eq!(ctx.read_schema("_SchemaFor_Blogging_"), result.schema);
}

#[test]
fn test_explicit_schema_name() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let result = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], Some("Blogs"))
        .unwrap();
    assert_eq!(result.schema.name, "Blogs");
    assert_eq!(result.type_schema.name, "Blogs");
    assert_eq!(ctx.schema_files(), vec!["Blogs.json"]);
}

#[test]
fn test_rerun_replaces_schema() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let first = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], Some("Blogs"))
        .unwrap();
    let second = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], Some("Blogs"))
        .unwrap();
    assert_eq!(first.schema, second.schema);
}

#[test]
fn test_xref_schema() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let result = provider
        .create_schema_definition(&order_catalog(), &["Order"], None)
        .unwrap();
    let schema = &result.schema;

    assert_eq!(columns(schema, "Order"), vec!["Id", "Placed"]);
    assert_eq!(columns(schema, "Product"), vec!["Id", "Price"]);
    assert_eq!(
        columns(schema, "OrderProduct"),
        vec!["Id", "Uuid", "OrderId", "ProductId"]
    );
    assert_eq!(schema.xrefs().count(), 1);
    assert_eq!(schema.foreign_keys().len(), 2);
}

// ============================================================================
// Synthesized Column Tests
// ============================================================================

#[test]
fn test_missing_key_and_foreign_key_columns() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let result = provider
        .create_schema_definition(&library_catalog(), &["Library"], None)
        .unwrap();
    let schema = &result.schema;

    assert_eq!(result.missing_key_columns.len(), 1);
    assert_eq!(result.missing_key_columns[0].name(), "Id");
    assert_eq!(result.missing_foreign_key_columns.len(), 1);
    assert_eq!(result.missing_foreign_key_columns[0].name(), "LibraryId");
    assert_eq!(result.missing_foreign_key_columns[0].table_name(), "Shelf");
    assert_eq!(result.missing_columns().len(), 2);
    assert_eq!(result.warnings.len(), 3);

    assert_eq!(columns(schema, "Library"), vec!["Name", "Id"]);
    assert_eq!(schema.table("Library").unwrap().key_name(), "Id");
    let library_id = schema.table("Shelf").unwrap().column("LibraryId").unwrap();
    assert_eq!(library_id.data_type(), DataType::ULong);
    assert!(library_id.allow_null());
    assert_eq!(library_id.as_foreign_key().unwrap().referenced_table, "Library");
}

#[test]
fn test_fail_on_warnings() {
    let ctx = TestContext::new();
    let provider = provider(
        &ctx,
        ProviderOptions {
            fail_on_warnings: true,
            ..Default::default()
        },
    );

    let error = provider
        .create_schema_definition(&library_catalog(), &["Library"], None)
        .unwrap_err();
    assert!(error.to_string().contains("KeyProperty not found"), "{}", error);
    assert!(ctx.schema_files().is_empty());

    assert!(provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .is_ok());
}

// ============================================================================
// Option Tests
// ============================================================================

#[test]
fn test_id_and_audit_augmentations() {
    let ctx = TestContext::new();
    let provider = provider(
        &ctx,
        ProviderOptions {
            add_id_field: true,
            add_audit_fields: true,
            include_modified_by: true,
            ..Default::default()
        },
    );

    let result = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .unwrap();
    assert_eq!(
        columns(&result.schema, "Blog"),
        vec!["Id", "Title", "Created", "Modified", "ModifiedBy"]
    );
    assert_eq!(
        columns(&result.schema, "Post"),
        vec!["Id", "Body", "BlogId", "Created", "Modified", "ModifiedBy"]
    );
}

#[test]
fn test_default_data_type_behavior() {
    let ctx = TestContext::new();
    let provider = provider(
        &ctx,
        ProviderOptions {
            default_data_type_behavior: DefaultDataTypeBehavior::IncludeAsByteArray,
            ..Default::default()
        },
    );

    let result = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .unwrap();
    let post = result.schema.table("Post").unwrap();
    assert_eq!(post.column("Blog").unwrap().data_type(), DataType::ByteArray);
    // Collections never become columns
    assert!(!result.schema.table("Blog").unwrap().has_column("Posts"));
}

#[test]
fn test_inheritance_tables() {
    let ctx = TestContext::new();
    let provider = provider(
        &ctx,
        ProviderOptions {
            use_inheritance: true,
            ..Default::default()
        },
    );

    let result = provider
        .create_schema_definition(&animal_catalog(), &["Dog"], Some("Zoo"))
        .unwrap();
    let schema = &result.schema;

    assert_eq!(
        schema.table_names().collect::<Vec<_>>(),
        vec!["Entity", "Animal", "Dog"]
    );
    assert_eq!(columns(schema, "Entity"), vec!["Created", "Id"]);
    assert_eq!(columns(schema, "Animal"), vec!["Name", "Id"]);
    assert_eq!(columns(schema, "Dog"), vec!["Breed", "Id"]);
    assert!(schema.table("Entity").unwrap().column("Id").unwrap().key());

    let links: Vec<(&str, &str)> = schema
        .foreign_keys()
        .iter()
        .map(|fk| (fk.table_name(), fk.referenced_table.as_str()))
        .collect();
    assert_eq!(links, vec![("Animal", "Entity"), ("Dog", "Animal")]);
}

#[test]
fn test_inheritance_link_survives_synthesized_key() {
    let ctx = TestContext::new();
    let provider = provider(
        &ctx,
        ProviderOptions {
            use_inheritance: true,
            ..Default::default()
        },
    );
    // `Dog` has no key of its own but owns a collection of `Toy`
    let catalog = animal_catalog()
        .with(
            TypeDescriptor::new("Dog", "Zoo")
                .extends("Animal")
                .field(FieldDescriptor::scalar("Breed", ScalarType::String))
                .field(FieldDescriptor::collection_of("Toys", "Toy")),
        )
        .with(TypeDescriptor::new("Toy", "Zoo").field(id()));

    let result = provider
        .create_schema_definition(&catalog, &["Dog"], Some("Zoo"))
        .unwrap();
    let schema = &result.schema;

    let links: Vec<(&str, &str, &str)> = schema
        .foreign_keys()
        .iter()
        .map(|fk| (fk.table_name(), fk.name(), fk.referenced_table.as_str()))
        .collect();
    assert_eq!(
        links,
        vec![
            ("Animal", "Id", "Entity"),
            ("Dog", "Id", "Animal"),
            ("Toy", "DogId", "Dog"),
        ]
    );
    let dog_id = schema.table("Dog").unwrap().column("Id").unwrap();
    assert_eq!(dog_id.as_foreign_key().unwrap().referenced_table, "Animal");
    assert!(result.missing_key_columns.is_empty());
}

#[test]
fn test_flattened_inheritance_without_option() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());

    let result = provider
        .create_schema_definition(&animal_catalog(), &["Dog"], Some("Zoo"))
        .unwrap();
    assert_eq!(result.schema.table_count(), 1);
    assert_eq!(columns(&result.schema, "Dog"), vec!["Breed", "Name", "Created"]);
}

struct PrefixedTableNames;

impl TableNameProvider for PrefixedTableNames {
    fn table_name(&self, descriptor: &TypeDescriptor) -> String {
        format!("tbl{}", descriptor.name)
    }
}

#[test]
fn test_custom_table_name_provider() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default())
        .with_table_name_provider(Arc::new(PrefixedTableNames));

    let result = provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .unwrap();
    assert_eq!(
        result.schema.table_names().collect::<Vec<_>>(),
        vec!["tblBlog", "tblPost"]
    );
    assert_eq!(result.schema.foreign_keys()[0].referenced_table, "tblBlog");
}

#[test]
fn test_namespaces_and_temp_path() {
    let ctx = TestContext::new();
    let provider = provider(&ctx, ProviderOptions::default());
    let catalog = blog_catalog();

    let namespaces = provider.data_namespaces(&catalog, &["Blog"]);
    assert_eq!(namespaces.dao_namespace(), "Blogging.Dao");
    assert_eq!(namespaces.wrapper_namespace(), "Blogging.Wrappers");

    let result = provider
        .create_schema_definition(&catalog, &["Blog"], None)
        .unwrap();
    assert_eq!(
        provider.schema_temp_path(&result),
        ctx.data_dir.join("DaoTemp__SchemaFor_Blogging_")
    );
}

#[test]
fn test_provider_shares_manager() {
    let ctx = TestContext::new();
    let manager: Arc<SchemaManager> = Arc::new(ctx.manager());
    let provider = SchemaProvider::new(ProviderOptions::default(), Arc::clone(&manager));

    provider
        .create_schema_definition(&blog_catalog(), &["Blog"], None)
        .unwrap();
    assert!(manager.table("Post").unwrap().is_some());
}
