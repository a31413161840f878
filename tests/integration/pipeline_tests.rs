//! Integration tests for the library entry points used by the CLI

use pretty_assertions::assert_eq;

use rust_daoschema::manager::MappedSchemaDefinition;
use rust_daoschema::naming::{NameCollisionResolver, NamingCollisionStrategy};
use rust_daoschema::{
    import_simple_schema, infer_schema, load_schema, map_schema_names, ImportOptions,
    InferOptions, Settings,
};

use crate::common::{TestContext, BLOG_CATALOG_JSON, SIMPLE_SCHEMA_JSON};

#[test]
fn test_infer_schema_from_catalog_file() {
    let ctx = TestContext::new();
    let catalog_path = ctx.write_file("catalog.json", BLOG_CATALOG_JSON);

    let result = infer_schema(InferOptions {
        catalog_path,
        roots: vec!["Blog".to_string()],
        schema_name: Some("Blogs".to_string()),
        settings: ctx.settings(),
    })
    .unwrap();

    assert_eq!(result.schema.table_count(), 2);
    let loaded = load_schema(&ctx.schema_path("Blogs")).unwrap();
    assert_eq!(loaded, result.schema);
}

#[test]
fn test_infer_schema_defaults_to_all_types() {
    let ctx = TestContext::new();
    let catalog_path = ctx.write_file("catalog.json", BLOG_CATALOG_JSON);

    let result = infer_schema(InferOptions {
        catalog_path,
        roots: Vec::new(),
        schema_name: None,
        settings: Settings {
            auto_save: false,
            ..ctx.settings()
        },
    })
    .unwrap();

    assert_eq!(result.type_schema.tables, vec!["Blog", "Post"]);
    // Saved once at the end when auto-save is off
    assert_eq!(ctx.read_schema("_SchemaFor_Blogging_"), result.schema);
}

#[test]
fn test_infer_schema_missing_catalog() {
    let ctx = TestContext::new();
    let error = infer_schema(InferOptions {
        catalog_path: ctx.data_dir.join("missing.json"),
        roots: Vec::new(),
        schema_name: None,
        settings: ctx.settings(),
    })
    .unwrap_err();
    assert!(error.to_string().contains("missing.json"), "{}", error);
}

#[test]
fn test_import_simple_schema_file() {
    let ctx = TestContext::new();
    let path = ctx.write_file("simple.json", SIMPLE_SCHEMA_JSON);

    let schema = import_simple_schema(ImportOptions {
        simple_schema_path: path,
        settings: Settings {
            add_id_field: true,
            ..ctx.settings()
        },
    })
    .unwrap();

    assert_eq!(schema.name, "Blogging");
    let post: Vec<&str> = schema.table("Post").unwrap().column_names().collect();
    assert_eq!(post, vec!["Id", "Body", "BlogId"]);
    let blog = schema.table("Blog").unwrap();
    assert_eq!(blog.key_name(), "Id");
    assert!(!blog.column("Title").unwrap().allow_null());
    assert_eq!(schema.foreign_keys_for_table("Post")[0].referenced_table, "Blog");
    assert!(schema.xref("PostTag").is_some());

    assert_eq!(ctx.read_schema("Blogging"), schema);
}

#[test]
fn test_import_replaces_previous_schema() {
    let ctx = TestContext::new();
    let path = ctx.write_file("simple.json", SIMPLE_SCHEMA_JSON);
    let options = ImportOptions {
        simple_schema_path: path,
        settings: Settings {
            backup_existing: true,
            ..ctx.settings()
        },
    };

    let first = import_simple_schema(options.clone()).unwrap();
    let second = import_simple_schema(options).unwrap();
    assert_eq!(first, second);
    assert_eq!(ctx.schema_files().len(), 2);
}

#[test]
fn test_map_schema_names() {
    let ctx = TestContext::new();
    let path = ctx.write_file(
        "simple.json",
        r#"{ "nameSpace": "Shop.Data", "schemaName": "Shop",
            "tables": [
                { "name": "order", "cols": [ { "name": "order", "type": "String" } ] },
                { "name": "order_line", "cols": [ { "name": "qty", "type": "Int" } ],
                  "fks": [ { "column": "order_id", "table": "order" } ] } ] }"#,
    );
    import_simple_schema(ImportOptions {
        simple_schema_path: path,
        settings: ctx.settings(),
    })
    .unwrap();

    let output = ctx.data_dir.join("mapped").join("Shop.json");
    let resolver = NameCollisionResolver::new(NamingCollisionStrategy::TrailingUnderscore, "");
    let mapped = map_schema_names(&ctx.schema_path("Shop"), &output, &resolver).unwrap();

    let schema = &mapped.schema_definition;
    let order = schema.table("order").unwrap();
    assert_eq!(order.class_name(), "Order");
    assert_eq!(order.property_name("order"), Some("Order_"));
    assert_eq!(schema.table("order_line").unwrap().class_name(), "OrderLine");

    let fk = &schema.foreign_keys()[0];
    assert_eq!(fk.referenced_class, "Order");
    assert_eq!(fk.referencing_class, "OrderLine");
    assert_eq!(fk.column.property_name(), "OrderId");

    let reloaded = MappedSchemaDefinition::load(&output).unwrap();
    assert_eq!(reloaded.schema_name_map, mapped.schema_name_map);
    assert_eq!(reloaded.schema_definition, mapped.schema_definition);
    assert_eq!(reloaded.file_path(), Some(output.as_path()));
}

#[test]
fn test_load_schema_missing_file() {
    let ctx = TestContext::new();
    let error = load_schema(&ctx.schema_path("Nothing")).unwrap_err();
    assert!(error.to_string().contains("Schema file not found"));
}

#[test]
fn test_settings_file_drives_pipeline() {
    let ctx = TestContext::new();
    let settings_path = ctx.write_file(
        "daoschema.json",
        &format!(
            r#"{{ "dataDir": {}, "addAuditFields": true }}"#,
            serde_json::to_string(&ctx.data_dir).unwrap()
        ),
    );
    let settings = Settings::load(Some(settings_path.as_path())).unwrap();
    assert_eq!(settings.data_dir, ctx.data_dir);

    let catalog_path = ctx.write_file("catalog.json", BLOG_CATALOG_JSON);
    let result = infer_schema(InferOptions {
        catalog_path,
        roots: vec!["Blog".to_string()],
        schema_name: Some("Audited".to_string()),
        settings,
    })
    .unwrap();
    let blog: Vec<&str> = result.schema.table("Blog").unwrap().column_names().collect();
    assert_eq!(blog, vec!["Id", "Title", "Created", "Modified"]);
}
