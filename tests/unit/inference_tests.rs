//! Unit tests for type schema inference
//!
//! These tests verify the walk from root types to tables, one-to-many
//! foreign keys and many-to-many xrefs.

use pretty_assertions::assert_eq;

use rust_daoschema::error::SchemaError;
use rust_daoschema::types::{
    infer_type_schema, FieldDescriptor, ScalarType, TypeCatalog, TypeDescriptor,
    TypeInheritanceDescriptor, TypeSchemaWarningKind,
};

use crate::common::{animal_catalog, blog_catalog, id, order_catalog, BLOG_CATALOG_JSON};

// ============================================================================
// Table Discovery Tests
// ============================================================================

#[test]
fn test_unrelated_types_yield_only_roots() {
    let catalog = TypeCatalog::new()
        .with(TypeDescriptor::new("Customer", "Crm").field(id()))
        .with(TypeDescriptor::new("Invoice", "Crm").field(id()))
        .with(TypeDescriptor::new("Unused", "Crm").field(id()));

    let schema = infer_type_schema(&catalog, &["Customer"], None).unwrap();
    assert_eq!(schema.tables, vec!["Customer"]);

    let schema = infer_type_schema(&catalog, &["Customer", "Invoice"], None).unwrap();
    assert_eq!(schema.tables, vec!["Customer", "Invoice"]);
    assert!(schema.foreign_keys.is_empty());
    assert!(schema.xrefs.is_empty());
    assert!(schema.warnings.is_empty());
}

#[test]
fn test_children_are_discovered_from_collections() {
    let schema = infer_type_schema(&blog_catalog(), &["Blog"], None).unwrap();
    assert_eq!(schema.tables, vec!["Blog", "Post"]);
    assert!(schema.contains_table("Post"));
}

#[test]
fn test_repeated_root_is_visited_once() {
    let schema = infer_type_schema(&blog_catalog(), &["Blog", "Post", "Blog"], None).unwrap();
    assert_eq!(schema.tables, vec!["Blog", "Post"]);
    assert_eq!(schema.foreign_keys.len(), 1);
}

// ============================================================================
// Foreign Key Tests
// ============================================================================

#[test]
fn test_blog_post_foreign_key() {
    let schema = infer_type_schema(&blog_catalog(), &["Blog"], None).unwrap();
    assert_eq!(schema.foreign_keys.len(), 1);

    let fk = &schema.foreign_keys[0];
    assert_eq!(fk.primary_key_type, "Blog");
    assert_eq!(fk.primary_key_field.name, "Id");
    assert!(!fk.primary_key_field.synthesized);
    assert_eq!(fk.foreign_key_type, "Post");
    assert_eq!(fk.foreign_key_field.name, "BlogId");
    assert_eq!(fk.foreign_key_field.declaring_type, "Post");
    assert!(!fk.foreign_key_field.synthesized);
    assert_eq!(fk.child_parent_field.name, "Blog");
    assert_eq!(fk.collection_field, "Posts");
    assert!(schema.warnings.is_empty(), "{}", schema.warnings);
}

#[test]
fn test_missing_relation_fields_warn_once_each() {
    let catalog = TypeCatalog::new()
        .with(
            TypeDescriptor::new("Library", "Books")
                .field(FieldDescriptor::collection_of("Shelves", "Shelf"))
                .field(FieldDescriptor::collection_of("MoreShelves", "Shelf")),
        )
        .with(TypeDescriptor::new("Shelf", "Books").field(id()));

    let schema = infer_type_schema(&catalog, &["Library"], None).unwrap();

    // Both collections describe the same relation
    assert_eq!(schema.foreign_keys.len(), 1);
    let fk = &schema.foreign_keys[0];
    assert!(fk.primary_key_field.synthesized);
    assert_eq!(fk.foreign_key_field.name, "LibraryId");
    assert!(fk.foreign_key_field.synthesized);
    assert!(fk.child_parent_field.synthesized);

    assert_eq!(schema.warnings.of_kind(TypeSchemaWarningKind::KeyPropertyNotFound).count(), 1);
    assert_eq!(
        schema
            .warnings
            .of_kind(TypeSchemaWarningKind::ReferencingPropertyNotFound)
            .count(),
        1
    );
    assert_eq!(
        schema
            .warnings
            .of_kind(TypeSchemaWarningKind::ChildParentPropertyNotFound)
            .count(),
        1
    );
    assert!(matches!(
        schema.warnings.clone().into_result(),
        Err(SchemaError::TypeSchemaWarnings { .. })
    ));
}

#[test]
fn test_designated_key_names_referencing_field() {
    let catalog = TypeCatalog::new()
        .with(
            TypeDescriptor::new("Team", "League")
                .field(FieldDescriptor::scalar("Code", ScalarType::Int).as_key())
                .field(FieldDescriptor::collection_of("Players", "Player")),
        )
        .with(
            TypeDescriptor::new("Player", "League")
                .field(id())
                .field(FieldDescriptor::scalar("TeamCode", ScalarType::Int))
                .field(FieldDescriptor::reference("Team", "Team")),
        );

    let schema = infer_type_schema(&catalog, &["Team"], None).unwrap();
    let fk = &schema.foreign_keys[0];
    assert_eq!(fk.primary_key_field.name, "Code");
    assert_eq!(fk.foreign_key_field.name, "TeamCode");
    assert!(schema.warnings.is_empty());
}

// ============================================================================
// Xref Tests
// ============================================================================

#[test]
fn test_reciprocal_collections_form_one_xref() {
    let schema = infer_type_schema(&order_catalog(), &["Order"], None).unwrap();
    assert_eq!(schema.tables, vec!["Order", "Product"]);
    assert!(schema.foreign_keys.is_empty());
    assert_eq!(schema.xrefs.len(), 1);
    assert_eq!(schema.xrefs[0].left, "Order");
    assert_eq!(schema.xrefs[0].right, "Product");
    assert_eq!(schema.xrefs[0].left_collection_field, "Products");
    assert_eq!(schema.xrefs[0].right_collection_field, "Orders");
}

#[test]
fn test_xref_is_deduplicated_across_roots() {
    let schema = infer_type_schema(&order_catalog(), &["Order", "Product"], None).unwrap();
    assert_eq!(schema.xrefs.len(), 1);
}

#[test]
fn test_hash_is_independent_of_root_order() {
    let from_order = infer_type_schema(&order_catalog(), &["Order"], None).unwrap();
    let from_product = infer_type_schema(&order_catalog(), &["Product"], None).unwrap();
    assert_eq!(from_order.hash(), from_product.hash());

    let blog = infer_type_schema(&blog_catalog(), &["Blog"], None).unwrap();
    assert_ne!(from_order.hash(), blog.hash());
}

// ============================================================================
// Naming and Namespace Tests
// ============================================================================

#[test]
fn test_schema_name_from_namespace_or_argument() {
    let schema = infer_type_schema(&blog_catalog(), &["Blog"], None).unwrap();
    assert_eq!(schema.name, "SchemaFor_Blogging");

    let schema = infer_type_schema(&blog_catalog(), &["Blog"], Some("Blogs")).unwrap();
    assert_eq!(schema.name, "Blogs");
}

#[test]
fn test_mixed_root_namespaces_warn() {
    let catalog = TypeCatalog::new()
        .with(TypeDescriptor::new("Blog", "Blogging").field(id()))
        .with(TypeDescriptor::new("Order", "Shop").field(id()));

    let schema = infer_type_schema(&catalog, &["Blog", "Order"], None).unwrap();
    let warning = schema
        .warnings
        .of_kind(TypeSchemaWarningKind::DifferentNamespacesFound)
        .next()
        .expect("Should warn about namespaces");
    assert_eq!(warning.namespaces, vec!["Blogging", "Shop"]);
    assert_eq!(schema.name, "SchemaFor_Blogging");
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_json_catalog_matches_programmatic_catalog() {
    let from_json = TypeCatalog::from_json(BLOG_CATALOG_JSON).unwrap();
    let from_json = infer_type_schema(&from_json, &["Blog"], None).unwrap();
    let built = infer_type_schema(&blog_catalog(), &["Blog"], None).unwrap();

    assert_eq!(from_json.tables, built.tables);
    assert_eq!(from_json.foreign_keys, built.foreign_keys);
    assert_eq!(from_json.hash(), built.hash());
}

#[test]
fn test_catalog_rejects_undeclared_collection_type() {
    let json = r#"{ "types": [
        { "name": "Blog", "fields": [ { "name": "Posts", "type": "Post[]" } ] } ] }"#;
    assert!(matches!(
        TypeCatalog::from_json(json),
        Err(SchemaError::TypeCatalogParse { message }) if message.contains("Post")
    ));
}

#[test]
fn test_inheritance_chain_order() {
    let catalog = animal_catalog();
    let inheritance = TypeInheritanceDescriptor::new(&catalog, "Dog").unwrap();
    let levels: Vec<&str> = inheritance.root_first().map(|l| l.type_name()).collect();
    assert_eq!(levels, vec!["Entity", "Animal", "Dog"]);
    assert_eq!(inheritance.root_type, "Entity");
    assert_eq!(inheritance.depth(), 3);
    assert!(inheritance.extends("Animal"));
    assert!(!inheritance.extends("Cat"));
}
