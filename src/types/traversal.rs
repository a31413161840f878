//! Type graph traversal and relationship inference
//!
//! Starting from a set of root types, walks collection fields breadth first
//! and classifies each one: reciprocal collections on both sides form an
//! xref, anything else a one-to-many foreign key from the collection's owner
//! to its element type.

use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;

use crate::error::SchemaError;

use super::descriptor::{FieldDescriptor, TypeDescriptor, TypeSource};
use super::relations::{sha256_hex, FieldRef, TypeFk, TypeXref};
use super::warnings::{TypeSchemaWarning, TypeSchemaWarnings};

/// Name of the key field assumed when a type designates none
pub const DEFAULT_KEY_FIELD: &str = "Id";

/// Result of one inference pass
#[derive(Debug, Clone)]
pub struct TypeSchema {
    pub name: String,
    /// Discovered type names in discovery order
    pub tables: Vec<String>,
    pub foreign_keys: Vec<TypeFk>,
    pub xrefs: Vec<TypeXref>,
    pub warnings: TypeSchemaWarnings,
}

impl TypeSchema {
    pub fn contains_table(&self, type_name: &str) -> bool {
        self.tables.iter().any(|t| t == type_name)
    }

    /// Content hash over the sorted tables and relation hashes
    pub fn hash(&self) -> String {
        let mut tables = self.tables.clone();
        tables.sort();
        let mut fk_hashes: Vec<String> = self.foreign_keys.iter().map(TypeFk::content_hash).collect();
        fk_hashes.sort();
        let mut xref_hashes: Vec<String> = self.xrefs.iter().map(TypeXref::content_hash).collect();
        xref_hashes.sort();

        let mut text = tables.join("\n");
        let _ = write!(text, "\nFKHashes:\n\t{}", fk_hashes.join("\n\t"));
        let _ = write!(text, "\nXrefHashes:\n\t{}", xref_hashes.join("\n\t"));
        sha256_hex(&text)
    }
}

/// The field designated as `type_name`'s key: one marked as key, else one
/// named `Id`.
pub fn key_field<'a>(source: &'a dyn TypeSource, type_name: &str) -> Option<&'a FieldDescriptor> {
    let fields = source.writable_fields(type_name);
    fields
        .iter()
        .find(|f| f.key)
        .or_else(|| fields.iter().find(|f| f.name == DEFAULT_KEY_FIELD))
        .copied()
}

/// `left`'s collection of `right`, if it has one
fn collection_of<'a>(
    source: &'a dyn TypeSource,
    left: &str,
    right: &str,
) -> Option<&'a FieldDescriptor> {
    source
        .writable_fields(left)
        .into_iter()
        .find(|f| f.field_type.collection_type() == Some(right))
}

/// Both collection fields when `left` and `right` hold collections of each other
pub fn are_xrefs<'a>(
    source: &'a dyn TypeSource,
    left: &str,
    right: &str,
) -> Option<(&'a FieldDescriptor, &'a FieldDescriptor)> {
    let left_collection = collection_of(source, left, right)?;
    let right_collection = collection_of(source, right, left)?;
    Some((left_collection, right_collection))
}

/// One-to-many relations owned by `parent`, one per non-xref collection field.
/// Missing key, referencing and back-reference fields are synthesized and
/// reported to `warnings`.
pub fn foreign_keys_for(
    source: &dyn TypeSource,
    parent: &TypeDescriptor,
    warnings: &mut TypeSchemaWarnings,
) -> Vec<TypeFk> {
    let mut results = Vec::new();
    for field in source.writable_fields(&parent.name) {
        let Some(child) = field.field_type.collection_type() else {
            continue;
        };
        if are_xrefs(source, &parent.name, child).is_some() {
            continue;
        }

        let primary_key_field = match key_field(source, &parent.name) {
            Some(key) => FieldRef::declared(&key.name, &parent.name),
            None => {
                warnings.push(TypeSchemaWarning::key_property_not_found(&parent.name));
                FieldRef::synthesized(DEFAULT_KEY_FIELD, &parent.name)
            }
        };

        let referencing_name = format!("{}{}", parent.name, primary_key_field.name);
        let foreign_key_field = match source.field(child, &referencing_name) {
            Some(_) => FieldRef::declared(&referencing_name, child),
            None => {
                warnings.push(TypeSchemaWarning::referencing_property_not_found(
                    &parent.name,
                    child,
                    &referencing_name,
                ));
                FieldRef::synthesized(&referencing_name, child)
            }
        };

        let child_parent_field = match source.field(child, &parent.name) {
            Some(_) => FieldRef::declared(&parent.name, child),
            None => {
                warnings.push(TypeSchemaWarning::child_parent_property_not_found(
                    &parent.name,
                    child,
                ));
                FieldRef::synthesized(&parent.name, child)
            }
        };

        results.push(TypeFk {
            primary_key_type: parent.name.clone(),
            primary_key_field,
            foreign_key_type: child.to_string(),
            foreign_key_field,
            child_parent_field,
            collection_field: field.name.clone(),
        });
    }
    results
}

/// Many-to-many relations in which `ty` is the left side
pub fn xrefs_for(source: &dyn TypeSource, ty: &TypeDescriptor) -> Vec<TypeXref> {
    source
        .writable_fields(&ty.name)
        .into_iter()
        .filter_map(|field| {
            let other = field.field_type.collection_type()?;
            let (left_collection, right_collection) = are_xrefs(source, &ty.name, other)?;
            Some(TypeXref {
                left: ty.name.clone(),
                right: other.to_string(),
                left_collection_field: left_collection.name.clone(),
                right_collection_field: right_collection.name.clone(),
            })
        })
        .collect()
}

/// Infers the closure of types reachable from `roots` and the relations
/// between them.
///
/// Each root is walked breadth first; a type is visited once, so cyclic
/// graphs terminate. Relations are deduplicated by content hash, which makes
/// an xref and its mirror the same relation. Unknown root or element types
/// are an error; everything else is reported as a warning.
pub fn infer_type_schema(
    source: &dyn TypeSource,
    roots: &[&str],
    name: Option<&str>,
) -> Result<TypeSchema, SchemaError> {
    if roots.is_empty() {
        return Err(SchemaError::NoTypesSpecified);
    }
    let mut warnings = TypeSchemaWarnings::new();
    let root_descriptors = roots
        .iter()
        .map(|root| resolve(source, root))
        .collect::<Result<Vec<_>, _>>()?;
    check_namespaces(&root_descriptors, &mut warnings);

    let mut tables: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut foreign_keys: Vec<TypeFk> = Vec::new();
    let mut fk_hashes: HashSet<String> = HashSet::new();
    let mut xrefs: Vec<TypeXref> = Vec::new();
    let mut xref_hashes: HashSet<String> = HashSet::new();

    for root in root_descriptors.iter().copied() {
        let mut queue: VecDeque<&TypeDescriptor> = VecDeque::new();
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.name.clone()) {
                continue;
            }
            tables.push(current.name.clone());
            tracing::trace!(type_name = %current.name, "Visiting type");

            for fk in foreign_keys_for(source, current, &mut warnings) {
                if !visited.contains(&fk.foreign_key_type) {
                    queue.push_back(resolve(source, &fk.foreign_key_type)?);
                }
                if fk_hashes.insert(fk.content_hash()) {
                    foreign_keys.push(fk);
                }
            }
            for xref in xrefs_for(source, current) {
                if !visited.contains(&xref.right) {
                    queue.push_back(resolve(source, &xref.right)?);
                }
                if xref_hashes.insert(xref.content_hash()) {
                    xrefs.push(xref);
                }
            }
        }
    }

    let mut type_schema = TypeSchema {
        name: String::new(),
        tables,
        foreign_keys,
        xrefs,
        warnings,
    };
    type_schema.name = match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_schema_name(&root_descriptors, &type_schema),
    };
    tracing::debug!(
        schema = %type_schema.name,
        tables = type_schema.tables.len(),
        foreign_keys = type_schema.foreign_keys.len(),
        xrefs = type_schema.xrefs.len(),
        warnings = type_schema.warnings.len(),
        "Inferred type schema"
    );
    Ok(type_schema)
}

fn resolve<'a>(source: &'a dyn TypeSource, name: &str) -> Result<&'a TypeDescriptor, SchemaError> {
    source.descriptor(name).ok_or_else(|| SchemaError::UnknownType {
        name: name.to_string(),
    })
}

fn check_namespaces(roots: &[&TypeDescriptor], warnings: &mut TypeSchemaWarnings) {
    let namespaces: HashSet<&str> = roots.iter().map(|r| r.namespace.as_str()).collect();
    if namespaces.len() > 1 {
        warnings.push(TypeSchemaWarning::different_namespaces(
            namespaces.into_iter().map(str::to_string).collect(),
        ));
    }
}

/// `SchemaFor_{namespace}` of the first root, or the schema hash when the
/// root has no namespace
fn default_schema_name(roots: &[&TypeDescriptor], type_schema: &TypeSchema) -> String {
    match roots.first().map(|r| r.namespace.as_str()) {
        Some(namespace) if !namespace.is_empty() => format!("SchemaFor_{}", namespace),
        _ => type_schema.hash(),
    }
}
