//! Non-fatal inference warnings

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeSchemaWarningKind {
    /// A parent type has neither a designated key nor an `Id` field
    KeyPropertyNotFound,
    /// A child type lacks the `{Parent}{Key}` field
    ReferencingPropertyNotFound,
    /// A child type lacks the `{Parent}` back-reference field
    ChildParentPropertyNotFound,
    /// The root types come from more than one namespace
    DifferentNamespacesFound,
}

impl fmt::Display for TypeSchemaWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One recorded warning with the offending type pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchemaWarning {
    pub kind: TypeSchemaWarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    pub message: String,
}

impl TypeSchemaWarning {
    pub fn key_property_not_found(parent: &str) -> Self {
        Self {
            kind: TypeSchemaWarningKind::KeyPropertyNotFound,
            parent_type: Some(parent.to_string()),
            foreign_key_type: None,
            namespaces: Vec::new(),
            message: format!("KeyProperty not found for type {}", parent),
        }
    }

    pub fn referencing_property_not_found(parent: &str, child: &str, property: &str) -> Self {
        Self {
            kind: TypeSchemaWarningKind::ReferencingPropertyNotFound,
            parent_type: Some(parent.to_string()),
            foreign_key_type: Some(child.to_string()),
            namespaces: Vec::new(),
            message: format!(
                "Referencing property not found {}: Parent type ({}), ForeignKeyType ({})",
                property, parent, child
            ),
        }
    }

    pub fn child_parent_property_not_found(parent: &str, child: &str) -> Self {
        Self {
            kind: TypeSchemaWarningKind::ChildParentPropertyNotFound,
            parent_type: Some(parent.to_string()),
            foreign_key_type: Some(child.to_string()),
            namespaces: Vec::new(),
            message: format!(
                "ChildParentProperty was not found {}.{}: Parent type ({}), ForeignKeyType ({})",
                child, parent, parent, child
            ),
        }
    }

    pub fn different_namespaces(mut namespaces: Vec<String>) -> Self {
        namespaces.sort();
        Self {
            kind: TypeSchemaWarningKind::DifferentNamespacesFound,
            parent_type: None,
            foreign_key_type: None,
            message: format!("Root types span namespaces: {}", namespaces.join(", ")),
            namespaces,
        }
    }
}

impl fmt::Display for TypeSchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Deduplicating, insertion-ordered warning collector threaded through
/// inference and returned with its result.
#[derive(Debug, Clone, Default)]
pub struct TypeSchemaWarnings {
    items: Vec<TypeSchemaWarning>,
    seen: HashSet<TypeSchemaWarning>,
}

impl TypeSchemaWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `warning` unless an identical one was already recorded.
    pub fn push(&mut self, warning: TypeSchemaWarning) -> bool {
        if self.seen.contains(&warning) {
            return false;
        }
        tracing::warn!(kind = %warning.kind, "{}", warning.message);
        self.seen.insert(warning.clone());
        self.items.push(warning);
        true
    }

    pub fn extend(&mut self, other: TypeSchemaWarnings) {
        for warning in other.items {
            self.push(warning);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeSchemaWarning> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn of_kind(&self, kind: TypeSchemaWarningKind) -> impl Iterator<Item = &TypeSchemaWarning> {
        self.items.iter().filter(move |w| w.kind == kind)
    }

    /// Promotes any recorded warning to an error.
    pub fn into_result(self) -> Result<(), SchemaError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::TypeSchemaWarnings {
                warnings: self.to_string(),
            })
        }
    }
}

impl fmt::Display for TypeSchemaWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.items {
            writeln!(f, "  {}", warning)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TypeSchemaWarnings {
    type Item = &'a TypeSchemaWarning;
    type IntoIter = std::slice::Iter<'a, TypeSchemaWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
