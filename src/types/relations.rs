//! Inferred relations between described types
//!
//! Both relation kinds are transient: they are rebuilt on every inference
//! pass and compared by content hash rather than by identity.

use sha2::{Digest, Sha256};

/// A field taking part in a relation. Synthesized fields were expected
/// but missing from the described type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub name: String,
    pub declaring_type: String,
    pub synthesized: bool,
}

impl FieldRef {
    pub fn declared(name: &str, declaring_type: &str) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: declaring_type.to_string(),
            synthesized: false,
        }
    }

    pub fn synthesized(name: &str, declaring_type: &str) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: declaring_type.to_string(),
            synthesized: true,
        }
    }
}

/// One-to-many relation: a parent with a collection of children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeFk {
    pub primary_key_type: String,
    pub primary_key_field: FieldRef,
    pub foreign_key_type: String,
    pub foreign_key_field: FieldRef,
    pub child_parent_field: FieldRef,
    /// The parent's collection field
    pub collection_field: String,
}

impl TypeFk {
    pub fn content_hash(&self) -> String {
        sha256_hex(&format!(
            "{}.{}->{}.{}",
            self.primary_key_type,
            self.primary_key_field.name,
            self.foreign_key_type,
            self.foreign_key_field.name
        ))
    }
}

/// Many-to-many relation between two types with reciprocal collections
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeXref {
    pub left: String,
    pub right: String,
    /// Left's collection of right
    pub left_collection_field: String,
    /// Right's collection of left
    pub right_collection_field: String,
}

impl TypeXref {
    /// Equal for a relation and its mirror
    pub fn content_hash(&self) -> String {
        let (first, second) = if self.left <= self.right {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };
        sha256_hex(&format!("{}<->{}", first, second))
    }

    pub fn is_mirror_of(&self, other: &TypeXref) -> bool {
        self.left == other.right && self.right == other.left
    }
}

pub(crate) fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
