//! Type descriptors and relationship inference

mod descriptor;
mod inheritance;
mod relations;
mod traversal;
mod warnings;

pub use descriptor::{
    ElementType, FieldDescriptor, FieldType, ScalarType, TypeCatalog, TypeDescriptor, TypeSource,
};
pub use inheritance::{TypeInheritanceDescriptor, TypeTable};
pub use relations::{FieldRef, TypeFk, TypeXref};
pub use traversal::{
    are_xrefs, foreign_keys_for, infer_type_schema, key_field, xrefs_for, TypeSchema,
    DEFAULT_KEY_FIELD,
};
pub use warnings::{TypeSchemaWarning, TypeSchemaWarningKind, TypeSchemaWarnings};
