//! Type descriptors: the input to schema inference
//!
//! A [`TypeDescriptor`] describes an application type by its named, typed
//! fields. Inference only ever sees descriptors through [`TypeSource`], so
//! any layer that can enumerate fields (a JSON catalog, hand-written
//! declarations, a derive macro) can feed it.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::{DataType, Named, NamedList};

/// Scalar field kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Int,
    UInt,
    Long,
    ULong,
    Decimal,
    String,
    ByteArray,
    DateTime,
    /// A scalar with no direct column mapping, e.g. `Guid` or `Double`
    Other(String),
}

impl ScalarType {
    /// Recognises the built-in scalar names, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name.to_lowercase().as_str() {
            "boolean" | "bool" => ScalarType::Boolean,
            "int" => ScalarType::Int,
            "uint" => ScalarType::UInt,
            "long" => ScalarType::Long,
            "ulong" => ScalarType::ULong,
            "decimal" => ScalarType::Decimal,
            "string" => ScalarType::String,
            "bytearray" | "byte[]" => ScalarType::ByteArray,
            "datetime" => ScalarType::DateTime,
            _ => return None,
        };
        Some(scalar)
    }

    /// Column data type; [`DataType::Default`] for `Other`
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarType::Boolean => DataType::Boolean,
            ScalarType::Int => DataType::Int,
            ScalarType::UInt => DataType::UInt,
            ScalarType::Long => DataType::Long,
            ScalarType::ULong => DataType::ULong,
            ScalarType::Decimal => DataType::Decimal,
            ScalarType::String => DataType::String,
            ScalarType::ByteArray => DataType::ByteArray,
            ScalarType::DateTime => DataType::DateTime,
            ScalarType::Other(_) => DataType::Default,
        }
    }

    fn name(&self) -> &str {
        match self {
            ScalarType::Other(name) => name,
            other => other.data_type().as_str(),
        }
    }
}

/// Element of a collection field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    Scalar(ScalarType),
    Type(String),
}

/// Static type of a field.
///
/// Written in catalogs as `ULong`, `Blog` or `Post[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Scalar(ScalarType),
    /// A single instance of another described type
    Reference(String),
    Collection(ElementType),
}

impl FieldType {
    pub fn collection_of(type_name: &str) -> Self {
        FieldType::Collection(ElementType::Type(type_name.to_string()))
    }

    /// Element type name when this is a collection of another described type
    pub fn collection_type(&self) -> Option<&str> {
        match self {
            FieldType::Collection(ElementType::Type(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::Collection(_))
    }

    /// Column data type; references and collections have no direct mapping
    pub fn data_type(&self) -> DataType {
        match self {
            FieldType::Scalar(scalar) => scalar.data_type(),
            _ => DataType::Default,
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Field type is empty".to_string());
        }
        if let Some(element) = s.strip_suffix("[]") {
            // byte[] is a scalar, byte[][] a collection of them
            if ScalarType::from_name(s) == Some(ScalarType::ByteArray) {
                return Ok(FieldType::Scalar(ScalarType::ByteArray));
            }
            let element = element.trim();
            if element.is_empty() {
                return Err(format!("Collection element type missing in '{}'", s));
            }
            return Ok(FieldType::Collection(match ScalarType::from_name(element) {
                Some(scalar) => ElementType::Scalar(scalar),
                None => ElementType::Type(element.to_string()),
            }));
        }
        Ok(match ScalarType::from_name(s) {
            Some(scalar) => FieldType::Scalar(scalar),
            None => FieldType::Reference(s.to_string()),
        })
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => f.write_str(scalar.name()),
            FieldType::Reference(name) => f.write_str(name),
            FieldType::Collection(ElementType::Scalar(scalar)) => write!(f, "{}[]", scalar.name()),
            FieldType::Collection(ElementType::Type(name)) => write!(f, "{}[]", name),
        }
    }
}

/// A named, typed field of a described type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Explicitly designated as the type's key
    #[serde(default)]
    pub key: bool,
    #[serde(default = "default_writable")]
    pub writable: bool,
}

fn default_writable() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            key: false,
            writable: true,
        }
    }

    pub fn scalar(name: &str, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    pub fn collection_of(name: &str, type_name: &str) -> Self {
        Self::new(name, FieldType::collection_of(type_name))
    }

    pub fn reference(name: &str, type_name: &str) -> Self {
        Self::new(name, FieldType::Reference(type_name.to_string()))
    }

    pub fn as_key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// A described application type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// Immediate supertype, if any
    #[serde(default, rename = "extends", skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    /// Fields declared at this level only
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl Named for TypeDescriptor {
    fn name(&self) -> &str {
        &self.name
    }
}

impl TypeDescriptor {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            supertype: None,
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, supertype: &str) -> Self {
        self.supertype = Some(supertype.to_string());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn declared_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The type descriptor capability inference is defined against
pub trait TypeSource: Send + Sync {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor>;

    fn supertype(&self, name: &str) -> Option<&TypeDescriptor> {
        self.descriptor(name)?
            .supertype
            .as_deref()
            .and_then(|s| self.descriptor(s))
    }

    /// Writable fields including inherited ones, most-derived level first.
    /// A field redeclared by a subtype hides the inherited one.
    fn writable_fields(&self, name: &str) -> Vec<&FieldDescriptor> {
        let mut fields = Vec::new();
        let mut seen_fields = HashSet::new();
        let mut seen_types = HashSet::new();
        let mut current = self.descriptor(name);
        while let Some(descriptor) = current {
            if !seen_types.insert(descriptor.name.as_str()) {
                break;
            }
            for field in descriptor.fields.iter().filter(|f| f.writable) {
                if seen_fields.insert(field.name.as_str()) {
                    fields.push(field);
                }
            }
            current = self.supertype(&descriptor.name);
        }
        fields
    }

    fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDescriptor> {
        self.writable_fields(type_name)
            .into_iter()
            .find(|f| f.name == field_name)
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// In-memory [`TypeSource`], built programmatically or parsed from JSON:
///
/// ```json
/// { "types": [
///     { "name": "Blog", "namespace": "App.Blogging",
///       "fields": [ { "name": "Id", "type": "ULong", "key": true },
///                   { "name": "Posts", "type": "Post[]" } ] },
///     { "name": "Post", "namespace": "App.Blogging",
///       "fields": [ { "name": "Title", "type": "String" } ] } ] }
/// ```
///
/// Single-valued fields naming an undeclared type are treated as scalars
/// without a column mapping; collections and supertypes must be declared.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: NamedList<TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a descriptor
    pub fn add(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.upsert(descriptor);
        self
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.names()
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: CatalogDocument =
            serde_json::from_str(json).map_err(|e| SchemaError::TypeCatalogParse {
                message: e.to_string(),
            })?;
        let mut catalog = TypeCatalog::new();
        for descriptor in document.types {
            if catalog.types.contains(&descriptor.name) {
                return Err(SchemaError::TypeCatalogParse {
                    message: format!("Type {} declared more than once", descriptor.name),
                });
            }
            catalog.add(descriptor);
        }
        catalog.normalize();
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read type catalog: {}", path.display()))?;
        let catalog = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), types = catalog.len(), "Loaded type catalog");
        Ok(catalog)
    }

    fn normalize(&mut self) {
        let declared: HashSet<String> = self.types.names().map(str::to_string).collect();
        for descriptor in self.types.iter_mut() {
            for field in descriptor.fields.iter_mut() {
                if let FieldType::Reference(name) = &field.field_type {
                    if !declared.contains(name) {
                        field.field_type = FieldType::Scalar(ScalarType::Other(name.clone()));
                    }
                }
            }
        }
    }

    /// Checks that collection element types and supertypes are declared and
    /// that no inheritance chain loops back on itself.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for descriptor in self.types.iter() {
            if let Some(supertype) = &descriptor.supertype {
                if !self.types.contains(supertype) {
                    return Err(SchemaError::TypeCatalogParse {
                        message: format!(
                            "Type {} extends undeclared type {}",
                            descriptor.name, supertype
                        ),
                    });
                }
            }
            for field in &descriptor.fields {
                if let Some(element) = field.field_type.collection_type() {
                    if !self.types.contains(element) {
                        return Err(SchemaError::TypeCatalogParse {
                            message: format!(
                                "Field {}.{} is a collection of undeclared type {}",
                                descriptor.name, field.name, element
                            ),
                        });
                    }
                }
            }

            let mut seen = HashSet::new();
            let mut current = Some(descriptor);
            while let Some(d) = current {
                if !seen.insert(d.name.as_str()) {
                    return Err(SchemaError::TypeCatalogParse {
                        message: format!("Inheritance cycle through type {}", descriptor.name),
                    });
                }
                current = self.supertype(&d.name);
            }
        }
        Ok(())
    }
}

impl TypeSource for TypeCatalog {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }
}
