//! Inheritance chains of described types

use std::collections::HashSet;
use std::fmt;

use crate::error::SchemaError;

use super::descriptor::{FieldDescriptor, TypeDescriptor, TypeSource};

/// One level of an inheritance chain and the writable fields declared on it
#[derive(Debug, Clone)]
pub struct TypeTable<'a> {
    pub descriptor: &'a TypeDescriptor,
}

impl<'a> TypeTable<'a> {
    pub fn type_name(&self) -> &'a str {
        &self.descriptor.name
    }

    pub fn declared_fields(&self) -> impl Iterator<Item = &'a FieldDescriptor> {
        self.descriptor.fields.iter().filter(|f| f.writable)
    }
}

/// A type and its ancestors, most-derived first
#[derive(Debug, Clone)]
pub struct TypeInheritanceDescriptor<'a> {
    pub type_name: String,
    pub root_type: String,
    pub chain: Vec<TypeTable<'a>>,
}

impl<'a> TypeInheritanceDescriptor<'a> {
    pub fn new(source: &'a dyn TypeSource, type_name: &str) -> Result<Self, SchemaError> {
        let leaf = source
            .descriptor(type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                name: type_name.to_string(),
            })?;
        let mut chain = vec![TypeTable { descriptor: leaf }];
        let mut seen: HashSet<&str> = HashSet::from([leaf.name.as_str()]);
        let mut current = source.supertype(&leaf.name);
        while let Some(ancestor) = current {
            if !seen.insert(ancestor.name.as_str()) {
                break;
            }
            chain.push(TypeTable {
                descriptor: ancestor,
            });
            current = source.supertype(&ancestor.name);
        }
        let root_type = chain
            .last()
            .map(|t| t.type_name().to_string())
            .unwrap_or_else(|| type_name.to_string());
        Ok(Self {
            type_name: type_name.to_string(),
            root_type,
            chain,
        })
    }

    /// Levels from the most-ancestral down to the type itself
    pub fn root_first(&self) -> impl Iterator<Item = &TypeTable<'a>> {
        self.chain.iter().rev()
    }

    pub fn extends(&self, type_name: &str) -> bool {
        self.chain.iter().any(|t| t.type_name() == type_name)
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

impl fmt::Display for TypeInheritanceDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, level) in self.chain.iter().enumerate() {
            writeln!(f, "{}{}", "\t".repeat(depth), level.type_name())?;
            for field in level.declared_fields() {
                writeln!(f, "\t{}{}", "\t-".repeat(depth), field.name)?;
            }
        }
        Ok(())
    }
}
