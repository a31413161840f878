//! Convention based namespaces for generated data types

use crate::types::TypeDescriptor;

pub const DEFAULT_BASE_NAMESPACE: &str = "ApplicationDataTypes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataNamespaces {
    pub base_namespace: String,
}

impl Default for DataNamespaces {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_NAMESPACE)
    }
}

impl DataNamespaces {
    pub fn new(base_namespace: &str) -> Self {
        Self {
            base_namespace: base_namespace.to_string(),
        }
    }

    /// Namespaces based on the namespace of `descriptor`, or the defaults
    /// when it has none.
    pub fn for_type(descriptor: Option<&TypeDescriptor>) -> Self {
        match descriptor {
            Some(d) if !d.namespace.is_empty() => Self::new(&d.namespace),
            _ => Self::default(),
        }
    }

    pub fn dao_namespace(&self) -> String {
        format!("{}.Dao", self.base_namespace)
    }

    pub fn wrapper_namespace(&self) -> String {
        format!("{}.Wrappers", self.base_namespace)
    }
}
