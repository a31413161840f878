//! Schema provider options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::DataType;

/// How fields without a direct column mapping are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultDataTypeBehavior {
    /// Skip the field
    #[default]
    Exclude,
    IncludeAsString,
    IncludeAsByteArray,
}

impl DefaultDataTypeBehavior {
    /// Column type for an unmapped field, if it is included at all
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            DefaultDataTypeBehavior::Exclude => None,
            DefaultDataTypeBehavior::IncludeAsString => Some(DataType::String),
            DefaultDataTypeBehavior::IncludeAsByteArray => Some(DataType::ByteArray),
        }
    }
}

impl FromStr for DefaultDataTypeBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "exclude" => Ok(DefaultDataTypeBehavior::Exclude),
            "includeasstring" | "string" => Ok(DefaultDataTypeBehavior::IncludeAsString),
            "includeasbytearray" | "bytearray" => Ok(DefaultDataTypeBehavior::IncludeAsByteArray),
            _ => Err(format!("Unknown default data type behavior: {}", s)),
        }
    }
}

impl fmt::Display for DefaultDataTypeBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefaultDataTypeBehavior::Exclude => "Exclude",
            DefaultDataTypeBehavior::IncludeAsString => "IncludeAsString",
            DefaultDataTypeBehavior::IncludeAsByteArray => "IncludeAsByteArray",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Register the `Id` key pre-column augmentation
    pub add_id_field: bool,
    /// Register the audit post-column augmentation
    pub add_audit_fields: bool,
    pub include_created_by: bool,
    pub include_modified_by: bool,
    pub default_data_type_behavior: DefaultDataTypeBehavior,
    /// Split inheritance chains into one table per level
    pub use_inheritance: bool,
    /// Fail type schema creation when inference produced warnings
    pub fail_on_warnings: bool,
}
