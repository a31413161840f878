//! Settings file support

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::manager::SchemaManagerOptions;
use crate::provider::{DefaultDataTypeBehavior, ProviderOptions};

/// Settings read from an optional JSON file; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub data_dir: PathBuf,
    pub auto_save: bool,
    pub backup_existing: bool,
    pub add_id_field: bool,
    pub add_audit_fields: bool,
    pub include_created_by: bool,
    pub include_modified_by: bool,
    pub default_data_type_behavior: DefaultDataTypeBehavior,
    pub use_inheritance: bool,
    pub fail_on_warnings: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            auto_save: true,
            backup_existing: false,
            add_id_field: false,
            add_audit_fields: false,
            include_created_by: false,
            include_modified_by: false,
            default_data_type_behavior: DefaultDataTypeBehavior::Exclude,
            use_inheritance: false,
            fail_on_warnings: false,
        }
    }
}

impl Settings {
    /// Reads settings from `path`. No path, or a path that does not exist,
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SchemaError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(SchemaError::SchemaReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&json).map_err(|e| SchemaError::SettingsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn manager_options(&self) -> SchemaManagerOptions {
        SchemaManagerOptions {
            data_dir: self.data_dir.clone(),
            auto_save: self.auto_save,
            backup_existing: self.backup_existing,
        }
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            add_id_field: self.add_id_field,
            add_audit_fields: self.add_audit_fields,
            include_created_by: self.include_created_by,
            include_modified_by: self.include_modified_by,
            default_data_type_behavior: self.default_data_type_behavior,
            use_inheritance: self.use_inheritance,
            fail_on_warnings: self.fail_on_warnings,
        }
    }
}
