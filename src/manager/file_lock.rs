//! Process-wide locks keyed by schema file path

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

static FILE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// The lock shared by every caller naming `path`
pub fn named(path: &Path) -> Arc<Mutex<()>> {
    FILE_LOCKS
        .lock()
        .entry(path.to_path_buf())
        .or_default()
        .clone()
}
