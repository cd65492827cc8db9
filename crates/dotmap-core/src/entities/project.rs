use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::enums::{GuidSource, ProjectStyle};

/// A buildable project manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub unique_identifier: String,
    pub native_guid: Option<String>,
    pub name: String,
    pub file_path: PathBuf,
    pub guid_source: GuidSource,
    /// Declared target framework, or `"N/A"`.
    pub target_framework: String,
    pub style: ProjectStyle,
}
