use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::enums::GuidSource;

/// A solution file grouping projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Solution {
    pub unique_identifier: String,
    pub native_guid: Option<String>,
    pub name: String,
    pub file_path: PathBuf,
    pub guid_source: GuidSource,
    pub is_single_project: bool,
}
