use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::enums::AssemblyKind;

/// A build output or binary reference. Identity is the file path within a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assembly {
    pub unique_identifier: String,
    pub name: String,
    pub kind: AssemblyKind,
    pub file_path: PathBuf,
    pub version: Option<String>,
}
