//! Scanner configuration: which files to discover and how to walk the tree.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_solution_extensions() -> Vec<String> {
    vec!["sln".to_string()]
}

fn default_project_extensions() -> Vec<String> {
    ["csproj", "vbproj", "fsproj"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    vec![".git".to_string(), ".vs".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Solution file extensions, without the leading dot.
    #[serde(default = "default_solution_extensions")]
    pub solution_extensions: Vec<String>,

    /// Project file extensions, without the leading dot.
    #[serde(default = "default_project_extensions")]
    pub project_extensions: Vec<String>,

    /// Directory names pruned from discovery.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Honor `.gitignore` files while walking. Off by default so that every
    /// manifest on disk is inventoried.
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Worker threads for per-file parsing. `0` uses the global rayon pool.
    #[serde(default)]
    pub parse_threads: usize,
}

impl ScanConfig {
    /// Lower-cased solution extensions with any leading dot removed.
    #[must_use]
    pub fn solution_exts(&self) -> Vec<String> {
        normalize_extensions(&self.solution_extensions)
    }

    /// Lower-cased project extensions with any leading dot removed.
    #[must_use]
    pub fn project_exts(&self) -> Vec<String> {
        normalize_extensions(&self.project_extensions)
    }

    /// Reject configurations that could never discover anything.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an extension list is empty or
    /// the two lists overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let solutions = self.solution_exts();
        let projects = self.project_exts();
        if solutions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.solution_extensions".into(),
                reason: "at least one extension is required".into(),
            });
        }
        if projects.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.project_extensions".into(),
                reason: "at least one extension is required".into(),
            });
        }
        if let Some(shared) = solutions.iter().find(|e| projects.contains(e)) {
            return Err(ConfigError::InvalidValue {
                field: "scan.project_extensions".into(),
                reason: format!("'{shared}' is also a solution extension"),
            });
        }
        Ok(())
    }
}

fn normalize_extensions(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            solution_extensions: default_solution_extensions(),
            project_extensions: default_project_extensions(),
            exclude_dirs: default_exclude_dirs(),
            respect_gitignore: false,
            parse_threads: 0,
        }
    }
}
