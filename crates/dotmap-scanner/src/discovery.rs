//! Manifest discovery.
//!
//! Walks a repository with the `ignore` crate and collects solution and
//! project files by extension. By default every directory is visited
//! (hidden and gitignored ones included) except the configured excluded
//! names; `respect_gitignore` switches to the standard git filters.
//! Unreadable directories are skipped with a warning.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use dotmap_config::ScanConfig;
use dotmap_core::enums::ScanPhase;
use dotmap_core::identity::normalize_path;

use crate::error::{ScanError, ScanWarning};

/// Manifest paths found under a root, each list sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub solutions: Vec<PathBuf>,
    pub projects: Vec<PathBuf>,
    pub warnings: Vec<ScanWarning>,
}

#[derive(Debug, Clone)]
pub struct PathDiscovery {
    solution_exts: Vec<String>,
    project_exts: Vec<String>,
    exclude_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl PathDiscovery {
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            solution_exts: config.solution_exts(),
            project_exts: config.project_exts(),
            exclude_dirs: config.exclude_dirs.clone(),
            respect_gitignore: config.respect_gitignore,
        }
    }

    /// Absolute, normalized form of `root`, checked to be a directory.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::RepositoryNotFound` if `root` is not an existing
    /// directory.
    pub fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::RepositoryNotFound(root.to_path_buf()));
        }
        Ok(normalize_path(&std::path::absolute(root)?))
    }

    /// Find every solution and project file under `root`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::RepositoryNotFound` if `root` is not an existing
    /// directory. Problems below the root become warnings.
    pub fn discover(&self, root: &Path) -> Result<Discovered, ScanError> {
        let root = Self::resolve_root(root)?;
        let mut found = Discovered::default();

        for result in self.build_walker(&root) {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    found.warnings.push(ScanWarning::new(
                        ScanPhase::Discovery,
                        None,
                        format!("skipped unreadable entry: {err}"),
                    ));
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(ext) = entry
                .path()
                .extension()
                .and_then(OsStr::to_str)
                .map(str::to_ascii_lowercase)
            else {
                continue;
            };
            if self.solution_exts.contains(&ext) {
                found.solutions.push(entry.into_path());
            } else if self.project_exts.contains(&ext) {
                found.projects.push(entry.into_path());
            }
        }

        found.solutions.sort();
        found.projects.sort();
        debug!(
            root = %root.display(),
            solutions = found.solutions.len(),
            projects = found.projects.len(),
            "discovery finished"
        );
        Ok(found)
    }

    fn build_walker(&self, root: &Path) -> ignore::Walk {
        let mut builder = WalkBuilder::new(root);
        if self.respect_gitignore {
            // Hidden directories can still hold manifests; only .gitignore filters.
            builder.hidden(false);
            builder.require_git(false);
        } else {
            builder.standard_filters(false);
            builder.hidden(false);
        }
        builder.follow_links(false);

        let excluded = self.exclude_dirs.clone();
        builder.filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !excluded.iter().any(|ex| name.eq_ignore_ascii_case(ex))
        });
        builder.build()
    }
}
