//! Solution file parsing.
//!
//! Solution files are line-oriented text. Two patterns are recognized:
//!
//! ```text
//! Project("{FAE04EC0-...}") = "App", "src\App\App.csproj", "{8A9B1C2D-...}"
//! SolutionGuid = {0F1E2D3C-...}
//! ```
//!
//! Lines that do not match exactly are ignored, so partial or unusual
//! entries never fail a parse. Only entries whose path ends in a project
//! extension are kept; solution folders and other item kinds drop out.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use dotmap_config::ScanConfig;
use dotmap_core::entities::Solution;
use dotmap_core::enums::GuidSource;
use dotmap_core::identity::{path_identifier, path_key, resolve_relative};

use crate::error::ParseError;
use crate::text::read_manifest;

static SOLUTION_GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SolutionGuid\s*=\s*\{([0-9A-Fa-f\-]+)\}").expect("valid SolutionGuid regex")
});

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Project\("[^"]+"\)\s*=\s*"[^"]+"\s*,\s*"([^"]+)"\s*,\s*"\{([0-9A-Fa-f\-]+)\}""#)
        .expect("valid Project line regex")
});

/// One project entry declared by a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    /// Path as written in the solution, relative to the solution directory.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub native_guid: String,
    /// Whether the project file exists on disk.
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSolution {
    pub solution: Solution,
    /// Project entries, existing or not, in declaration order.
    pub entries: Vec<SolutionEntry>,
}

impl ParsedSolution {
    /// Entries whose project file exists.
    pub fn existing_entries(&self) -> impl Iterator<Item = &SolutionEntry> {
        self.entries.iter().filter(|e| e.exists)
    }
}

/// Raw `(relative path, guid)` pairs from every `Project(...)` line.
#[must_use]
pub fn extract_project_lines(text: &str) -> Vec<(String, String)> {
    PROJECT_LINE
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// The `SolutionGuid` value, without braces.
#[must_use]
pub fn extract_solution_guid(text: &str) -> Option<String> {
    SOLUTION_GUID.captures(text).map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone)]
pub struct SolutionParser {
    project_exts: Vec<String>,
}

impl SolutionParser {
    #[must_use]
    pub const fn new(project_exts: Vec<String>) -> Self {
        Self { project_exts }
    }

    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.project_exts())
    }

    /// Read and parse a solution file.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Read` if the file cannot be read.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedSolution, ParseError> {
        let text = read_manifest(path)?;
        Ok(self.parse_text(path, &text))
    }

    /// Parse solution text. Entry existence is checked against the filesystem.
    ///
    /// Repeated lines for the same project collapse to one entry, but every
    /// matching line counts toward the single-project decision.
    #[must_use]
    pub fn parse_text(&self, path: &Path, text: &str) -> ParsedSolution {
        let solution_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut seen = HashSet::new();
        let mut entries: Vec<SolutionEntry> = Vec::new();
        let mut existing_lines = 0usize;

        for (relative_path, native_guid) in extract_project_lines(text) {
            if !self.is_project_path(&relative_path) {
                continue;
            }
            let absolute_path = resolve_relative(solution_dir, &relative_path);
            let exists = absolute_path.is_file();
            if exists {
                existing_lines += 1;
            }
            if seen.insert(path_key(&absolute_path)) {
                entries.push(SolutionEntry {
                    relative_path,
                    absolute_path,
                    native_guid,
                    exists,
                });
            }
        }

        let first_existing = entries.iter().find(|e| e.exists);
        let (native_guid, guid_source, is_single_project) = match first_existing {
            Some(only) if existing_lines == 1 => (
                Some(only.native_guid.clone()),
                GuidSource::ReferencedProject,
                true,
            ),
            _ => match extract_solution_guid(text) {
                Some(guid) => (Some(guid), GuidSource::SolutionGuid, false),
                None => (None, GuidSource::NotFound, false),
            },
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(
            solution = %path.display(),
            entries = entries.len(),
            existing = existing_lines,
            source = %guid_source,
            "parsed solution"
        );

        ParsedSolution {
            solution: Solution {
                unique_identifier: path_identifier(path),
                native_guid,
                name,
                file_path: path.to_path_buf(),
                guid_source,
                is_single_project,
            },
            entries,
        }
    }

    fn is_project_path(&self, relative: &str) -> bool {
        let lower = relative.trim().to_ascii_lowercase();
        self.project_exts
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")))
    }
}

// ---------------------------------------------------------------------------
// GuidMap
// ---------------------------------------------------------------------------

/// Project path to native identifier, gathered from every solution.
///
/// Keys are case-insensitive path keys. When two solutions disagree about a
/// project, the last solution (in discovery order) wins.
#[derive(Debug, Clone, Default)]
pub struct GuidMap {
    guids: HashMap<String, String>,
}

impl GuidMap {
    #[must_use]
    pub fn from_solutions(solutions: &[ParsedSolution]) -> Self {
        let mut map = Self::default();
        for parsed in solutions {
            for entry in &parsed.entries {
                map.insert(&entry.absolute_path, &entry.native_guid);
            }
        }
        map
    }

    pub fn insert(&mut self, project_path: &Path, guid: &str) {
        if let Some(previous) = self.guids.insert(path_key(project_path), guid.to_string()) {
            if !previous.eq_ignore_ascii_case(guid) {
                debug!(
                    project = %project_path.display(),
                    replaced = %previous,
                    kept = guid,
                    "solutions disagree on project guid"
                );
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, project_path: &Path) -> Option<&str> {
        self.guids.get(&path_key(project_path)).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guids.is_empty()
    }
}
