//! Assembly extraction from parsed projects.

use std::path::{Component, Path, PathBuf};

use dotmap_core::entities::Assembly;
use dotmap_core::enums::{AssemblyKind, ScanPhase};
use dotmap_core::identity::{assembly_identifier, normalize_path, path_identifier};

use crate::error::ScanWarning;
use crate::project::{AssemblyReferenceDecl, ParsedProject};

/// Output directory used when a project declares no `OutputPath`.
const DEFAULT_OUTPUT_DIR: &str = "bin";

/// Directory name that marks a hint path as coming from a package restore.
const PACKAGES_DIR: &str = "packages";

pub struct AssemblyExtractor;

impl AssemblyExtractor {
    /// The assembly a project builds.
    ///
    /// # Errors
    ///
    /// Returns a warning instead of an assembly when the resolved name is blank.
    pub fn output(parsed: &ParsedProject) -> Result<Assembly, ScanWarning> {
        let project = &parsed.project;
        let kind = parsed
            .build
            .output_type
            .as_deref()
            .map_or(AssemblyKind::Library, AssemblyKind::from_output_type);

        let name = parsed
            .build
            .assembly_name
            .clone()
            .unwrap_or_else(|| project.name.clone());
        if name.trim().is_empty() {
            return Err(ScanWarning::new(
                ScanPhase::Assemblies,
                Some(project.file_path.clone()),
                format!(
                    "no assembly name for {}; output skipped",
                    project.file_path.display()
                ),
            ));
        }

        let output_dir = parsed
            .build
            .output_path
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_DIR)
            .replace('\\', "/");
        let file_path = normalize_path(
            &parsed
                .directory()
                .join(output_dir)
                .join(format!("{name}{}", kind.extension())),
        );

        Ok(Assembly {
            unique_identifier: assembly_identifier(&project.file_path, &name),
            name,
            kind,
            file_path,
            version: None,
        })
    }

    /// Assemblies named by the project's `<Reference>` items.
    #[must_use]
    pub fn references(parsed: &ParsedProject) -> Vec<Assembly> {
        parsed
            .assembly_references
            .iter()
            .filter(|decl| !decl.name.is_empty())
            .map(Self::reference)
            .collect()
    }

    fn reference(decl: &AssemblyReferenceDecl) -> Assembly {
        let (kind, file_path) = match &decl.hint_path {
            Some(hint) if in_packages_dir(hint) => (AssemblyKind::Registry, hint.clone()),
            Some(hint) => (AssemblyKind::External, hint.clone()),
            None => (AssemblyKind::Framework, PathBuf::from(format!("{}.dll", decl.name))),
        };
        Assembly {
            unique_identifier: path_identifier(&file_path),
            name: decl.name.clone(),
            kind,
            file_path,
            version: decl.version.clone(),
        }
    }
}

fn in_packages_dir(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().eq_ignore_ascii_case(PACKAGES_DIR),
        _ => false,
    })
}
