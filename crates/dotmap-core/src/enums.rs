//! Tag enums for dotmap entities, edges, and scan phases.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! and `as_str()` returns the same string used in SQL storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ProjectStyle
// ---------------------------------------------------------------------------

/// Manifest format of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStyle {
    /// Root element carries an `Sdk` attribute.
    Sdk,
    Legacy,
}

impl ProjectStyle {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sdk => "sdk",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ProjectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GuidSource
// ---------------------------------------------------------------------------

/// How the native identifier of a solution or project was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidSource {
    /// `<ProjectGuid>` element in the project file.
    ProjectGuidElement,
    /// Looked up in the solution-wide project path map.
    SolutionFile,
    /// `SolutionGuid = {...}` line in the solution file.
    SolutionGuid,
    /// Inherited from the only project of a single-project solution.
    ReferencedProject,
    NotFound,
}

impl GuidSource {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectGuidElement => "project_guid_element",
            Self::SolutionFile => "solution_file",
            Self::SolutionGuid => "solution_guid",
            Self::ReferencedProject => "referenced_project",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for GuidSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AssemblyKind
// ---------------------------------------------------------------------------

/// Kind of an assembly node: a project output or a declared binary reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyKind {
    Library,
    Executable,
    Module,
    /// Referenced through a hint path outside any package folder.
    External,
    /// Referenced through a hint path inside a `packages` folder.
    Registry,
    /// Referenced by name only, resolved by the platform.
    Framework,
}

impl AssemblyKind {
    /// Map a declared `OutputType` (case-insensitive) to the produced artifact kind.
    ///
    /// ```
    /// use dotmap_core::enums::AssemblyKind;
    ///
    /// assert_eq!(AssemblyKind::from_output_type("WinExe"), AssemblyKind::Executable);
    /// assert_eq!(AssemblyKind::from_output_type("Unknown"), AssemblyKind::Library);
    /// ```
    #[must_use]
    pub fn from_output_type(output_type: &str) -> Self {
        match output_type.trim().to_ascii_lowercase().as_str() {
            "exe" | "winexe" => Self::Executable,
            "module" => Self::Module,
            _ => Self::Library,
        }
    }

    /// File extension, with leading dot, for build outputs of this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Executable => ".exe",
            Self::Module => ".netmodule",
            _ => ".dll",
        }
    }

    /// Whether this kind is produced by building a project.
    #[must_use]
    pub const fn is_build_output(self) -> bool {
        matches!(self, Self::Library | Self::Executable | Self::Module)
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Executable => "executable",
            Self::Module => "module",
            Self::External => "external",
            Self::Registry => "registry",
            Self::Framework => "framework",
        }
    }
}

impl fmt::Display for AssemblyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EdgeKind
// ---------------------------------------------------------------------------

/// The five relation types of the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    SolutionProject,
    ProjectReference,
    ProjectPackage,
    ProjectAssembly,
    AssemblyDependency,
}

impl EdgeKind {
    pub const ALL: [Self; 5] = [
        Self::SolutionProject,
        Self::ProjectReference,
        Self::ProjectPackage,
        Self::ProjectAssembly,
        Self::AssemblyDependency,
    ];

    /// Junction table storing edges of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::SolutionProject => "solution_projects",
            Self::ProjectReference => "project_references",
            Self::ProjectPackage => "project_package_references",
            Self::ProjectAssembly => "project_assembly_references",
            Self::AssemblyDependency => "assembly_dependencies",
        }
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SolutionProject => "solution_project",
            Self::ProjectReference => "project_reference",
            Self::ProjectPackage => "project_package",
            Self::ProjectAssembly => "project_assembly",
            Self::AssemblyDependency => "assembly_dependency",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScanPhase
// ---------------------------------------------------------------------------

/// Sequential phases of a scan, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Initializing,
    Vcs,
    Discovery,
    Solutions,
    Projects,
    Assemblies,
    Graph,
    Database,
    Complete,
}

impl ScanPhase {
    /// Progress percentage reported when the phase starts.
    #[must_use]
    pub const fn start_percent(self) -> u8 {
        match self {
            Self::Initializing => 0,
            Self::Vcs => 5,
            Self::Discovery => 10,
            Self::Solutions => 20,
            Self::Projects => 40,
            Self::Assemblies => 70,
            Self::Graph => 80,
            Self::Database => 90,
            Self::Complete => 100,
        }
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Vcs => "vcs",
            Self::Discovery => "discovery",
            Self::Solutions => "solutions",
            Self::Projects => "projects",
            Self::Assemblies => "assemblies",
            Self::Graph => "graph",
            Self::Database => "database",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventLevel
// ---------------------------------------------------------------------------

/// Severity of a persisted scan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
}

impl EventLevel {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parsing stored tags
// ---------------------------------------------------------------------------

macro_rules! impl_from_str {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = CoreError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(
                        |_| CoreError::UnknownTag {
                            kind: $kind,
                            value: s.to_string(),
                        },
                    )
                }
            }
        )+
    };
}

impl_from_str! {
    ProjectStyle => "project style",
    GuidSource => "guid source",
    AssemblyKind => "assembly kind",
    EdgeKind => "edge kind",
    ScanPhase => "scan phase",
    EventLevel => "event level",
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Exe", AssemblyKind::Executable, ".exe")]
    #[case("winexe", AssemblyKind::Executable, ".exe")]
    #[case("MODULE", AssemblyKind::Module, ".netmodule")]
    #[case("Library", AssemblyKind::Library, ".dll")]
    #[case("AppContainerExe", AssemblyKind::Library, ".dll")]
    #[case("", AssemblyKind::Library, ".dll")]
    fn output_type_maps_to_kind_and_extension(
        #[case] output_type: &str,
        #[case] kind: AssemblyKind,
        #[case] extension: &str,
    ) {
        let actual = AssemblyKind::from_output_type(output_type);
        assert_eq!(actual, kind);
        assert_eq!(actual.extension(), extension);
    }

    #[test]
    fn only_output_kinds_are_build_outputs() {
        assert!(AssemblyKind::Module.is_build_output());
        assert!(!AssemblyKind::Registry.is_build_output());
        assert!(!AssemblyKind::Framework.is_build_output());
    }

    #[test]
    fn phase_percentages_increase_in_phase_order() {
        let phases = [
            ScanPhase::Initializing,
            ScanPhase::Vcs,
            ScanPhase::Discovery,
            ScanPhase::Solutions,
            ScanPhase::Projects,
            ScanPhase::Assemblies,
            ScanPhase::Graph,
            ScanPhase::Database,
            ScanPhase::Complete,
        ];
        for pair in phases.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].start_percent() < pair[1].start_percent());
        }
    }

    #[test]
    fn as_str_matches_serde() {
        for kind in EdgeKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().into()));
        }
        let json = serde_json::to_value(GuidSource::ReferencedProject).unwrap();
        assert_eq!(json, "referenced_project");
    }

    #[test]
    fn stored_tags_parse_back() {
        assert_eq!("legacy".parse::<ProjectStyle>().unwrap(), ProjectStyle::Legacy);
        assert_eq!("warn".parse::<EventLevel>().unwrap(), EventLevel::Warn);
        let err = "Legacy".parse::<ProjectStyle>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown project style tag: 'Legacy'");
    }
}
