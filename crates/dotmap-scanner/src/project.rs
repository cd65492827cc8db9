//! Project file parsing.
//!
//! Project files are MSBuild XML. Elements are matched by local name so
//! both SDK-style files and legacy files in the MSBuild namespace are read
//! the same way. The first non-blank occurrence of a property wins.
//!
//! A file that is not well-formed XML is rejected as a whole; the caller
//! skips it and records a warning.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::debug;

use dotmap_core::NOT_AVAILABLE;
use dotmap_core::entities::{Package, Project};
use dotmap_core::enums::{GuidSource, ProjectStyle, ScanPhase};
use dotmap_core::identity::{path_identifier, resolve_relative};

use crate::error::{ParseError, ScanWarning};
use crate::solution::GuidMap;
use crate::text::read_manifest;

/// Legacy package manifest kept next to the project file.
const PACKAGES_CONFIG: &str = "packages.config";

/// A `<ProjectReference Include="...">` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReferenceDecl {
    pub include: String,
    /// `include` resolved against the project directory.
    pub resolved: PathBuf,
}

/// A `<Reference Include="Name, Version=...">` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReferenceDecl {
    pub name: String,
    pub version: Option<String>,
    /// `<HintPath>` resolved against the project directory.
    pub hint_path: Option<PathBuf>,
}

/// Properties that decide the build output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    pub output_type: Option<String>,
    pub assembly_name: Option<String>,
    pub output_path: Option<String>,
}

/// Everything read from one project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProject {
    pub project: Project,
    pub project_references: Vec<ProjectReferenceDecl>,
    pub packages: Vec<Package>,
    pub assembly_references: Vec<AssemblyReferenceDecl>,
    pub build: BuildSettings,
    /// Problems with side files that did not prevent parsing the project.
    pub warnings: Vec<ScanWarning>,
}

impl ParsedProject {
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.project
            .file_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
    }
}

pub struct ProjectParser<'a> {
    guid_map: &'a GuidMap,
}

impl<'a> ProjectParser<'a> {
    #[must_use]
    pub const fn new(guid_map: &'a GuidMap) -> Self {
        Self { guid_map }
    }

    /// Read and parse a project file, plus a sibling `packages.config` if present.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the file cannot be read or is not well-formed XML.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedProject, ParseError> {
        let text = read_manifest(path)?;
        let mut parsed = self.parse_text(path, &text)?;

        let config_path = parsed.directory().join(PACKAGES_CONFIG);
        if config_path.is_file() {
            match read_manifest(&config_path).and_then(|t| parse_packages_config(&config_path, &t)) {
                Ok(packages) => {
                    let mut all: BTreeSet<Package> = parsed.packages.drain(..).collect();
                    all.extend(packages);
                    parsed.packages = all.into_iter().collect();
                }
                Err(err) => parsed
                    .warnings
                    .push(ScanWarning::from_parse(ScanPhase::Projects, &err)),
            }
        }
        Ok(parsed)
    }

    /// Parse project XML.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Xml` if `text` is not well-formed XML.
    pub fn parse_text(&self, path: &Path, text: &str) -> Result<ParsedProject, ParseError> {
        let doc = parse_xml(path, text)?;
        let project_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let style = if doc.root_element().attribute("Sdk").is_some() {
            ProjectStyle::Sdk
        } else {
            ProjectStyle::Legacy
        };

        let declared_guid = first_text(&doc, "ProjectGuid")
            .map(|g| g.trim_matches(|c| c == '{' || c == '}').trim().to_string())
            .filter(|g| !g.is_empty());
        let (native_guid, guid_source) = match declared_guid {
            Some(guid) => (Some(guid), GuidSource::ProjectGuidElement),
            None => match self.guid_map.lookup(path) {
                Some(guid) => (Some(guid.to_string()), GuidSource::SolutionFile),
                None => (None, GuidSource::NotFound),
            },
        };

        let target_framework = ["TargetFramework", "TargetFrameworks", "TargetFrameworkVersion"]
            .into_iter()
            .find_map(|name| first_text(&doc, name))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let project_references = elements(&doc, "ProjectReference")
            .filter_map(|node| non_blank(node.attribute("Include")))
            .map(|include| ProjectReferenceDecl {
                resolved: resolve_relative(project_dir, &include),
                include,
            })
            .collect();

        let packages: BTreeSet<Package> = elements(&doc, "PackageReference")
            .filter_map(|node| {
                let name = non_blank(node.attribute("Include"))?;
                let version = non_blank(node.attribute("Version"))
                    .or_else(|| child_text(node, "Version"))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                Some(Package::new(name, version))
            })
            .collect();

        let assembly_references = elements(&doc, "Reference")
            .filter_map(|node| {
                let include = non_blank(node.attribute("Include"))?;
                let (name, version) = split_strong_name(&include);
                let hint_path =
                    child_text(node, "HintPath").map(|hint| resolve_relative(project_dir, &hint));
                Some(AssemblyReferenceDecl {
                    name,
                    version,
                    hint_path,
                })
            })
            .collect();

        let build = BuildSettings {
            output_type: first_text(&doc, "OutputType"),
            assembly_name: first_text(&doc, "AssemblyName"),
            output_path: first_text(&doc, "OutputPath"),
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(
            project = %path.display(),
            style = %style,
            framework = %target_framework,
            source = %guid_source,
            "parsed project"
        );

        Ok(ParsedProject {
            project: Project {
                unique_identifier: path_identifier(path),
                native_guid,
                name,
                file_path: path.to_path_buf(),
                guid_source,
                target_framework,
                style,
            },
            project_references,
            packages: packages.into_iter().collect(),
            assembly_references,
            build,
            warnings: Vec::new(),
        })
    }
}

/// Packages listed in a legacy `packages.config`.
///
/// # Errors
///
/// Returns `ParseError::Xml` if `text` is not well-formed XML.
pub fn parse_packages_config(path: &Path, text: &str) -> Result<Vec<Package>, ParseError> {
    let doc = parse_xml(path, text)?;
    Ok(elements(&doc, "package")
        .filter_map(|node| {
            let id = non_blank(node.attribute("id"))?;
            let version =
                non_blank(node.attribute("version")).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            Some(Package::new(id, version))
        })
        .collect())
}

/// `"Name, Version=1.2.3.4, Culture=neutral"` into name and version.
fn split_strong_name(include: &str) -> (String, Option<String>) {
    let mut parts = include.split(',');
    let name = parts.next().unwrap_or_default().trim().to_string();
    let version = parts.find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("Version")
            .then(|| value.trim().to_string())
    });
    (name, version)
}

fn parse_xml<'t>(path: &Path, text: &'t str) -> Result<Document<'t>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Document::parse(text).map_err(|e| ParseError::Xml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn elements<'d, 'i>(doc: &'d Document<'i>, name: &'static str) -> impl Iterator<Item = Node<'d, 'i>> {
    doc.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn first_text(doc: &Document<'_>, name: &'static str) -> Option<String> {
    elements(doc, name).find_map(|n| non_blank(n.text()))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().name() == name)
        .find_map(|c| non_blank(c.text()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
    <AssemblyName>Contoso.App</AssemblyName>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Lib\Lib.csproj" />
    <PackageReference Include="Serilog" Version="3.1.1" />
    <PackageReference Include="Polly">
      <Version>8.2.0</Version>
    </PackageReference>
    <PackageReference Include="Floating" />
    <PackageReference Update="Serilog" Version="9.9.9" />
  </ItemGroup>
</Project>"#;

    const LEGACY_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <ProjectGuid>{8A9B1C2D-3E4F-5061-7283-94A5B6C7D8E9}</ProjectGuid>
    <OutputType>Library</OutputType>
    <TargetFrameworkVersion>v4.7.2</TargetFrameworkVersion>
    <OutputPath>bin\Debug\</OutputPath>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System.Xml" />
    <Reference Include="Newtonsoft.Json, Version=13.0.0.0, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed">
      <HintPath>..\packages\Newtonsoft.Json.13.0.3\lib\net45\Newtonsoft.Json.dll</HintPath>
    </Reference>
  </ItemGroup>
</Project>"#;

    fn parse(path: &str, text: &str) -> ParsedProject {
        let map = GuidMap::default();
        ProjectParser::new(&map).parse_text(Path::new(path), text).unwrap()
    }

    #[test]
    fn sdk_project_metadata() {
        let parsed = parse("/repo/src/App/App.csproj", SDK_PROJECT);
        assert_eq!(parsed.project.style, ProjectStyle::Sdk);
        assert_eq!(parsed.project.name, "App");
        assert_eq!(parsed.project.target_framework, "net8.0");
        assert_eq!(parsed.project.guid_source, GuidSource::NotFound);
        assert_eq!(parsed.project.native_guid, None);
        assert_eq!(
            parsed.build,
            BuildSettings {
                output_type: Some("Exe".into()),
                assembly_name: Some("Contoso.App".into()),
                output_path: None,
            }
        );
    }

    #[test]
    fn sdk_project_references_and_packages() {
        let parsed = parse("/repo/src/App/App.csproj", SDK_PROJECT);
        assert_eq!(parsed.project_references.len(), 1);
        assert_eq!(
            parsed.project_references[0].resolved,
            PathBuf::from("/repo/src/Lib/Lib.csproj")
        );
        assert_eq!(
            parsed.packages,
            vec![
                Package::new("Floating", "N/A"),
                Package::new("Polly", "8.2.0"),
                Package::new("Serilog", "3.1.1"),
            ]
        );
    }

    #[test]
    fn legacy_project_in_msbuild_namespace() {
        let parsed = parse("/repo/src/Lib/Lib.csproj", LEGACY_PROJECT);
        assert_eq!(parsed.project.style, ProjectStyle::Legacy);
        assert_eq!(parsed.project.target_framework, "v4.7.2");
        assert_eq!(
            parsed.project.native_guid.as_deref(),
            Some("8A9B1C2D-3E4F-5061-7283-94A5B6C7D8E9")
        );
        assert_eq!(parsed.project.guid_source, GuidSource::ProjectGuidElement);
        assert_eq!(parsed.build.output_path.as_deref(), Some("bin\\Debug\\"));
    }

    #[test]
    fn legacy_assembly_references() {
        let parsed = parse("/repo/src/Lib/Lib.csproj", LEGACY_PROJECT);
        assert_eq!(
            parsed.assembly_references,
            vec![
                AssemblyReferenceDecl {
                    name: "System.Xml".into(),
                    version: None,
                    hint_path: None,
                },
                AssemblyReferenceDecl {
                    name: "Newtonsoft.Json".into(),
                    version: Some("13.0.0.0".into()),
                    hint_path: Some(PathBuf::from(
                        "/repo/src/packages/Newtonsoft.Json.13.0.3/lib/net45/Newtonsoft.Json.dll"
                    )),
                },
            ]
        );
    }

    #[test]
    fn project_guid_element_beats_solution_map() {
        let mut map = GuidMap::default();
        map.insert(Path::new("/repo/src/Lib/Lib.csproj"), "FFFFFFFF-0000-0000-0000-000000000000");
        let parsed = ProjectParser::new(&map)
            .parse_text(Path::new("/repo/src/Lib/Lib.csproj"), LEGACY_PROJECT)
            .unwrap();
        assert_eq!(parsed.project.guid_source, GuidSource::ProjectGuidElement);
    }

    #[test]
    fn solution_map_fills_missing_guid() {
        let mut map = GuidMap::default();
        map.insert(Path::new("/REPO/src/app/APP.csproj"), "ABCDEF01-0000-0000-0000-000000000000");
        let parsed = ProjectParser::new(&map)
            .parse_text(Path::new("/repo/src/App/App.csproj"), SDK_PROJECT)
            .unwrap();
        assert_eq!(parsed.project.guid_source, GuidSource::SolutionFile);
        assert_eq!(
            parsed.project.native_guid.as_deref(),
            Some("ABCDEF01-0000-0000-0000-000000000000")
        );
    }

    #[rstest]
    #[case(
        "<TargetFramework>net8.0</TargetFramework><TargetFrameworks>net6.0;net7.0</TargetFrameworks><TargetFrameworkVersion>v4.8</TargetFrameworkVersion>",
        "net8.0"
    )]
    #[case(
        "<TargetFrameworks>net6.0;net7.0</TargetFrameworks><TargetFrameworkVersion>v4.8</TargetFrameworkVersion>",
        "net6.0;net7.0"
    )]
    #[case("<TargetFrameworkVersion>v4.8</TargetFrameworkVersion>", "v4.8")]
    #[case("<TargetFramework>  </TargetFramework><TargetFrameworks>net6.0</TargetFrameworks>", "net6.0")]
    #[case("", "N/A")]
    fn target_framework_precedence(#[case] properties: &str, #[case] expected: &str) {
        let text = format!("<Project><PropertyGroup>{properties}</PropertyGroup></Project>");
        let parsed = parse("/repo/P.csproj", &text);
        assert_eq!(parsed.project.target_framework, expected);
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let map = GuidMap::default();
        let err = ProjectParser::new(&map)
            .parse_text(Path::new("/repo/Broken.csproj"), "<Project><PropertyGroup>")
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
        assert!(err.to_string().contains("Broken.csproj"));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let text = format!("\u{feff}{SDK_PROJECT}");
        assert_eq!(parse("/repo/App.csproj", &text).project.style, ProjectStyle::Sdk);
    }

    #[test]
    fn utf16_project_file_is_parsed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("App.csproj");
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(SDK_PROJECT.encode_utf16().flat_map(u16::to_le_bytes));
        fs::write(&path, bytes).unwrap();

        let map = GuidMap::default();
        let parsed = ProjectParser::new(&map).parse_file(&path).unwrap();
        assert_eq!(parsed.project.style, ProjectStyle::Sdk);
        assert_eq!(parsed.project.target_framework, "net8.0");
    }

    #[test]
    fn packages_config_is_merged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Lib.csproj");
        fs::write(&path, LEGACY_PROJECT).unwrap();
        fs::write(
            dir.path().join("packages.config"),
            r#"<?xml version="1.0" encoding="utf-8"?>
<packages>
  <package id="Newtonsoft.Json" version="13.0.3" targetFramework="net472" />
  <package id="log4net" version="2.0.15" targetFramework="net472" />
</packages>"#,
        )
        .unwrap();

        let map = GuidMap::default();
        let parsed = ProjectParser::new(&map).parse_file(&path).unwrap();
        assert_eq!(
            parsed.packages,
            vec![
                Package::new("Newtonsoft.Json", "13.0.3"),
                Package::new("log4net", "2.0.15"),
            ]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn malformed_packages_config_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Lib.csproj");
        fs::write(&path, LEGACY_PROJECT).unwrap();
        fs::write(dir.path().join("packages.config"), "<packages><package").unwrap();

        let map = GuidMap::default();
        let parsed = ProjectParser::new(&map).parse_file(&path).unwrap();
        assert!(parsed.packages.is_empty());
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].phase, ScanPhase::Projects);
    }

    #[rstest]
    #[case("System.Xml", "System.Xml", None)]
    #[case("Foo, Version=1.2.3.4, Culture=neutral", "Foo", Some("1.2.3.4"))]
    #[case(" Bar ,culture=neutral, version = 2.0 ", "Bar", Some("2.0"))]
    fn strong_names_split(
        #[case] include: &str,
        #[case] name: &str,
        #[case] version: Option<&str>,
    ) {
        assert_eq!(
            split_strong_name(include),
            (name.to_string(), version.map(String::from))
        );
    }
}
