//! Deterministic identifiers for graph nodes.
//!
//! Every solution, project, and output assembly gets a 128-bit token derived
//! from its normalized path (or, for assemblies, a composite of project path
//! and assembly name). The digest is XXH3-128: stable across runs, platforms,
//! and crate versions, but not collision resistant. Callers that need
//! uniqueness within a scan must check for duplicate tokens themselves.
//!
//! Path keys are lexical: `.` and `..` are folded without touching the
//! filesystem, backslashes are treated as separators, and the result is
//! lower-cased so that keys compare case-insensitively.

use std::path::{Component, Path, PathBuf};

use xxhash_rust::xxh3::xxh3_128;

/// Fold `.`/`..` components and treat `\` as a separator.
///
/// ```
/// use std::path::Path;
/// use dotmap_core::identity::normalize_path;
///
/// assert_eq!(
///     normalize_path(Path::new("/repo/src/./App/../Lib\\Lib.csproj")),
///     Path::new("/repo/src/Lib/Lib.csproj"),
/// );
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&raw).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `relative` (as written in a manifest) against `base_dir`.
///
/// Absolute inputs replace the base, matching `Path::join`.
#[must_use]
pub fn resolve_relative(base_dir: &Path, relative: &str) -> PathBuf {
    let relative = relative.trim().replace('\\', "/");
    normalize_path(&base_dir.join(relative))
}

/// Case-insensitive comparison key for a path.
#[must_use]
pub fn path_key(path: &Path) -> String {
    normalize_path(path).to_string_lossy().to_lowercase()
}

/// Format the XXH3-128 digest of `key` as `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`.
#[must_use]
pub fn stable_id(key: &str) -> String {
    let hex = format!("{:032X}", xxh3_128(key.as_bytes()));
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Identifier of a solution or project file.
#[must_use]
pub fn path_identifier(path: &Path) -> String {
    stable_id(&path_key(path))
}

/// Identifier of the assembly a project produces.
#[must_use]
pub fn assembly_identifier(project_path: &Path, assembly_name: &str) -> String {
    stable_id(&format!(
        "{}|{}",
        path_key(project_path),
        assembly_name.to_lowercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn is_token(s: &str) -> bool {
        let groups: Vec<&str> = s.split('-').collect();
        groups.iter().map(|g| g.len()).collect::<Vec<_>>() == [8, 4, 4, 4, 12]
            && groups
                .iter()
                .all(|g| g.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()))
    }

    #[test]
    fn stable_id_is_formatted_uppercase_hex() {
        let id = stable_id("/repo/app/app.csproj");
        assert!(is_token(&id), "bad token: {id}");
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn stable_id_is_deterministic() {
        assert_eq!(stable_id("abc"), stable_id("abc"));
        assert_ne!(stable_id("abc"), stable_id("abd"));
    }

    #[test]
    fn path_identifier_ignores_case_and_dot_segments() {
        let a = path_identifier(Path::new("/Repo/Src/App/App.csproj"));
        let b = path_identifier(Path::new("/repo/src/lib/../app/./app.CSPROJ"));
        assert_eq!(a, b);
    }

    #[test]
    fn assembly_identifier_depends_on_project_and_name() {
        let project = Path::new("/repo/app/app.csproj");
        assert_eq!(
            assembly_identifier(project, "App"),
            assembly_identifier(Path::new("/REPO/app/App.csproj"), "app")
        );
        assert_ne!(
            assembly_identifier(project, "App"),
            assembly_identifier(project, "App.Core")
        );
        assert_ne!(assembly_identifier(project, "App"), path_identifier(project));
    }

    #[rstest]
    #[case("/repo/a/./b", "/repo/a/b")]
    #[case("/repo/a/../b", "/repo/b")]
    #[case("/../a", "/a")]
    #[case("../a/b/..", "../a")]
    #[case("/repo\\src\\App.csproj", "/repo/src/App.csproj")]
    fn normalize_path_folds_components(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn resolve_relative_handles_manifest_paths() {
        let base = Path::new("/repo/src/App");
        assert_eq!(
            resolve_relative(base, "..\\Lib\\Lib.csproj"),
            PathBuf::from("/repo/src/Lib/Lib.csproj")
        );
        assert_eq!(
            resolve_relative(base, "/abs/Other.csproj"),
            PathBuf::from("/abs/Other.csproj")
        );
    }
}
