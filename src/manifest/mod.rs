//! Hook manifests.
//!
//! A hook repository declares the hooks it offers in a YAML file at the root
//! of its checkout. This module loads and validates that file and merges its
//! entries with configuration overrides.

mod hook;

pub use hook::{Hook, HookOverride, HookSet};

use crate::core::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Manifest file name at the root of a hook repository.
pub const MANIFEST_FILE: &str = "hooks.yaml";

/// Hooks declared by one repository, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    hooks: HashMap<String, Hook>,
}

impl Manifest {
    /// Loads and validates the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let hooks = load_hooks(path)?;
        Self::from_hooks(path, hooks)
    }

    /// Builds a manifest from already parsed hooks, validating them.
    pub fn from_hooks(path: impl Into<PathBuf>, hooks: Vec<Hook>) -> Result<Self> {
        let path = path.into();
        let mut by_id = HashMap::with_capacity(hooks.len());
        for mut hook in hooks {
            validate_hook(&path, &hook)?;
            if hook.name.is_empty() {
                hook.name.clone_from(&hook.id);
            }
            if by_id.contains_key(&hook.id) {
                return Err(Error::manifest_invalid(
                    &path,
                    format!("duplicate hook id '{}'", hook.id),
                ));
            }
            by_id.insert(hook.id.clone(), hook);
        }
        Ok(Self { path, hooks: by_id })
    }

    /// Returns the path the manifest was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a declared hook.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Hook> {
        self.hooks.get(id)
    }

    /// Returns the declared hook ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of declared hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if the manifest declares no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Parses the manifest at `path` into hooks, in file order.
pub fn load_hooks(path: &Path) -> Result<Vec<Hook>> {
    if !path.is_file() {
        return Err(Error::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::io("read manifest", e))?;
    parse_hooks(path, &content)
}

/// Parses manifest `content`; `path` is only used for error messages.
pub fn parse_hooks(path: &Path, content: &str) -> Result<Vec<Hook>> {
    serde_yaml::from_str(content).map_err(|e| Error::manifest_parse(path, e))
}

fn validate_hook(path: &Path, hook: &Hook) -> Result<()> {
    for (field, value) in [
        ("id", &hook.id),
        ("entry", &hook.entry),
        ("language", &hook.language),
    ] {
        if value.trim().is_empty() {
            return Err(Error::manifest_invalid(
                path,
                format!("hook '{}' has an empty '{field}'", hook.id),
            ));
        }
    }
    check_pattern(&hook.files).map_err(|e| {
        Error::manifest_invalid(path, format!("hook '{}' has invalid files: {e}", hook.id))
    })?;
    if let Some(exclude) = &hook.exclude {
        check_pattern(exclude).map_err(|e| {
            Error::manifest_invalid(path, format!("hook '{}' has invalid exclude: {e}", hook.id))
        })?;
    }
    Ok(())
}

/// Compiles a file selection pattern, returning the regex error text.
pub(crate) fn check_pattern(pattern: &str) -> std::result::Result<(), String> {
    Regex::new(pattern).map(drop).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r"
- id: lint
  name: Lint
  entry: lint.sh
  language: script
  files: \.txt$
- id: fmt
  entry: fmt
  language: python
  args: [--check]
";

    fn write_manifest(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(MANIFEST_FILE);
        std::fs::write(&path, content).expect("write manifest");
        (temp, path)
    }

    #[test]
    fn test_load_manifest() {
        let (_temp, path) = write_manifest(MANIFEST);
        let manifest = Manifest::load(&path).expect("load manifest");

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.ids(), vec!["fmt", "lint"]);
        let fmt = manifest.get("fmt").expect("fmt hook");
        assert_eq!(fmt.name, "fmt");
        assert_eq!(fmt.args, vec!["--check".to_string()]);
        assert_eq!(fmt.language_version, "default");
        assert_eq!(manifest.get("lint").map(|h| h.files.as_str()), Some(r"\.txt$"));
    }

    #[test]
    fn test_load_hooks_keeps_file_order() {
        let (_temp, path) = write_manifest(MANIFEST);
        let ids: Vec<String> = load_hooks(&path)
            .expect("load")
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec!["lint".to_string(), "fmt".to_string()]);
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().expect("create temp dir");
        let result = Manifest::load(&temp.path().join(MANIFEST_FILE));
        assert!(matches!(result, Err(Error::ManifestNotFound { .. })));
    }

    #[test]
    fn test_malformed_manifest() {
        let (_temp, path) = write_manifest("- id: [unclosed\n");
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_manifest_missing_required_field() {
        let (_temp, path) = write_manifest("- id: lint\n  entry: lint\n");
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let (_temp, path) = write_manifest(
            "- {id: lint, entry: a, language: system}\n- {id: lint, entry: b, language: system}\n",
        );
        let err = Manifest::load(&path).expect_err("duplicate ids");
        assert!(matches!(&err, Error::ManifestInvalid { message, .. } if message.contains("duplicate")));
    }

    #[test]
    fn test_empty_language_rejected() {
        let (_temp, path) = write_manifest("- {id: lint, entry: a, language: ''}\n");
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn test_invalid_files_regex_rejected() {
        let (_temp, path) =
            write_manifest("- {id: lint, entry: a, language: system, files: '(unclosed'}\n");
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn test_empty_manifest() {
        let (_temp, path) = write_manifest("[]\n");
        let manifest = Manifest::load(&path).expect("load");
        assert!(manifest.is_empty());
        assert_eq!(manifest.path(), path.as_path());
    }
}
