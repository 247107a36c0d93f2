//! Hook metadata and configuration overrides.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Manifest;

fn default_language_version() -> String {
    "default".to_string()
}

/// A hook as declared by a repository's manifest, or the effective hook
/// after configuration overrides were applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Unique id of the hook within its repository.
    pub id: String,
    /// Display name. Defaults to the id.
    #[serde(default)]
    pub name: String,
    /// Command (or script path, depending on the language) to execute.
    pub entry: String,
    /// Name of the language backend that installs and runs the hook.
    pub language: String,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Regex selecting the files the hook applies to. Empty matches all.
    #[serde(default)]
    pub files: String,
    /// Regex of files to leave out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Extra arguments passed before the file list.
    #[serde(default)]
    pub args: Vec<String>,
    /// Language version requested by the hook.
    #[serde(default = "default_language_version")]
    pub language_version: String,
}

impl Hook {
    /// Returns this hook with every field present in `overrides` replaced.
    #[must_use]
    pub fn merged(&self, overrides: &HookOverride) -> Self {
        Self {
            id: self.id.clone(),
            name: overrides.name.clone().unwrap_or_else(|| self.name.clone()),
            entry: overrides.entry.clone().unwrap_or_else(|| self.entry.clone()),
            language: overrides
                .language
                .clone()
                .unwrap_or_else(|| self.language.clone()),
            description: overrides
                .description
                .clone()
                .or_else(|| self.description.clone()),
            files: overrides.files.clone().unwrap_or_else(|| self.files.clone()),
            exclude: overrides.exclude.clone().or_else(|| self.exclude.clone()),
            args: overrides.args.clone().unwrap_or_else(|| self.args.clone()),
            language_version: overrides
                .language_version
                .clone()
                .unwrap_or_else(|| self.language_version.clone()),
        }
    }

    /// Returns the display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Caller-side settings for one hook of a repository.
///
/// Every field except `id` is optional; present fields take precedence over
/// the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookOverride {
    /// Id of the manifest hook to use.
    pub id: String,
    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Entry override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    /// Language override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Description override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// File selection regex override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,
    /// Exclusion regex override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Argument list override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Language version override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
}

impl HookOverride {
    /// Creates an override that only selects the hook.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Effective hooks of a repository, in configuration order, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSet {
    hooks: Vec<Hook>,
    index: HashMap<String, usize>,
}

impl HookSet {
    /// Merges every override with its manifest entry.
    ///
    /// Fails on the first override whose id the manifest does not declare;
    /// no partial set is returned.
    pub fn resolve(overrides: &[HookOverride], manifest: &Manifest, location: &str) -> Result<Self> {
        let mut set = Self::default();
        for hook_override in overrides {
            let declared =
                manifest
                    .get(&hook_override.id)
                    .ok_or_else(|| Error::MissingManifestHook {
                        id: hook_override.id.clone(),
                        location: location.to_string(),
                    })?;
            set.push(declared.merged(hook_override));
        }
        Ok(set)
    }

    fn push(&mut self, hook: Hook) {
        // A repeated id keeps its first position and takes the later settings.
        if let Some(&i) = self.index.get(&hook.id) {
            self.hooks[i] = hook;
        } else {
            self.index.insert(hook.id.clone(), self.hooks.len());
            self.hooks.push(hook);
        }
    }

    /// Looks up a hook by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Hook> {
        self.index.get(id).map(|&i| &self.hooks[i])
    }

    /// Iterates hooks in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }

    /// Returns the number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if there are no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
