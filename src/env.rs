//! Translation and versioning environment.
//!
//! Both features are switched on by marker files at the site root:
//!
//! ```text
//! site/
//! ├── languages.json             # translation registry → translation enabled
//! ├── versions.json              # version manifest     → versioning enabled
//! ├── versioned_docs/
//! │   └── version-1.0.0/
//! ├── versioned_sidebars/
//! │   └── version-1.0.0-sidebars.json
//! └── translated_docs/
//!     └── ja/
//! ```
//!
//! Docs plugins with a non-default id use prefixed names
//! (`community_versions.json`, `community_versioned_docs/`, …). A missing
//! marker file disables the feature; a malformed one is an error.

use crate::config::DEFAULT_PLUGIN_ID;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LANGUAGES_FILE: &str = "languages.json";
pub const TRANSLATED_DOCS_DIR: &str = "translated_docs";

/// Path-segment marker for versioned folders (`version-1.0.0`).
pub const VERSION_PREFIX: &str = "version-";

/// Version label for the unversioned docs tree.
pub const NEXT_VERSION: &str = "next";

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} lists no enabled language")]
    NoLanguage(PathBuf),
    #[error("Version '{version}' listed twice in {path}")]
    DuplicateVersion { version: String, path: PathBuf },
}

/// An entry of `languages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub tag: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEnv {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<Language>,
    pub enabled_languages: Vec<Language>,
}

impl TranslationEnv {
    pub fn default_tag(&self) -> Option<&str> {
        self.default_language.as_ref().map(|l| l.tag.as_str())
    }

    pub fn enabled_tags(&self) -> Vec<&str> {
        self.enabled_languages.iter().map(|l| l.tag.as_str()).collect()
    }

    /// Enabled tags other than the default language.
    pub fn translated_tags(&self) -> Vec<&str> {
        let default = self.default_tag();
        self.enabled_languages
            .iter()
            .map(|l| l.tag.as_str())
            .filter(|tag| Some(*tag) != default)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningEnv {
    pub enabled: bool,
    /// Manifest order: newest first.
    pub versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Root of the versioned docs trees.
    pub docs_dir: PathBuf,
    /// Root of the versioned sidebar files.
    pub sidebars_dir: PathBuf,
}

impl VersioningEnv {
    pub fn is_latest(&self, version: &str) -> bool {
        self.latest_version.as_deref() == Some(version)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// `version-<label>` folder names for every listed version.
    pub fn version_folders(&self) -> Vec<String> {
        self.versions
            .iter()
            .map(|v| format!("{VERSION_PREFIX}{v}"))
            .collect()
    }

    /// Sidebar file of a version: `<sidebars_dir>/version-<label>-sidebars.json`.
    pub fn sidebar_file(&self, version: &str) -> PathBuf {
        self.sidebars_dir
            .join(format!("{VERSION_PREFIX}{version}-sidebars.json"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Env {
    pub translation: TranslationEnv,
    pub versioning: VersioningEnv,
}

/// `versions.json`, or `<id>_versions.json` for a non-default plugin id.
pub fn versions_file(site_dir: &Path, plugin_id: &str) -> PathBuf {
    site_dir.join(prefixed(plugin_id, "versions.json"))
}

pub fn versioned_docs_dir(site_dir: &Path, plugin_id: &str) -> PathBuf {
    site_dir.join(prefixed(plugin_id, "versioned_docs"))
}

pub fn versioned_sidebars_dir(site_dir: &Path, plugin_id: &str) -> PathBuf {
    site_dir.join(prefixed(plugin_id, "versioned_sidebars"))
}

fn prefixed(plugin_id: &str, name: &str) -> String {
    if plugin_id == DEFAULT_PLUGIN_ID {
        name.to_string()
    } else {
        format!("{plugin_id}_{name}")
    }
}

/// Resolve translation and versioning state for one docs plugin.
pub fn load_env(site_dir: &Path, plugin_id: &str) -> Result<Env, EnvError> {
    Ok(Env {
        translation: load_translation(site_dir)?,
        versioning: load_versioning(site_dir, plugin_id)?,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EnvError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| EnvError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the site-wide language registry alone.
pub fn load_translation(site_dir: &Path) -> Result<TranslationEnv, EnvError> {
    let path = site_dir.join(LANGUAGES_FILE);
    if !path.is_file() {
        return Ok(TranslationEnv::default());
    }
    let languages: Vec<Language> = read_json(&path)?;
    let enabled_languages: Vec<Language> = languages.into_iter().filter(|l| l.enabled).collect();
    let default_language = enabled_languages
        .first()
        .cloned()
        .ok_or_else(|| EnvError::NoLanguage(path.clone()))?;
    tracing::debug!(
        default = %default_language.tag,
        count = enabled_languages.len(),
        "Translation enabled"
    );
    Ok(TranslationEnv {
        enabled: true,
        default_language: Some(default_language),
        enabled_languages,
    })
}

fn load_versioning(site_dir: &Path, plugin_id: &str) -> Result<VersioningEnv, EnvError> {
    let docs_dir = versioned_docs_dir(site_dir, plugin_id);
    let sidebars_dir = versioned_sidebars_dir(site_dir, plugin_id);
    let path = versions_file(site_dir, plugin_id);
    if !path.is_file() {
        return Ok(VersioningEnv {
            docs_dir,
            sidebars_dir,
            ..VersioningEnv::default()
        });
    }
    let versions: Vec<String> = read_json(&path)?;
    for (i, version) in versions.iter().enumerate() {
        if versions[..i].contains(version) {
            return Err(EnvError::DuplicateVersion {
                version: version.clone(),
                path,
            });
        }
    }
    tracing::debug!(versions = ?versions, "Versioning enabled");
    Ok(VersioningEnv {
        enabled: true,
        latest_version: versions.first().cloned(),
        versions,
        docs_dir,
        sidebars_dir,
    })
}
