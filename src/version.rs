//! `docs:version`: freeze the current docs as a named version.
//!
//! ```text
//! docs/foo/bar.md  ──copy──▶  versioned_docs/version-1.1.0/foo/bar.md
//! sidebars.json    ──ns────▶  versioned_sidebars/version-1.1.0-sidebars.json
//! versions.json    ["1.0.0"] ─▶ ["1.1.0", "1.0.0"]
//! ```
//!
//! Sidebars are written already namespaced, so the file loads the same way
//! as a hand-written one.

use crate::config::{ConfigError, DocsOptions, PluginConfig, load_config};
use crate::env::{EnvError, VERSION_PREFIX, load_env, versions_file};
use crate::sidebar::{SidebarError, load_sidebars, namespace};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum VersionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Sidebar(#[from] SidebarError),
    #[error("No docs plugin with id '{0}'")]
    UnknownPlugin(String),
    #[error("Version label must not be empty")]
    EmptyLabel,
    #[error("Invalid version label '{0}': must not contain '/' or '\\'")]
    InvalidLabel(String),
    #[error("Version '{0}' already exists")]
    Duplicate(String),
    #[error("Docs directory not found: {0}")]
    MissingDocs(PathBuf),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What a `docs:version` run created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCreated {
    pub label: String,
    pub docs_dir: PathBuf,
    pub sidebars_file: PathBuf,
    pub files_copied: usize,
    /// Manifest contents after the run, newest first.
    pub versions: Vec<String>,
}

fn validate_label(label: &str) -> Result<(), VersionError> {
    if label.trim().is_empty() {
        return Err(VersionError::EmptyLabel);
    }
    if label.contains(['/', '\\']) {
        return Err(VersionError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

fn docs_options(site_dir: &Path, plugin_id: &str) -> Result<DocsOptions, VersionError> {
    load_config(site_dir)?
        .plugins
        .into_iter()
        .find_map(|plugin| match plugin {
            PluginConfig::Docs(options) if options.id == plugin_id => Some(options),
            _ => None,
        })
        .ok_or_else(|| VersionError::UnknownPlugin(plugin_id.to_string()))
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> VersionError + '_ {
    move |source| VersionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<usize, VersionError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|source| VersionError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), VersionError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| VersionError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(path, format!("{content}\n")).map_err(io_err(path))
}

/// Snapshot the docs of plugin `plugin_id` as version `label`.
pub fn docs_version(site_dir: &Path, label: &str, plugin_id: &str) -> Result<VersionCreated, VersionError> {
    validate_label(label)?;
    let options = docs_options(site_dir, plugin_id)?;
    let env = load_env(site_dir, plugin_id)?;
    if env.versioning.contains(label) {
        return Err(VersionError::Duplicate(label.to_string()));
    }

    let source = site_dir.join(&options.path);
    if !source.is_dir() {
        return Err(VersionError::MissingDocs(source));
    }

    let docs_dir = env.versioning.docs_dir.join(format!("{VERSION_PREFIX}{label}"));
    let files_copied = copy_tree(&source, &docs_dir)?;

    let sidebars = if options.sidebar_path.is_empty() {
        Default::default()
    } else {
        load_sidebars(&site_dir.join(&options.sidebar_path))?
    };
    let sidebars_file = env.versioning.sidebar_file(label);
    write_json(&sidebars_file, &namespace(sidebars, label))?;

    let mut versions = env.versioning.versions;
    versions.insert(0, label.to_string());
    write_json(&versions_file(site_dir, plugin_id), &versions)?;

    tracing::info!(
        version = %label,
        files = files_copied,
        dir = %docs_dir.display(),
        "Created docs version"
    );
    Ok(VersionCreated {
        label: label.to_string(),
        docs_dir,
        sidebars_file,
        files_copied,
        versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;

    #[test]
    fn snapshot_of_simple_site() {
        let tmp = setup_fixtures("simple-site");
        let created = docs_version(tmp.path(), "1.0.0", "default").unwrap();

        assert_eq!(created.versions, vec!["1.0.0"]);
        assert!(tmp.path().join("versioned_docs/version-1.0.0/hello.md").is_file());
        assert!(tmp.path().join("versioned_docs/version-1.0.0/foo/bar.md").is_file());
        assert!(created.files_copied >= 3);

        let sidebars: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("versioned_sidebars/version-1.0.0-sidebars.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            sidebars["version-1.0.0/docs"]["Test"][0],
            "version-1.0.0/foo/bar"
        );

        let manifest = fs::read_to_string(tmp.path().join("versions.json")).unwrap();
        let versions: Vec<String> = serde_json::from_str(&manifest).unwrap();
        assert_eq!(versions, vec!["1.0.0"]);
    }

    #[test]
    fn new_label_goes_first() {
        let tmp = setup_fixtures("versioned-site");
        let created = docs_version(tmp.path(), "2.0.0", "default").unwrap();
        assert_eq!(created.versions, vec!["2.0.0", "1.0.1", "1.0.0", "withSlugs"]);
    }

    #[test]
    fn new_version_loads_as_latest() {
        let tmp = setup_fixtures("simple-site");
        docs_version(tmp.path(), "1.0.0", "default").unwrap();
        let env = load_env(tmp.path(), "default").unwrap();
        assert!(env.versioning.enabled);
        assert!(env.versioning.is_latest("1.0.0"));
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let tmp = setup_fixtures("versioned-site");
        let err = docs_version(tmp.path(), "1.0.0", "default").unwrap_err();
        assert!(matches!(err, VersionError::Duplicate(v) if v == "1.0.0"));
    }

    #[test]
    fn bad_labels_are_rejected() {
        let tmp = setup_fixtures("simple-site");
        assert!(matches!(
            docs_version(tmp.path(), "", "default"),
            Err(VersionError::EmptyLabel)
        ));
        for label in ["1.0/beta", "1.0\\beta"] {
            assert!(matches!(
                docs_version(tmp.path(), label, "default"),
                Err(VersionError::InvalidLabel(_))
            ));
        }
        assert!(!tmp.path().join("versions.json").exists());
    }

    #[test]
    fn missing_docs_dir_is_rejected() {
        let tmp = setup_fixtures("simple-site");
        fs::remove_dir_all(tmp.path().join("docs")).unwrap();
        let err = docs_version(tmp.path(), "1.0.0", "default").unwrap_err();
        assert!(matches!(err, VersionError::MissingDocs(_)));
    }

    #[test]
    fn unknown_plugin_id_is_rejected() {
        let tmp = setup_fixtures("simple-site");
        let err = docs_version(tmp.path(), "1.0.0", "community").unwrap_err();
        assert!(matches!(err, VersionError::UnknownPlugin(id) if id == "community"));
    }
}
