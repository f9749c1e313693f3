//! `write-translations`: extract translatable strings of the default language.
//!
//! Writes `i18n/<tag>.json`, where `<tag>` is the default language of
//! `languages.json` (or `en` without one):
//!
//! ```json
//! {
//!   "_comment": "…",
//!   "localized-strings": {
//!     "foo/bar": "Bar title",
//!     "foo/bar.sidebar_label": "Bar",
//!     "Guides": "Guides",
//!     "tagline": "…"
//!   }
//! }
//! ```
//!
//! Only the current docs of the default language contribute. Versioned and
//! translated copies are covered by their own catalogs.

use crate::config::{ConfigError, I18N_DIR, PluginConfig, load_config};
use crate::env::{EnvError, NEXT_VERSION, VERSION_PREFIX, load_translation};
use crate::plugin::PluginError;
use crate::plugins::docs::load_docs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Catalog tag when no language registry exists.
pub const FALLBACK_LANGUAGE: &str = "en";

const COMMENT: &str = "Generated by `docweave write-translations`. Changes are overwritten on the next run.";

#[derive(Error, Debug)]
pub enum TranslationsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct Catalog<'a> {
    #[serde(rename = "_comment")]
    comment: &'a str,
    #[serde(rename = "localized-strings")]
    localized_strings: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationsWritten {
    pub path: PathBuf,
    pub language: String,
    pub strings: BTreeMap<String, String>,
}

/// Every translatable string of the site's current default-language docs.
pub fn collect_strings(site_dir: &Path) -> Result<BTreeMap<String, String>, TranslationsError> {
    let config = load_config(site_dir)?;
    let mut strings = BTreeMap::new();
    if !config.tagline.is_empty() {
        strings.insert("tagline".to_string(), config.tagline.clone());
    }

    for plugin in &config.plugins {
        let PluginConfig::Docs(options) = plugin else {
            continue;
        };
        let Some(content) = load_docs(site_dir, &config.base_url, options)? else {
            continue;
        };
        let current = content.docs.values().filter(|doc| {
            doc.language.is_none() && doc.version.as_deref().is_none_or(|v| v == NEXT_VERSION)
        });
        for doc in current {
            strings.insert(doc.unversioned_id.clone(), doc.title.clone());
            if let Some(label) = &doc.sidebar_label {
                strings.insert(format!("{}.sidebar_label", doc.unversioned_id), label.clone());
            }
        }
        let unscoped = content
            .docs_sidebars
            .iter()
            .filter(|s| !s.name.starts_with(VERSION_PREFIX) && !s.name.contains('/'));
        for sidebar in unscoped {
            for category in &sidebar.categories {
                strings.insert(category.name.clone(), category.name.clone());
            }
        }
    }
    Ok(strings)
}

/// Write the default-language catalog to `i18n/<tag>.json`.
pub fn write_translations(site_dir: &Path) -> Result<TranslationsWritten, TranslationsError> {
    let translation = load_translation(site_dir)?;
    let language = translation
        .default_tag()
        .unwrap_or(FALLBACK_LANGUAGE)
        .to_string();
    let strings = collect_strings(site_dir)?;

    let dir = site_dir.join(I18N_DIR);
    let path = dir.join(format!("{language}.json"));
    let catalog = Catalog {
        comment: COMMENT,
        localized_strings: &strings,
    };
    let content = serde_json::to_string_pretty(&catalog).map_err(|source| TranslationsError::Json {
        path: path.clone(),
        source,
    })?;
    fs::create_dir_all(&dir)
        .and_then(|()| fs::write(&path, format!("{content}\n")))
        .map_err(|source| TranslationsError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::info!(language = %language, strings = strings.len(), path = %path.display(), "Wrote translations");
    Ok(TranslationsWritten {
        path,
        language,
        strings,
    })
}
