//! Sidebar definition loading.
//!
//! `sidebars.json` maps sidebar names to categories, and categories to
//! ordered doc ids. Key order in the file is the navigation order, so both
//! levels deserialize into ordered lists instead of maps:
//!
//! ```json
//! {
//!   "docs": {
//!     "Getting Started": ["hello", "install"],
//!     "Guides": ["foo/bar", "foo/baz"]
//!   }
//! }
//! ```
//!
//! Each version carries its own file under `versioned_sidebars/`. Versioned
//! sidebars are namespaced on load: sidebar `docs` of version `1.0.0` becomes
//! `version-1.0.0/docs`, and its ids become `version-1.0.0/<id>`.

use crate::config::DocsOptions;
use crate::env::{Env, VERSION_PREFIX};
use crate::types::DocsMetadata;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Failed to read sidebars {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid sidebars {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    pub name: String,
    pub categories: Vec<Category>,
}

impl Sidebar {
    /// Every id of every category, in navigation order.
    pub fn flattened(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.ids.iter().map(String::as_str))
    }
}

/// Sidebars in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidebars(pub Vec<Sidebar>);

impl Sidebars {
    pub fn iter(&self) -> std::slice::Iter<'_, Sidebar> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Sidebar> {
        self.0.iter().find(|s| s.name == name)
    }

    pub fn extend(&mut self, other: Sidebars) {
        self.0.extend(other.0);
    }

    /// Sidebars matching `keep`, in order.
    pub fn filtered(&self, keep: impl Fn(&Sidebar) -> bool) -> Sidebars {
        Sidebars(self.0.iter().filter(|s| keep(s)).cloned().collect())
    }
}

/// A JSON object read as key/value pairs in document order.
struct Ordered<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for Sidebars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Ordered::<Ordered<Vec<String>>>::deserialize(deserializer)?;
        Ok(Sidebars(
            raw.0
                .into_iter()
                .map(|(name, categories)| Sidebar {
                    name,
                    categories: categories
                        .0
                        .into_iter()
                        .map(|(name, ids)| Category { name, ids })
                        .collect(),
                })
                .collect(),
        ))
    }
}

struct CategoriesRef<'a>(&'a [Category]);

impl Serialize for CategoriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in self.0 {
            map.serialize_entry(&category.name, &category.ids)?;
        }
        map.end()
    }
}

impl Serialize for Sidebars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for sidebar in &self.0 {
            map.serialize_entry(&sidebar.name, &CategoriesRef(&sidebar.categories))?;
        }
        map.end()
    }
}

/// Read a sidebars file. A missing file yields no sidebars.
pub fn load_sidebars(path: &Path) -> Result<Sidebars, SidebarError> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "No sidebars file");
        return Ok(Sidebars::default());
    }
    let content = fs::read_to_string(path).map_err(|source| SidebarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SidebarError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn prefix_once(value: &str, prefix: &str) -> String {
    if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{prefix}{value}")
    }
}

/// Namespace sidebar names and ids with `version-<label>/`.
///
/// Already-namespaced entries are left alone, so files written by
/// `docs:version` and hand-written plain files load the same way.
pub fn namespace(sidebars: Sidebars, version: &str) -> Sidebars {
    let prefix = format!("{VERSION_PREFIX}{version}/");
    Sidebars(
        sidebars
            .0
            .into_iter()
            .map(|sidebar| Sidebar {
                name: prefix_once(&sidebar.name, &prefix),
                categories: sidebar
                    .categories
                    .into_iter()
                    .map(|category| Category {
                        name: category.name,
                        ids: category.ids.iter().map(|id| prefix_once(id, &prefix)).collect(),
                    })
                    .collect(),
            })
            .collect(),
    )
}

/// Rewrite a default-language id or sidebar name into a language scope.
///
/// `hello` → `ja/hello`, `version-1.0.0/hello` → `version-1.0.0/ja/hello`.
pub fn language_scoped(value: &str, language: &str) -> String {
    match value.split_once('/') {
        Some((head, rest)) if head.starts_with(VERSION_PREFIX) => {
            format!("{head}/{language}/{rest}")
        }
        _ => format!("{language}/{value}"),
    }
}

/// Sidebars of every scope a docs plugin serves.
///
/// Unversioned sidebars come from `sidebar_path`, versioned ones from
/// `versioned_sidebars/`. Language scopes are derived later, once translated
/// docs are known (see [`translated_sidebars`]).
pub fn load_docs_sidebars(
    site_dir: &Path,
    options: &DocsOptions,
    env: &Env,
) -> Result<Sidebars, SidebarError> {
    let mut sidebars = Sidebars::default();
    let skip_next = env.versioning.enabled && options.skip_next_release;
    if !options.sidebar_path.is_empty() && !skip_next {
        sidebars.extend(load_sidebars(&site_dir.join(&options.sidebar_path))?);
    }
    if env.versioning.enabled {
        for version in &env.versioning.versions {
            let path = env.versioning.sidebar_file(version);
            if !path.is_file() {
                tracing::warn!(version = %version, path = %path.display(), "Version has no sidebars file");
                continue;
            }
            sidebars.extend(namespace(load_sidebars(&path)?, version));
        }
    }
    Ok(sidebars)
}

/// Default-language sidebars restricted to the docs translated into
/// `language`, with names and ids rewritten into that language's scope.
///
/// Categories left without any translated doc are dropped, as are sidebars
/// left without any category.
pub fn translated_sidebars(base: &Sidebars, language: &str, docs: &DocsMetadata) -> Sidebars {
    let sidebars = base
        .iter()
        .filter_map(|sidebar| {
            let categories: Vec<Category> = sidebar
                .categories
                .iter()
                .filter_map(|category| {
                    let ids: Vec<String> = category
                        .ids
                        .iter()
                        .map(|id| language_scoped(id, language))
                        .filter(|id| docs.contains_key(id))
                        .collect();
                    (!ids.is_empty()).then(|| Category {
                        name: category.name.clone(),
                        ids,
                    })
                })
                .collect();
            (!categories.is_empty()).then(|| Sidebar {
                name: language_scoped(&sidebar.name, language),
                categories,
            })
        })
        .collect();
    Sidebars(sidebars)
}
