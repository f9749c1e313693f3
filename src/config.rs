//! Site configuration module.
//!
//! Handles loading, validating, and merging the site's `config.toml`. User
//! values are merged on top of stock defaults, unknown keys are rejected, and
//! the result is validated before any content is loaded.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml          # Site configuration (required)
//! ├── i18n/                # Optional string catalogs, one per language
//! │   ├── en.json
//! │   └── ja.json
//! ├── docs/
//! └── sidebars.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "My Site"         # Required
//! base_url = "/"            # Must start and end with "/"
//!
//! [[plugins]]
//! kind = "docs"             # docs | blog | pages | client-redirects
//! path = "docs"
//! route_base_path = "docs"
//! sidebar_path = "sidebars.json"
//!
//! [watch]
//! debounce_ms = 200
//!
//! [processing]
//! max_threads = 4           # Omit for auto = CPU cores
//! ```
//!
//! Run `docweave gen-config` for the fully documented stock file.
//!
//! ## Translations
//!
//! The loaded [`SiteConfig`] is never rewritten. String catalogs found under
//! `i18n/` are composed with it into an immutable [`ResolvedConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the site configuration file at the site root.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory holding per-language string catalogs.
pub const I18N_DIR: &str = "i18n";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Site config not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid translation catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// Everything except `title` has a default. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title. Required.
    pub title: String,
    /// Short description shown next to the title.
    pub tagline: String,
    /// Production URL of the site (scheme + host).
    pub url: String,
    /// URL prefix every route lives under. Starts and ends with `/`.
    pub base_url: String,
    /// Where generated route and metadata artifacts are written, relative to the site dir.
    pub generated_dir: String,
    /// Where `post_build` output (redirect pages) is written, relative to the site dir.
    pub out_dir: String,
    /// Content plugins, in registration order.
    pub plugins: Vec<PluginConfig>,
    /// File-watch settings for `start`.
    pub watch: WatchConfig,
    /// Parallel metadata extraction settings.
    pub processing: ProcessingConfig,
    /// Free-form theme configuration, passed through to generated artifacts.
    pub theme: toml::Table,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            tagline: String::new(),
            url: String::new(),
            base_url: "/".to_string(),
            generated_dir: ".docweave".to_string(),
            out_dir: "build".to_string(),
            plugins: default_plugins(),
            watch: WatchConfig::default(),
            processing: ProcessingConfig::default(),
            theme: toml::Table::new(),
        }
    }
}

fn default_plugins() -> Vec<PluginConfig> {
    vec![
        PluginConfig::Docs(DocsOptions::default()),
        PluginConfig::Blog(BlogOptions::default()),
        PluginConfig::Pages(PagesOptions::default()),
    ]
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title is required".into()));
        }
        if !self.base_url.starts_with('/') || !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_url must start and end with '/', got '{}'",
                self.base_url
            )));
        }
        if self.generated_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "generated_dir must not be empty".into(),
            ));
        }

        let mut seen = Vec::new();
        for plugin in &self.plugins {
            let key = (plugin.kind_name(), plugin.id().to_string());
            if seen.contains(&key) {
                return Err(ConfigError::Validation(format!(
                    "plugin '{}' registered twice with id '{}'",
                    key.0, key.1
                )));
            }
            seen.push(key);
            plugin.validate()?;
        }
        Ok(())
    }
}

/// One entry of the `[[plugins]]` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PluginConfig {
    Docs(DocsOptions),
    Blog(BlogOptions),
    Pages(PagesOptions),
    ClientRedirects(RedirectsOptions),
}

impl PluginConfig {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PluginConfig::Docs(_) => "docs",
            PluginConfig::Blog(_) => "blog",
            PluginConfig::Pages(_) => "pages",
            PluginConfig::ClientRedirects(_) => "client-redirects",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PluginConfig::Docs(o) => &o.id,
            PluginConfig::Blog(o) => &o.id,
            PluginConfig::Pages(o) => &o.id,
            PluginConfig::ClientRedirects(o) => &o.id,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PluginConfig::Docs(o) => {
                validate_include(&o.include, "docs")?;
                if o.path.trim().is_empty() {
                    return Err(ConfigError::Validation("docs.path must not be empty".into()));
                }
            }
            PluginConfig::Blog(o) => {
                validate_include(&o.include, "blog")?;
                if o.posts_per_page == 0 {
                    return Err(ConfigError::Validation(
                        "blog.posts_per_page must be at least 1".into(),
                    ));
                }
            }
            PluginConfig::Pages(o) => validate_include(&o.include, "pages")?,
            PluginConfig::ClientRedirects(o) => {
                for ext in o.from_extensions.iter().chain(&o.to_extensions) {
                    if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
                        return Err(ConfigError::Validation(format!(
                            "redirect extension '{ext}' must be non-empty, without leading '.' and without '/'"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_include(include: &[String], plugin: &str) -> Result<(), ConfigError> {
    for pattern in include {
        glob::Pattern::new(pattern).map_err(|e| {
            ConfigError::Validation(format!("{plugin}.include pattern '{pattern}': {e}"))
        })?;
    }
    Ok(())
}

/// Plugin id used when a plugin entry does not set one.
pub const DEFAULT_PLUGIN_ID: &str = "default";

fn default_id() -> String {
    DEFAULT_PLUGIN_ID.to_string()
}

fn default_md_include() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.mdx".to_string()]
}

/// Options for a docs plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsOptions {
    pub id: String,
    /// Docs directory relative to the site dir.
    pub path: String,
    /// URL segment all docs live under.
    pub route_base_path: String,
    pub include: Vec<String>,
    /// Sidebar definition file relative to the site dir. Empty disables sidebars.
    pub sidebar_path: String,
    /// Doc id (unversioned) served at the root of each version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_id: Option<String>,
    /// When versioning is enabled, skip the unversioned `next` docs entirely.
    pub skip_next_release: bool,
    pub doc_layout_component: String,
    pub doc_item_component: String,
}

impl Default for DocsOptions {
    fn default() -> Self {
        Self {
            id: default_id(),
            path: "docs".to_string(),
            route_base_path: "docs".to_string(),
            include: default_md_include(),
            sidebar_path: "sidebars.json".to_string(),
            home_page_id: None,
            skip_next_release: false,
            doc_layout_component: "@theme/DocPage".to_string(),
            doc_item_component: "@theme/DocItem".to_string(),
        }
    }
}

/// Options for a blog plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogOptions {
    pub id: String,
    pub path: String,
    pub route_base_path: String,
    pub include: Vec<String>,
    pub posts_per_page: usize,
    pub blog_list_component: String,
    pub blog_post_component: String,
    pub blog_tags_list_component: String,
    pub blog_tags_posts_component: String,
}

impl Default for BlogOptions {
    fn default() -> Self {
        Self {
            id: default_id(),
            path: "blog".to_string(),
            route_base_path: "blog".to_string(),
            include: default_md_include(),
            posts_per_page: 10,
            blog_list_component: "@theme/BlogListPage".to_string(),
            blog_post_component: "@theme/BlogPostPage".to_string(),
            blog_tags_list_component: "@theme/BlogTagsListPage".to_string(),
            blog_tags_posts_component: "@theme/BlogTagsPostsPage".to_string(),
        }
    }
}

/// Options for a pages plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesOptions {
    pub id: String,
    pub path: String,
    pub route_base_path: String,
    pub include: Vec<String>,
    pub mdx_page_component: String,
}

impl Default for PagesOptions {
    fn default() -> Self {
        Self {
            id: default_id(),
            path: "src/pages".to_string(),
            route_base_path: String::new(),
            include: ["js", "jsx", "ts", "tsx", "md", "mdx"]
                .iter()
                .map(|ext| format!("**/*.{ext}"))
                .collect(),
            mdx_page_component: "@theme/MDXPage".to_string(),
        }
    }
}

/// Options for the client-redirects plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectsOptions {
    pub id: String,
    /// Route paths ending in one of these extensions get an extension-less alias.
    pub from_extensions: Vec<String>,
    /// Route paths get an alias with each of these extensions appended.
    pub to_extensions: Vec<String>,
    /// Prefix rewrite rules, evaluated after the extension rules.
    pub create_redirects: Vec<PrefixRedirect>,
}

impl Default for RedirectsOptions {
    fn default() -> Self {
        Self {
            id: default_id(),
            from_extensions: Vec::new(),
            to_extensions: Vec::new(),
            create_redirects: Vec::new(),
        }
    }
}

/// For every route under `to_prefix`, redirect `from_prefix + rest` to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixRedirect {
    pub from_prefix: String,
    pub to_prefix: String,
}

/// File-watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet period after the last file event before a reload starts.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of metadata extraction threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).unwrap_or(toml::Value::Table(toml::Table::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `config.toml` from the site dir as a raw TOML value.
pub fn load_raw_config(site_dir: &Path) -> Result<toml::Value, ConfigError> {
    let config_path = site_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Err(ConfigError::NotFound(config_path));
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an overlay onto a base value, then deserialize and validate.
pub fn resolve_config(base: toml::Value, overlay: toml::Value) -> Result<SiteConfig, ConfigError> {
    let merged = merge_toml(base, overlay);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load and validate `config.toml` from the site dir.
pub fn load_config(site_dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(site_dir)?)
}

/// Site configuration composed with the string catalogs of every language.
///
/// Built once per load pass and shared read-only with every plugin.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    #[serde(flatten)]
    pub site: SiteConfig,
    /// Language tag → catalog contents of `i18n/<tag>.json`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, serde_json::Value>,
}

impl ResolvedConfig {
    pub fn new(site: SiteConfig, translations: BTreeMap<String, serde_json::Value>) -> Self {
        Self { site, translations }
    }
}

/// Read every `i18n/<tag>.json` catalog under the site dir.
///
/// A missing `i18n/` directory yields an empty map.
pub fn load_translations(
    site_dir: &Path,
) -> Result<BTreeMap<String, serde_json::Value>, ConfigError> {
    let dir = site_dir.join(I18N_DIR);
    let mut catalogs = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(catalogs);
    }
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !path.is_file() || !is_json {
            continue;
        }
        let Some(tag) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Catalog { path: path.clone(), source })?;
        catalogs.insert(tag, value);
    }
    Ok(catalogs)
}

/// Load `config.toml` and compose it with the site's translation catalogs.
pub fn load_resolved(site_dir: &Path) -> Result<ResolvedConfig, ConfigError> {
    let site = load_config(site_dir)?;
    let translations = load_translations(site_dir)?;
    Ok(ResolvedConfig::new(site, translations))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docweave Configuration
# ======================
# Only `title` is required. Values shown below are the defaults.
# Unknown keys will cause an error.

title = "My Site"
tagline = ""
url = "https://example.com"

# URL prefix every route lives under. Must start and end with "/".
base_url = "/"

# Generated route/metadata artifacts, relative to the site directory.
generated_dir = ".docweave"

# post-build output (redirect pages), relative to the site directory.
out_dir = "build"

# ---------------------------------------------------------------------------
# Plugins, in registration order. Omitting [[plugins]] entirely registers
# docs, blog and pages with their defaults.
# ---------------------------------------------------------------------------
[[plugins]]
kind = "docs"
id = "default"
path = "docs"
route_base_path = "docs"
include = ["**/*.md", "**/*.mdx"]
sidebar_path = "sidebars.json"
# Doc served at the root of each version, e.g. /docs/
# home_page_id = "introduction"
skip_next_release = false
doc_layout_component = "@theme/DocPage"
doc_item_component = "@theme/DocItem"

[[plugins]]
kind = "blog"
path = "blog"
route_base_path = "blog"
posts_per_page = 10

[[plugins]]
kind = "pages"
path = "src/pages"

# [[plugins]]
# kind = "client-redirects"
# from_extensions = ["html"]
# to_extensions = ["html"]
#
# [[plugins.create_redirects]]
# from_prefix = "/legacy"
# to_prefix = "/docs"

# ---------------------------------------------------------------------------
# File watching (docweave start)
# ---------------------------------------------------------------------------
[watch]
# Quiet period after the last change before a reload starts.
debounce_ms = 200

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel metadata extraction threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4

# ---------------------------------------------------------------------------
# Theme config (free-form, passed through to generated site config)
# ---------------------------------------------------------------------------
[theme]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) {
        fs::write(dir.join(CONFIG_FILE_NAME), body).unwrap();
    }

    #[test]
    fn default_config_registers_content_plugins() {
        let config = SiteConfig::default();
        let kinds: Vec<&str> = config.plugins.iter().map(|p| p.kind_name()).collect();
        assert_eq!(kinds, vec!["docs", "blog", "pages"]);
        assert_eq!(config.base_url, "/");
    }

    #[test]
    fn default_docs_options() {
        let docs = DocsOptions::default();
        assert_eq!(docs.path, "docs");
        assert_eq!(docs.route_base_path, "docs");
        assert_eq!(docs.include, vec!["**/*.md", "**/*.mdx"]);
        assert_eq!(docs.home_page_id, None);
    }

    #[test]
    fn load_config_requires_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_requires_title() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "tagline = \"no title\"\n");
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("title")));
    }

    #[test]
    fn load_config_merges_over_defaults() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
title = "Site"

[watch]
debounce_ms = 50
"#,
        );
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Site");
        assert_eq!(config.watch.debounce_ms, 50);
        assert_eq!(config.generated_dir, ".docweave");
        assert_eq!(config.plugins.len(), 3);
    }

    #[test]
    fn plugins_array_replaces_defaults() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
title = "Site"

[[plugins]]
kind = "docs"
home_page_id = "hello"

[[plugins]]
kind = "client-redirects"
to_extensions = ["html"]
"#,
        );
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.plugins.len(), 2);
        match &config.plugins[0] {
            PluginConfig::Docs(docs) => {
                assert_eq!(docs.home_page_id.as_deref(), Some("hello"));
                assert_eq!(docs.path, "docs");
            }
            other => panic!("expected docs plugin, got {other:?}"),
        }
        match &config.plugins[1] {
            PluginConfig::ClientRedirects(r) => assert_eq!(r.to_extensions, vec!["html"]),
            other => panic!("expected redirects plugin, got {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "title = \"Site\"\nbase_ulr = \"/\"\n");
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn base_url_must_be_slash_delimited() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "title = \"Site\"\nbase_url = \"/docs\"\n");
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(msg)) if msg.contains("base_url")
        ));
    }

    #[test]
    fn duplicate_plugin_id_rejected() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
title = "Site"

[[plugins]]
kind = "docs"

[[plugins]]
kind = "docs"
path = "other"
"#,
        );
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(msg)) if msg.contains("twice")
        ));
    }

    #[test]
    fn redirect_extension_with_dot_rejected() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
title = "Site"

[[plugins]]
kind = "client-redirects"
from_extensions = [".html"]
"#,
        );
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(msg)) if msg.contains(".html")
        ));
    }

    #[test]
    fn stock_config_parses_and_validates() {
        let overlay: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), overlay).unwrap();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.plugins.len(), 3);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_threads: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn translations_loaded_from_i18n_dir() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "title = \"Site\"\n");
        fs::create_dir_all(tmp.path().join(I18N_DIR)).unwrap();
        fs::write(
            tmp.path().join(I18N_DIR).join("ja.json"),
            r#"{"localized-strings": {"hello": "こんにちは"}}"#,
        )
        .unwrap();

        let resolved = load_resolved(tmp.path()).unwrap();
        assert_eq!(resolved.translations["ja"]["localized-strings"]["hello"], "こんにちは");
        assert!(!resolved.translations.contains_key("fr"));
    }

    #[test]
    fn malformed_catalog_names_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(I18N_DIR)).unwrap();
        fs::write(tmp.path().join(I18N_DIR).join("en.json"), "{not json").unwrap();
        let err = load_translations(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("en.json"));
    }
}
