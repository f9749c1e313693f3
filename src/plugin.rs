//! Plugin interface and registry.
//!
//! A plugin turns part of the site tree into routes and data artifacts. Every
//! capability has a no-op default, so a plugin implements only what it uses:
//!
//! | Method | Called | Typical use |
//! |--------|--------|-------------|
//! | [`Plugin::load_content`] | once per load pass | scan and parse content |
//! | [`Plugin::content_loaded`] | right after, with the content | add routes, create data |
//! | [`Plugin::routes_loaded`] | after all routes are known | validate against the full route list |
//! | [`Plugin::post_build`] | after artifacts are written (`build` only) | write extra output files |
//! | [`Plugin::paths_to_watch`] | when `start` sets up the watcher | glob patterns to reload on |
//!
//! Plugins are stateless between passes: every reload builds a fresh
//! [`PluginRegistry`] from the current config.

use crate::config::{PluginConfig, ResolvedConfig, SiteConfig};
use crate::env::{EnvError, TranslationEnv};
use crate::frontmatter::FrontMatterError;
use crate::metadata::MetadataError;
use crate::order::OrderError;
use crate::plugins::{BlogPlugin, ClientRedirectsPlugin, DocsPlugin, PagesPlugin};
use crate::redirects::RedirectError;
use crate::routes::RouteConfig;
use crate::scan::ScanError;
use crate::sidebar::SidebarError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Sidebar(#[from] SidebarError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front-matter in {path}: {source}")]
    Content {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("Invalid date '{value}' in {path}, expected YYYY-MM-DD")]
    InvalidDate { path: PathBuf, value: String },
    #[error("Failed to serialize {name}: {source}")]
    Json {
        name: String,
        source: serde_json::Error,
    },
}

/// Read-only inputs of a load pass.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub site_dir: &'a Path,
    pub config: &'a ResolvedConfig,
    /// Site-wide language registry.
    pub translation: &'a TranslationEnv,
}

impl LoadContext<'_> {
    pub fn site(&self) -> &SiteConfig {
        &self.config.site
    }

    pub fn base_url(&self) -> &str {
        &self.config.site.base_url
    }
}

/// Inputs of [`Plugin::post_build`].
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub site_dir: &'a Path,
    pub out_dir: &'a Path,
    pub routes_paths: &'a [String],
}

/// A data artifact created by a plugin, kept in memory until written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// `/`-separated path relative to the generated dir.
    pub path: String,
    pub content: String,
}

/// What a plugin may do while its content is loaded.
///
/// Data files are namespaced per plugin instance under
/// `<plugin-name>/<id>/`; the returned `@generated/…` alias is what route
/// modules reference.
#[derive(Debug)]
pub struct Actions {
    prefix: String,
    routes: Vec<RouteConfig>,
    data: Vec<DataFile>,
}

impl Actions {
    pub fn new(plugin_name: &str, plugin_id: &str) -> Self {
        Self {
            prefix: format!("{plugin_name}/{plugin_id}"),
            routes: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn add_route(&mut self, route: RouteConfig) {
        self.routes.push(route);
    }

    /// Record a data file under this plugin's namespace. Returns its alias.
    pub fn create_data(&mut self, name: &str, content: String) -> String {
        let path = format!("{}/{name}", self.prefix);
        let alias = format!("@generated/{path}");
        self.data.push(DataFile { path, content });
        alias
    }

    /// [`Actions::create_data`] with pretty-printed JSON content.
    pub fn create_json<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<String, PluginError> {
        let content = serde_json::to_string_pretty(value).map_err(|source| PluginError::Json {
            name: name.to_string(),
            source,
        })?;
        Ok(self.create_data(name, content))
    }

    pub fn into_parts(self) -> (Vec<RouteConfig>, Vec<DataFile>) {
        (self.routes, self.data)
    }
}

pub trait Plugin: Send + Sync {
    /// Content handed from [`Plugin::load_content`] to [`Plugin::content_loaded`].
    type Content: Send + Sync;

    fn name(&self) -> &'static str;

    fn id(&self) -> &str;

    /// `Ok(None)` means the plugin has nothing to contribute this pass.
    fn load_content(&self, _ctx: &LoadContext) -> Result<Option<Self::Content>, PluginError> {
        Ok(None)
    }

    fn content_loaded(
        &self,
        _ctx: &LoadContext,
        _content: &Self::Content,
        _actions: &mut Actions,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn routes_loaded(&self, _routes_paths: &[String]) -> Result<(), PluginError> {
        Ok(())
    }

    fn post_build(&self, _ctx: &BuildContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Absolute glob patterns whose changes should trigger a reload.
    fn paths_to_watch(&self, _ctx: &LoadContext) -> Vec<String> {
        Vec::new()
    }

    /// One-line description of loaded content for CLI summaries.
    fn summary(&self, _content: &Self::Content) -> String {
        String::new()
    }
}

/// Result of loading one plugin.
#[derive(Debug, Clone, Default)]
pub struct PluginOutput {
    pub name: &'static str,
    pub id: String,
    pub routes: Vec<RouteConfig>,
    pub data: Vec<DataFile>,
    /// `None` when the plugin had no content.
    pub summary: Option<String>,
}

/// Object-safe view of a [`Plugin`], implemented for every plugin.
pub trait DynPlugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn id(&self) -> &str;
    fn load(&self, ctx: &LoadContext) -> Result<PluginOutput, PluginError>;
    fn routes_loaded(&self, routes_paths: &[String]) -> Result<(), PluginError>;
    fn post_build(&self, ctx: &BuildContext) -> Result<(), PluginError>;
    fn paths_to_watch(&self, ctx: &LoadContext) -> Vec<String>;
}

impl<P: Plugin> DynPlugin for P {
    fn name(&self) -> &'static str {
        Plugin::name(self)
    }

    fn id(&self) -> &str {
        Plugin::id(self)
    }

    fn load(&self, ctx: &LoadContext) -> Result<PluginOutput, PluginError> {
        let mut output = PluginOutput {
            name: Plugin::name(self),
            id: Plugin::id(self).to_string(),
            ..PluginOutput::default()
        };
        let Some(content) = self.load_content(ctx)? else {
            tracing::debug!(plugin = output.name, id = %output.id, "No content");
            return Ok(output);
        };
        let mut actions = Actions::new(output.name, &output.id);
        self.content_loaded(ctx, &content, &mut actions)?;
        let (routes, data) = actions.into_parts();
        output.routes = routes;
        output.data = data;
        output.summary = Some(self.summary(&content));
        Ok(output)
    }

    fn routes_loaded(&self, routes_paths: &[String]) -> Result<(), PluginError> {
        Plugin::routes_loaded(self, routes_paths)
    }

    fn post_build(&self, ctx: &BuildContext) -> Result<(), PluginError> {
        Plugin::post_build(self, ctx)
    }

    fn paths_to_watch(&self, ctx: &LoadContext) -> Vec<String> {
        Plugin::paths_to_watch(self, ctx)
    }
}

/// Plugins of one load pass, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn DynPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One plugin per `[[plugins]]` entry, in config order.
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut registry = Self::new();
        for entry in &config.plugins {
            let plugin: Box<dyn DynPlugin> = match entry {
                PluginConfig::Docs(o) => Box::new(DocsPlugin::new(o.clone())),
                PluginConfig::Blog(o) => Box::new(BlogPlugin::new(o.clone())),
                PluginConfig::Pages(o) => Box::new(PagesPlugin::new(o.clone())),
                PluginConfig::ClientRedirects(o) => Box::new(ClientRedirectsPlugin::new(o.clone())),
            };
            registry.register(plugin);
        }
        registry
    }

    pub fn register(&mut self, plugin: Box<dyn DynPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn DynPlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
