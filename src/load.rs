//! One load pass over a site.
//!
//! ```text
//! config.toml + i18n/ ─▶ ResolvedConfig
//!                          │
//!            PluginRegistry::from_config
//!                          │
//!      each plugin: load_content ─▶ content_loaded (routes, data)
//!                          │
//!                     load_routes
//!                          │
//!      each plugin: routes_loaded (validation against all routes)
//! ```
//!
//! Nothing is written here. [`crate::generate::write_generated`] persists a
//! [`LoadedSite`] and [`LoadedSite::post_build`] runs the post-build hooks.

use crate::config::{ConfigError, ResolvedConfig, load_resolved};
use crate::env::{EnvError, TranslationEnv, load_translation};
use crate::plugin::{BuildContext, DataFile, LoadContext, PluginError, PluginRegistry};
use crate::routes::{LoadedRoutes, RouteError, load_routes};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("Plugin {plugin} (id '{id}'): {source}")]
    Plugin {
        plugin: &'static str,
        id: String,
        source: PluginError,
    },
    #[error(transparent)]
    Routes(#[from] RouteError),
}

/// What one plugin contributed to a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSummary {
    pub name: &'static str,
    pub id: String,
    pub routes: usize,
    pub data_files: usize,
    /// `None` when the plugin found no content.
    pub content: Option<String>,
}

/// Result of a load pass, ready to be written.
pub struct LoadedSite {
    pub site_dir: PathBuf,
    pub config: ResolvedConfig,
    pub translation: TranslationEnv,
    pub registry: PluginRegistry,
    pub plugins: Vec<PluginSummary>,
    pub routes: LoadedRoutes,
    /// Plugin data files, in plugin order.
    pub data: Vec<DataFile>,
}

impl LoadedSite {
    pub fn generated_dir(&self) -> PathBuf {
        self.site_dir.join(&self.config.site.generated_dir)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.site_dir.join(&self.config.site.out_dir)
    }

    /// Run every plugin's post-build hook against `out_dir`.
    pub fn post_build(&self) -> Result<(), LoadError> {
        let out_dir = self.out_dir();
        let ctx = BuildContext {
            site_dir: &self.site_dir,
            out_dir: &out_dir,
            routes_paths: &self.routes.routes_paths,
        };
        for plugin in self.registry.iter() {
            plugin.post_build(&ctx).map_err(|source| LoadError::Plugin {
                plugin: plugin.name(),
                id: plugin.id().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Glob patterns a watcher should reload on, across all plugins.
    pub fn paths_to_watch(&self) -> Vec<String> {
        let ctx = LoadContext {
            site_dir: &self.site_dir,
            config: &self.config,
            translation: &self.translation,
        };
        self.registry
            .iter()
            .flat_map(|plugin| plugin.paths_to_watch(&ctx))
            .collect()
    }
}

/// Load `config.toml` and run a full pass with the plugins it registers.
pub fn load_site(site_dir: &Path) -> Result<LoadedSite, LoadError> {
    let config = load_resolved(site_dir)?;
    let registry = PluginRegistry::from_config(&config.site);
    load_with(site_dir, config, registry)
}

/// Run a full pass with an explicit registry.
pub fn load_with(
    site_dir: &Path,
    config: ResolvedConfig,
    registry: PluginRegistry,
) -> Result<LoadedSite, LoadError> {
    let translation = load_translation(site_dir)?;
    let ctx = LoadContext {
        site_dir,
        config: &config,
        translation: &translation,
    };

    let mut plugins = Vec::with_capacity(registry.len());
    let mut routes = Vec::new();
    let mut data = Vec::new();
    for plugin in registry.iter() {
        let output = plugin.load(&ctx).map_err(|source| LoadError::Plugin {
            plugin: plugin.name(),
            id: plugin.id().to_string(),
            source,
        })?;
        plugins.push(PluginSummary {
            name: output.name,
            id: output.id,
            routes: output.routes.len(),
            data_files: output.data.len(),
            content: output.summary,
        });
        routes.extend(output.routes);
        data.extend(output.data);
    }

    let routes = load_routes(routes)?;
    for plugin in registry.iter() {
        plugin
            .routes_loaded(&routes.routes_paths)
            .map_err(|source| LoadError::Plugin {
                plugin: plugin.name(),
                id: plugin.id().to_string(),
                source,
            })?;
    }

    tracing::info!(
        plugins = plugins.len(),
        routes = routes.routes_paths.len(),
        data_files = data.len(),
        "Loaded site"
    );
    Ok(LoadedSite {
        site_dir: site_dir.to_path_buf(),
        config,
        translation,
        registry,
        plugins,
        routes,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_FILE_NAME, SiteConfig};
    use crate::plugin::{Actions, Plugin};
    use crate::routes::RouteConfig;
    use crate::test_helpers::setup_fixtures;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    struct Fails;

    impl Plugin for Fails {
        type Content = ();

        fn name(&self) -> &'static str {
            "fails"
        }

        fn id(&self) -> &str {
            "default"
        }

        fn routes_loaded(&self, _routes_paths: &[String]) -> Result<(), PluginError> {
            Err(PluginError::InvalidDate {
                path: "x.md".into(),
                value: "never".into(),
            })
        }
    }

    struct Orphan;

    impl Plugin for Orphan {
        type Content = ();

        fn name(&self) -> &'static str {
            "orphan"
        }

        fn id(&self) -> &str {
            "default"
        }

        fn load_content(&self, _ctx: &LoadContext) -> Result<Option<()>, PluginError> {
            Ok(Some(()))
        }

        fn content_loaded(&self, _ctx: &LoadContext, _: &(), actions: &mut Actions) -> Result<(), PluginError> {
            actions.add_route(RouteConfig {
                path: "/orphan".into(),
                ..RouteConfig::default()
            });
            Ok(())
        }
    }

    fn config() -> ResolvedConfig {
        ResolvedConfig::new(
            SiteConfig {
                title: "Test".into(),
                plugins: Vec::new(),
                ..SiteConfig::default()
            },
            BTreeMap::new(),
        )
    }

    #[test]
    fn missing_config_is_config_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(load_site(tmp.path()), Err(LoadError::Config(_))));
    }

    #[test]
    fn simple_site_loads_every_plugin() {
        let tmp = setup_fixtures("simple-site");
        let site = load_site(tmp.path()).unwrap();
        let names: Vec<&str> = site.plugins.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["content-docs", "content-blog", "content-pages"]);
        assert!(site.routes.routes_paths.contains(&"/docs/foo/bar".to_string()));
        assert!(site.routes.routes_paths.contains(&"/".to_string()));
        assert_eq!(site.generated_dir(), tmp.path().join(".docweave"));
    }

    #[test]
    fn routes_loaded_error_names_plugin() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Fails));
        let err = load_with(tmp.path(), config(), registry).err().unwrap();
        assert!(matches!(err, LoadError::Plugin { plugin: "fails", .. }));
        assert!(err.to_string().contains("never"));
    }

    #[test]
    fn route_without_component_fails_load() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Orphan));
        let err = load_with(tmp.path(), config(), registry).err().unwrap();
        assert!(matches!(err, LoadError::Routes(RouteError::MissingComponent { .. })));
    }

    #[test]
    fn invalid_redirect_fails_load() {
        let tmp = setup_fixtures("simple-site");
        let config = fs::read_to_string(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            format!(
                "{config}\n[[plugins]]\nkind = \"client-redirects\"\n\n[[plugins.create_redirects]]\nfrom_prefix = \"relative\"\nto_prefix = \"/docs\"\n"
            ),
        )
        .unwrap();
        let err = load_site(tmp.path()).err().unwrap();
        assert!(err.to_string().contains("Validation error"), "{err}");
    }
}
