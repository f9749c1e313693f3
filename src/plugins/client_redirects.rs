//! Client-redirects plugin.
//!
//! Produces no routes of its own. Once every route is known it derives the
//! redirect set (see [`crate::redirects`]), failing the load on an invalid
//! redirect, and after a build writes one meta-refresh page per redirect.

use crate::config::RedirectsOptions;
use crate::plugin::{BuildContext, Plugin, PluginError};
use crate::redirects::{
    Redirect, RedirectCreator, RedirectRules, collect_redirects, prefix_creator,
    write_redirect_files,
};

pub const PLUGIN_NAME: &str = "client-redirects";

pub struct ClientRedirectsPlugin {
    options: RedirectsOptions,
    /// Prefix rules from config, then closures added with [`Self::with_creator`].
    creators: Vec<Box<RedirectCreator>>,
}

impl ClientRedirectsPlugin {
    pub fn new(options: RedirectsOptions) -> Self {
        let creators = options.create_redirects.iter().map(prefix_creator).collect();
        Self { options, creators }
    }

    /// Add a redirect creator that runs after every configured rule.
    pub fn with_creator(
        mut self,
        creator: impl Fn(&str) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.creators.push(Box::new(creator));
        self
    }

    pub fn redirects(&self, routes_paths: &[String]) -> Result<Vec<Redirect>, PluginError> {
        let rules = RedirectRules {
            from_extensions: &self.options.from_extensions,
            to_extensions: &self.options.to_extensions,
            creators: self.creators.iter().map(|c| c.as_ref()).collect(),
        };
        Ok(collect_redirects(routes_paths, &rules)?)
    }
}

impl Plugin for ClientRedirectsPlugin {
    type Content = ();

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn id(&self) -> &str {
        &self.options.id
    }

    fn routes_loaded(&self, routes_paths: &[String]) -> Result<(), PluginError> {
        let redirects = self.redirects(routes_paths)?;
        tracing::info!(redirects = redirects.len(), "Validated redirects");
        Ok(())
    }

    fn post_build(&self, ctx: &BuildContext) -> Result<(), PluginError> {
        let redirects = self.redirects(ctx.routes_paths)?;
        let written = write_redirect_files(ctx.out_dir, &redirects)?;
        tracing::info!(count = written, out = %ctx.out_dir.display(), "Wrote redirect pages");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrefixRedirect;
    use crate::plugin::DynPlugin;
    use crate::redirects::RedirectError;
    use std::path::Path;
    use tempfile::TempDir;

    fn routes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_rules_then_closures() {
        let options = RedirectsOptions {
            create_redirects: vec![PrefixRedirect {
                from_prefix: "/old".into(),
                to_prefix: "/docs".into(),
            }],
            ..RedirectsOptions::default()
        };
        let plugin = ClientRedirectsPlugin::new(options).with_creator(|path| {
            path.strip_prefix("/docs")
                .map(|rest| vec![format!("/legacy{rest}")])
                .unwrap_or_default()
        });
        let redirects = plugin.redirects(&routes(&["/docs/a"])).unwrap();
        let from: Vec<&str> = redirects.iter().map(|r| r.from_route_path.as_str()).collect();
        assert_eq!(from, vec!["/old/a", "/legacy/a"]);
    }

    #[test]
    fn routes_loaded_rejects_invalid_redirect() {
        let plugin = ClientRedirectsPlugin::new(RedirectsOptions::default())
            .with_creator(|_| vec!["relative".to_string()]);
        let err = DynPlugin::routes_loaded(&plugin, &routes(&["/x"])).unwrap_err();
        assert!(matches!(err, PluginError::Redirect(RedirectError::Validation { .. })));
    }

    #[test]
    fn post_build_writes_pages() {
        let tmp = TempDir::new().unwrap();
        let options = RedirectsOptions {
            to_extensions: vec!["html".into()],
            ..RedirectsOptions::default()
        };
        let plugin = ClientRedirectsPlugin::new(options);
        let paths = routes(&["/", "/docs/intro"]);
        let ctx = BuildContext {
            site_dir: Path::new("/unused"),
            out_dir: tmp.path(),
            routes_paths: &paths,
        };
        DynPlugin::post_build(&plugin, &ctx).unwrap();
        assert!(tmp.path().join("docs/intro.html/index.html").is_file());
    }
}
