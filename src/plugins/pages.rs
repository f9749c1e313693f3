//! Pages plugin: one route per file under the pages directory.
//!
//! ```text
//! src/pages/index.js     → /
//! src/pages/foo/index.js → /foo/
//! src/pages/bar/baz.js   → /bar/baz
//! src/pages/hello.md     → /hello   (rendered by the Markdown page component)
//! ```
//!
//! With translation enabled every page is also served under each enabled
//! language prefix (`/ja/bar/baz`). The default language is served twice:
//! `/en/bar/baz` and `/bar/baz` are the same page.

use crate::config::PagesOptions;
use crate::plugin::{Actions, LoadContext, Plugin, PluginError};
use crate::routes::{Module, RouteConfig};
use crate::scan::{IncludeSet, scan_root};
use crate::types::PageMetadata;
use crate::url::{encode_path, file_to_path, normalize_url, site_alias};
use serde_json::json;

pub const PLUGIN_NAME: &str = "content-pages";

pub struct PagesPlugin {
    options: PagesOptions,
}

impl PagesPlugin {
    pub fn new(options: PagesOptions) -> Self {
        Self { options }
    }
}

fn is_markdown(relative: &str) -> bool {
    relative.ends_with(".md") || relative.ends_with(".mdx")
}

impl Plugin for PagesPlugin {
    type Content = Vec<PageMetadata>;

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn id(&self) -> &str {
        &self.options.id
    }

    fn load_content(&self, ctx: &LoadContext) -> Result<Option<Self::Content>, PluginError> {
        let dir = ctx.site_dir.join(&self.options.path);
        let include = IncludeSet::new(&self.options.include)?;
        let Some(files) = scan_root(&dir, &include)? else {
            tracing::debug!(path = %dir.display(), "No pages directory");
            return Ok(Some(Vec::new()));
        };

        let base_url = ctx.base_url();
        let route_base = self.options.route_base_path.as_str();
        let languages = ctx.translation.enabled_tags();
        let default_language = ctx.translation.default_tag();
        let mut pages = Vec::with_capacity(files.len() * (1 + languages.len()));
        for relative in &files {
            let route = encode_path(&file_to_path(relative));
            let source = site_alias(ctx.site_dir, &dir.join(relative));
            let markdown = is_markdown(relative);
            pages.push(PageMetadata {
                permalink: normalize_url(&[base_url, route_base, &route]),
                source: source.clone(),
                language: default_language.map(str::to_string),
                is_markdown: markdown,
            });
            for &language in &languages {
                pages.push(PageMetadata {
                    permalink: normalize_url(&[base_url, language, route_base, &route]),
                    source: source.clone(),
                    language: Some(language.to_string()),
                    is_markdown: markdown,
                });
            }
        }
        Ok(Some(pages))
    }

    fn content_loaded(
        &self,
        _ctx: &LoadContext,
        pages: &Self::Content,
        actions: &mut Actions,
    ) -> Result<(), PluginError> {
        for page in pages {
            let mut route = if page.is_markdown {
                RouteConfig::leaf(&page.permalink, &self.options.mdx_page_component)
                    .module("content", Module::path(&page.source))
            } else {
                RouteConfig::leaf(&page.permalink, &page.source)
            };
            if let Some(language) = &page.language {
                route.metadata = Some(json!({ "language": language }));
            }
            actions.add_route(route);
        }
        Ok(())
    }

    fn paths_to_watch(&self, ctx: &LoadContext) -> Vec<String> {
        super::watch_patterns(&ctx.site_dir.join(&self.options.path), &self.options.include)
    }

    fn summary(&self, pages: &Self::Content) -> String {
        format!("{} pages", pages.len())
    }
}
