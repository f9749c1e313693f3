//! Docs plugin: versioned, translated documentation.
//!
//! Loading walks up to three roots, resolves every file into a
//! [`DocMetadata`], then orders the result by sidebar:
//!
//! ```text
//! docs/ ─┐
//! versioned_docs/ ─┼─▶ scan ─▶ process_all ─▶ index_documents ─▶ link_documents
//! translated_docs/ ─┘                                   ▲
//!                              sidebars ─▶ create_order ┘
//! ```
//!
//! Routes are grouped per (version, language) scope. Each scope gets one
//! parent route at its root, carrying a base-metadata artifact with only that
//! scope's sidebars, and one exact child route per doc:
//!
//! ```text
//! /docs                   DocPage   docsMetadata → docs-route-xxx.json
//! ├── /docs/              DocItem   (home doc)
//! └── /docs/foo/bar       DocItem
//! /docs/1.0.0             DocPage   docsMetadata → docs-1-0-0-route-xxx.json
//! └── /docs/1.0.0/foo/bar DocItem
//! ```

use crate::config::DocsOptions;
use crate::env::{Env, NEXT_VERSION, TRANSLATED_DOCS_DIR, VERSION_PREFIX, load_env};
use crate::metadata::{DocsRoot, MetadataContext, SourceFile, index_documents, process_all};
use crate::order::{create_order, link_documents};
use crate::plugin::{Actions, LoadContext, Plugin, PluginError};
use crate::routes::{Module, RouteConfig};
use crate::scan::{IncludeSet, first_segment, scan_root};
use crate::sidebar::{Sidebars, load_docs_sidebars, translated_sidebars};
use crate::types::{DocMetadata, DocsMetadata};
use crate::url::{docu_hash, normalize_url};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const PLUGIN_NAME: &str = "content-docs";

/// Where a source file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub permalink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsContent {
    pub docs: DocsMetadata,
    /// Sidebars of every scope, versioned and translated ones namespaced.
    pub docs_sidebars: Sidebars,
    pub source_to_metadata: BTreeMap<String, SourceInfo>,
    pub permalink_to_id: BTreeMap<String, String>,
    pub env: Env,
}

/// Base metadata of one (version, language) scope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeMetadata<'a> {
    docs_sidebars: Sidebars,
    permalink_to_sidebar: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

pub struct DocsPlugin {
    options: DocsOptions,
}

impl DocsPlugin {
    pub fn new(options: DocsOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DocsOptions {
        &self.options
    }
}

/// Collect every docs file of every root. `None` when no root exists.
fn scan_sources(ctx: &MetadataContext, include: &IncludeSet) -> Result<Option<Vec<SourceFile>>, PluginError> {
    let env = ctx.env;
    let mut files = Vec::new();
    let mut found = false;

    if let Some(relative) = scan_root(&ctx.root_dir(DocsRoot::Docs), include)? {
        found = true;
        files.extend(relative.into_iter().map(|r| SourceFile::new(DocsRoot::Docs, r)));
    }

    if env.versioning.enabled
        && let Some(relative) = scan_root(&ctx.root_dir(DocsRoot::Versioned), include)?
    {
        found = true;
        let folders = env.versioning.version_folders();
        for r in relative {
            match first_segment(&r) {
                Some(folder) if folders.iter().any(|f| f == folder) => {
                    files.push(SourceFile::new(DocsRoot::Versioned, r));
                }
                _ => tracing::warn!(file = %r, "Skipping versioned doc outside any listed version"),
            }
        }
    }

    if env.translation.enabled
        && let Some(relative) = scan_root(&ctx.root_dir(DocsRoot::Translated), include)?
    {
        found = true;
        files.extend(relative.into_iter().map(|r| SourceFile::new(DocsRoot::Translated, r)));
    }

    Ok(found.then_some(files))
}

/// Load, resolve and order every doc of one docs plugin instance.
pub fn load_docs(
    site_dir: &Path,
    base_url: &str,
    options: &DocsOptions,
) -> Result<Option<DocsContent>, PluginError> {
    let env = load_env(site_dir, &options.id)?;
    let include = IncludeSet::new(&options.include)?;
    let ctx = MetadataContext {
        site_dir,
        base_url,
        options,
        env: &env,
    };

    let Some(files) = scan_sources(&ctx, &include)? else {
        tracing::warn!(path = %ctx.root_dir(DocsRoot::Docs).display(), "No docs directory");
        return Ok(None);
    };

    let docs = index_documents(process_all(&files, &ctx)?)?;

    let mut sidebars = load_docs_sidebars(site_dir, options, &env)?;
    let base = sidebars.clone();
    for language in env.translation.translated_tags() {
        sidebars.extend(translated_sidebars(&base, language, &docs));
    }
    let order = create_order(&sidebars);
    let docs = link_documents(&docs, &order)?;

    let source_to_metadata = docs
        .values()
        .map(|doc| {
            (
                doc.source.clone(),
                SourceInfo {
                    version: doc.version.clone(),
                    permalink: doc.permalink.clone(),
                    language: doc.language.clone(),
                },
            )
        })
        .collect();
    let permalink_to_id = docs
        .values()
        .map(|doc| (doc.permalink.clone(), doc.id.clone()))
        .collect();

    tracing::info!(docs = docs.len(), sidebars = sidebars.iter().count(), "Loaded docs");
    Ok(Some(DocsContent {
        docs,
        docs_sidebars: sidebars,
        source_to_metadata,
        permalink_to_id,
        env,
    }))
}

/// (version, language) scope key of a doc. The unversioned tree is `None`.
fn scope_key(doc: &DocMetadata) -> (Option<&str>, Option<&str>) {
    let version = doc.version.as_deref().filter(|v| *v != NEXT_VERSION);
    (version, doc.language.as_deref())
}

impl Plugin for DocsPlugin {
    type Content = DocsContent;

    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn id(&self) -> &str {
        &self.options.id
    }

    fn load_content(&self, ctx: &LoadContext) -> Result<Option<DocsContent>, PluginError> {
        load_docs(ctx.site_dir, ctx.base_url(), &self.options)
    }

    fn content_loaded(
        &self,
        ctx: &LoadContext,
        content: &DocsContent,
        actions: &mut Actions,
    ) -> Result<(), PluginError> {
        let mctx = MetadataContext {
            site_dir: ctx.site_dir,
            base_url: ctx.base_url(),
            options: &self.options,
            env: &content.env,
        };

        let mut scopes: BTreeMap<(Option<&str>, Option<&str>), Vec<&DocMetadata>> = BTreeMap::new();
        for doc in content.docs.values() {
            scopes.entry(scope_key(doc)).or_default().push(doc);
        }

        for ((version, language), docs) in scopes {
            let root = mctx.scope_root(version, language);
            let mut routes = Vec::with_capacity(docs.len());
            let mut sidebar_names = BTreeSet::new();
            let mut permalink_to_sidebar = BTreeMap::new();

            for doc in &docs {
                let metadata = actions.create_json(&format!("{}.json", docu_hash(&doc.permalink)), doc)?;
                routes.push(
                    RouteConfig::leaf(&doc.permalink, &self.options.doc_item_component)
                        .module("content", Module::path(&doc.source))
                        .module("metadata", Module::path(metadata)),
                );
                if let Some(sidebar) = &doc.sidebar {
                    sidebar_names.insert(sidebar.as_str());
                    permalink_to_sidebar.insert(doc.permalink.as_str(), sidebar.as_str());
                }
            }

            let scope_metadata = ScopeMetadata {
                docs_sidebars: content
                    .docs_sidebars
                    .filtered(|s| sidebar_names.contains(s.name.as_str())),
                permalink_to_sidebar,
                version: docs.first().and_then(|d| d.version.as_deref()),
                language,
            };
            let scope_route = normalize_url(&[&root, ":route"]);
            let docs_metadata =
                actions.create_json(&format!("{}.json", docu_hash(&scope_route)), &scope_metadata)?;
            tracing::debug!(scope = %root, docs = docs.len(), "Docs scope");

            actions.add_route(RouteConfig {
                path: root,
                component: self.options.doc_layout_component.clone(),
                exact: false,
                modules: BTreeMap::from([("docsMetadata".to_string(), Module::path(docs_metadata))]),
                routes,
                metadata: None,
            });
        }

        actions.create_json("source-to-metadata.json", &content.source_to_metadata)?;
        Ok(())
    }

    fn paths_to_watch(&self, ctx: &LoadContext) -> Vec<String> {
        let site = ctx.site_dir;
        let id = &self.options.id;
        let include = &self.options.include;
        let mut patterns = super::watch_patterns(&site.join(&self.options.path), include);
        let versioned = crate::env::versioned_docs_dir(site, id);
        patterns.extend(super::watch_patterns(
            &versioned,
            &include
                .iter()
                .map(|p| format!("{VERSION_PREFIX}*/{p}"))
                .collect::<Vec<_>>(),
        ));
        patterns.extend(super::watch_patterns(&site.join(TRANSLATED_DOCS_DIR), include));
        if !self.options.sidebar_path.is_empty() {
            patterns.push(glob::Pattern::escape(
                &site.join(&self.options.sidebar_path).to_string_lossy(),
            ));
        }
        patterns.extend(super::watch_patterns(
            &crate::env::versioned_sidebars_dir(site, id),
            &["*.json".to_string()],
        ));
        patterns
    }

    fn summary(&self, content: &DocsContent) -> String {
        let versions = &content.env.versioning.versions;
        let languages = content.env.translation.enabled_languages.len();
        format!(
            "{} docs, {} sidebars, {} versions, {} languages",
            content.docs.len(),
            content.docs_sidebars.iter().count(),
            versions.len(),
            languages
        )
    }
}
