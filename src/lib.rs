//! # docweave
//!
//! Content loading and route generation for documentation sites that carry
//! several versions and several languages of the same docs.
//!
//! A site is a directory of Markdown plus a handful of JSON marker files.
//! docweave resolves every file into metadata, orders docs by sidebar, and
//! writes the route tree and data modules a client-side renderer imports.
//!
//! # Architecture: One Load Pass
//!
//! ```text
//! config.toml ─▶ ResolvedConfig ─▶ PluginRegistry
//!                                      │
//!          ┌───────────────┬───────────┴────┬──────────────────┐
//!       docs            blog            pages          client-redirects
//!   env → scan →     posts, lists,    one route         validates routes,
//!   metadata →       tags             per page          writes redirect
//!   order                                               pages post-build
//!          └───────────────┴──────┬─────────┘
//!                            load_routes
//!                                 │
//!                          write_generated ─▶ .docweave/
//! ```
//!
//! A pass never writes partially: loading builds everything in memory, and
//! [`generate::write_generated`] persists a finished [`load::LoadedSite`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, stock defaults, validation, i18n catalogs |
//! | [`env`] | Translation and versioning state from `languages.json` / `versions.json` |
//! | [`scan`] | Include-glob content discovery under a root |
//! | [`frontmatter`] | YAML front-matter split and Markdown text helpers |
//! | [`metadata`] | Per-file doc metadata: ids, permalinks, versions, languages |
//! | [`sidebar`] | `sidebars.json` loading and version/language namespacing |
//! | [`order`] | Sidebar order and previous/next linking |
//! | [`naming`] | `YYYY-MM-DD-name` blog file name parser |
//! | [`url`] | URL normalization, hashing and chunk names |
//! | [`routes`] | Route tree aggregation and `routes.js` / `registry.js` code |
//! | [`redirects`] | Client redirect collection, validation and HTML pages |
//! | [`plugin`] | The `Plugin` trait, actions, and the registry |
//! | [`plugins`] | Built-in docs, blog, pages and client-redirects plugins |
//! | [`load`] | One full load pass over a site |
//! | [`generate`] | Writes generated artifacts, skipping unchanged files |
//! | [`watch`] | Debounced, superseding reloads for `start` |
//! | [`version`] | `docs:version` snapshots |
//! | [`translations`] | `write-translations` catalog extraction |
//! | [`types`] | Shared metadata types serialized into artifacts |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Scopes Never Mix
//!
//! Every doc lives in exactly one (version, language) scope, and each scope
//! has its own sidebars. Previous/next links are computed per sidebar, so a
//! doc of version `1.0.0` never links into `next`, and a Japanese doc never
//! links into English. Versioned and translated sidebars are namespaced on
//! load to keep their ids apart.
//!
//! ## Two-Stage Docs Records
//!
//! [`metadata::process_metadata`] produces records without navigation.
//! [`order::link_documents`] returns new records with sidebar and links filled
//! in. Nothing is mutated in place, so stage 1 can run in parallel on rayon.
//!
//! ## Deterministic Output
//!
//! Maps are ordered, routes are sorted, and hashes derive from paths only.
//! Loading an unchanged site twice writes byte-identical files, and
//! [`generate::write_generated`] leaves files with unchanged content alone.
//!
//! ## Explicit Plugin Registry
//!
//! Plugins are listed in `config.toml` and built by
//! [`plugin::PluginRegistry::from_config`]. A plugin implements only the
//! capabilities it needs; every [`plugin::Plugin`] method but `name` and `id`
//! has a no-op default.

pub mod config;
pub mod env;
pub mod frontmatter;
pub mod generate;
pub mod load;
pub mod metadata;
pub mod naming;
pub mod order;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod redirects;
pub mod routes;
pub mod scan;
pub mod sidebar;
pub mod translations;
pub mod types;
pub mod url;
pub mod version;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
