//! CLI output formatting.
//!
//! Output is **route-centric**: a load is shown as the plugins that ran and
//! the route tree they produced, so the user sees the site the way a visitor
//! would navigate it. Files are secondary context.
//!
//! # Output Format
//!
//! ## Check / Build
//!
//! ```text
//! Plugins
//! 001 content-docs (default)
//!     Routes: 1
//!     Data files: 4
//!     Content: 3 docs, 1 sidebars, 0 versions, 0 languages
//! 002 content-pages (default)
//!     Routes: 1
//!     Data files: 0
//!     Content: 1 pages
//!
//! Routes
//! /docs → @theme/DocPage
//!     /docs/foo/bar → @theme/DocItem
//!     /docs/ → @theme/DocItem
//! / → @site/src/pages/index.js
//!
//! Loaded 2 plugins, 4 routes
//! ```
//!
//! ## Generate
//!
//! ```text
//! Generated .docweave
//!     routes.js
//!     registry.js (unchanged)
//! Wrote 2 files, 1 changed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::Manifest;
use crate::load::{LoadedSite, PluginSummary};
use crate::routes::RouteConfig;
use crate::translations::TranslationsWritten;
use crate::version::VersionCreated;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plugin_lines(index: usize, plugin: &PluginSummary) -> Vec<String> {
    vec![
        format!("{} {} ({})", format_index(index), plugin.name, plugin.id),
        format!("{}Routes: {}", indent(1), plugin.routes),
        format!("{}Data files: {}", indent(1), plugin.data_files),
        format!(
            "{}Content: {}",
            indent(1),
            plugin.content.as_deref().unwrap_or("none")
        ),
    ]
}

fn route_lines(routes: &[RouteConfig], depth: usize, lines: &mut Vec<String>) {
    for route in routes {
        lines.push(format!(
            "{}{} \u{2192} {}",
            indent(depth),
            route.path,
            route.component
        ));
        route_lines(&route.routes, depth + 1, lines);
    }
}

// ============================================================================
// Stage output
// ============================================================================

/// Format a load pass: plugins, then the route tree.
pub fn format_load_output(site: &LoadedSite) -> Vec<String> {
    let mut lines = vec!["Plugins".to_string()];
    if site.plugins.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, plugin) in site.plugins.iter().enumerate() {
        lines.extend(plugin_lines(i + 1, plugin));
    }

    lines.push(String::new());
    lines.push("Routes".to_string());
    route_lines(&site.routes.tree, 0, &mut lines);

    lines.push(String::new());
    lines.push(format!(
        "Loaded {} plugins, {} routes",
        site.plugins.len(),
        site.routes.routes_paths.len()
    ));
    lines
}

pub fn print_load_output(site: &LoadedSite) {
    for line in format_load_output(site) {
        println!("{}", line);
    }
}

/// Format the files of a generate run, marking the untouched ones.
pub fn format_generate_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![format!("Generated {}", manifest.generated_dir.display())];
    for file in &manifest.files {
        if file.changed {
            lines.push(format!("{}{}", indent(1), file.path));
        } else {
            lines.push(format!("{}{} (unchanged)", indent(1), file.path));
        }
    }
    lines.push(format!(
        "Wrote {} files, {} changed",
        manifest.files.len(),
        manifest.changed_count()
    ));
    lines
}

pub fn print_generate_output(manifest: &Manifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

pub fn format_version_output(created: &VersionCreated) -> Vec<String> {
    vec![
        format!("Version {}", created.label),
        format!("{}Docs: {} ({} files)", indent(1), created.docs_dir.display(), created.files_copied),
        format!("{}Sidebars: {}", indent(1), created.sidebars_file.display()),
        format!("{}Versions: {}", indent(1), created.versions.join(", ")),
    ]
}

pub fn print_version_output(created: &VersionCreated) {
    for line in format_version_output(created) {
        println!("{}", line);
    }
}

pub fn format_translations_output(written: &TranslationsWritten) -> Vec<String> {
    vec![
        format!("Translations ({})", written.language),
        format!("{}{}", indent(1), written.path.display()),
        format!("Wrote {} strings", written.strings.len()),
    ]
}

pub fn print_translations_output(written: &TranslationsWritten) {
    for line in format_translations_output(written) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
