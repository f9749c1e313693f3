//! Shared test utilities for the docweave test suite.
//!
//! Provides fixture setup, a [`LoadContext`] builder, and lookup helpers that
//! work with loaded docs and route trees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures("versioned-site");
//! let site = crate::load::load_site(tmp.path()).unwrap();
//!
//! let route = find_route(&site.routes.tree, "/docs/1.0.0");
//! assert_eq!(child_paths(route), vec!["/docs/1.0.0/foo/bar", "/docs/1.0.0/"]);
//! ```

use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::ResolvedConfig;
use crate::env::load_env;
use crate::plugin::LoadContext;
use crate::routes::RouteConfig;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/<name>/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures(name: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name);
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Run `f` with a [`LoadContext`] for `site_dir`, translation resolved from
/// the site's `languages.json`.
pub fn load_context<R>(
    site_dir: &Path,
    config: &ResolvedConfig,
    f: impl FnOnce(&LoadContext) -> R,
) -> R {
    let env = load_env(site_dir, crate::config::DEFAULT_PLUGIN_ID).unwrap();
    let ctx = LoadContext {
        site_dir,
        config,
        translation: &env.translation,
    };
    f(&ctx)
}

// =========================================================================
// Route lookups (panic with a clear message on miss)
// =========================================================================

/// Find a route by path anywhere in the tree, pre-order. Panics if not found.
pub fn find_route<'a>(tree: &'a [RouteConfig], path: &str) -> &'a RouteConfig {
    fn walk<'a>(routes: &'a [RouteConfig], path: &str) -> Option<&'a RouteConfig> {
        routes
            .iter()
            .find_map(|r| if r.path == path { Some(r) } else { walk(&r.routes, path) })
    }
    walk(tree, path).unwrap_or_else(|| {
        let top: Vec<&str> = tree.iter().map(|r| r.path.as_str()).collect();
        panic!("route '{path}' not found. Top-level routes: {top:?}")
    })
}

/// Paths of a route's direct children, in tree order.
pub fn child_paths(route: &RouteConfig) -> Vec<&str> {
    route.routes.iter().map(|r| r.path.as_str()).collect()
}
