//! Synthetic redirect routes.
//!
//! Redirects are derived from the final list of route paths by a fixed chain
//! of creators. Each creator maps one existing route path to the alternate
//! paths that should forward to it:
//!
//! ```text
//! creators:   from-extensions → to-extensions → user creators
//! flatten:    every (alternate → existing) pair, creator order kept
//! dedupe:     first occurrence of each fromRoutePath wins
//! filter:     drop redirects that would shadow an existing route
//! validate:   both paths must be site-relative pathnames
//! ```
//!
//! Any invalid redirect aborts the whole step.
//!
//! Redirect pages are written after the build as `<out>/<from>/index.html`
//! meta-refresh documents.

use crate::config::PrefixRedirect;
use crate::url::is_valid_pathname;
use maud::{DOCTYPE, Markup, html};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("{redirect} => Validation error: {field} is not a valid pathname. Pathname should start with / and not contain any domain or query string")]
    Validation {
        /// The offending redirect, as JSON.
        redirect: String,
        field: &'static str,
    },
    #[error("Failed to serialize redirect: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write redirect {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub from_route_path: String,
    pub to_route_path: String,
}

/// Maps an existing route path to the paths that should redirect to it.
pub type RedirectCreator = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// Inputs of [`collect_redirects`] besides the route paths.
#[derive(Default)]
pub struct RedirectRules<'a> {
    pub from_extensions: &'a [String],
    pub to_extensions: &'a [String],
    /// Run after the extension rules, in order.
    pub creators: Vec<&'a RedirectCreator>,
}

/// `/page.html` → `/page` for every configured extension the route ends in.
fn from_extension_redirects(route_path: &str, extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .filter_map(|ext| route_path.strip_suffix(&format!(".{ext}")))
        .filter(|stripped| !stripped.is_empty())
        .map(String::from)
        .collect()
}

/// `/page` → `/page.html` for every configured extension.
fn to_extension_redirects(route_path: &str, extensions: &[String]) -> Vec<String> {
    if route_path.ends_with('/') {
        return Vec::new();
    }
    extensions
        .iter()
        .map(|ext| format!("{route_path}.{ext}"))
        .collect()
}

/// Creator for a `from_prefix`/`to_prefix` rule: every route under
/// `to_prefix` gets an alias under `from_prefix`.
pub fn prefix_creator(rule: &PrefixRedirect) -> Box<RedirectCreator> {
    let from_prefix = rule.from_prefix.clone();
    let to_prefix = rule.to_prefix.clone();
    Box::new(move |route_path: &str| {
        let Some(rest) = route_path.strip_prefix(to_prefix.as_str()) else {
            return Vec::new();
        };
        let on_boundary = rest.is_empty() || rest.starts_with('/') || to_prefix.ends_with('/');
        if !on_boundary {
            return Vec::new();
        }
        vec![format!("{from_prefix}{rest}")]
    })
}

/// Derive, filter and validate redirects for `routes_paths`.
pub fn collect_redirects(
    routes_paths: &[String],
    rules: &RedirectRules,
) -> Result<Vec<Redirect>, RedirectError> {
    let from_ext = |path: &str| from_extension_redirects(path, rules.from_extensions);
    let to_ext = |path: &str| to_extension_redirects(path, rules.to_extensions);
    let mut creators: Vec<&(dyn Fn(&str) -> Vec<String> + Send + Sync + '_)> = Vec::with_capacity(rules.creators.len() + 2);
    creators.push(&from_ext);
    creators.push(&to_ext);
    creators.extend(rules.creators.iter().copied());

    let candidates = creators.iter().flat_map(|creator| {
        routes_paths.iter().flat_map(move |route_path| {
            creator(route_path.as_str())
                .into_iter()
                .map(move |from_route_path| Redirect {
                    from_route_path,
                    to_route_path: route_path.clone(),
                })
        })
    });

    let existing: HashSet<&str> = routes_paths.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut redirects = Vec::new();
    for redirect in candidates {
        if !seen.insert(redirect.from_route_path.clone()) {
            continue;
        }
        if existing.contains(redirect.from_route_path.as_str()) {
            continue;
        }
        redirects.push(redirect);
    }

    for redirect in &redirects {
        validate_redirect(redirect)?;
    }
    tracing::debug!(count = redirects.len(), "Collected redirects");
    Ok(redirects)
}

/// Both paths must be well-formed site-relative pathnames.
pub fn validate_redirect(redirect: &Redirect) -> Result<(), RedirectError> {
    let field = if !is_valid_pathname(&redirect.from_route_path) {
        "fromRoutePath"
    } else if !is_valid_pathname(&redirect.to_route_path) {
        "toRoutePath"
    } else {
        return Ok(());
    };
    Err(RedirectError::Validation {
        redirect: serde_json::to_string(redirect)?,
        field,
    })
}

/// Output file of a redirect: `/a/b` → `<out>/a/b/index.html`.
pub fn redirect_file_path(out_dir: &Path, from_route_path: &str) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    for segment in from_route_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.join("index.html")
}

pub fn render_redirect_page(to_route_path: &str) -> Markup {
    let refresh = format!("0; url={to_route_path}");
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta http-equiv="refresh" content=(refresh);
                link rel="canonical" href=(to_route_path);
                title { "Redirecting" }
            }
            body {
                p { "Redirecting to " a href=(to_route_path) { (to_route_path) } "…" }
            }
        }
    }
}

/// Write one meta-refresh page per redirect. Returns the number written.
pub fn write_redirect_files(out_dir: &Path, redirects: &[Redirect]) -> Result<usize, RedirectError> {
    for redirect in redirects {
        let path = redirect_file_path(out_dir, &redirect.from_route_path);
        let io_err = |source| RedirectError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, render_redirect_page(&redirect.to_route_path).into_string())
            .map_err(io_err)?;
        tracing::debug!(from = %redirect.from_route_path, to = %redirect.to_route_path, "Wrote redirect");
    }
    Ok(redirects.len())
}
