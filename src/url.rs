//! URL path helpers shared by every plugin.
//!
//! All permalinks and route paths produced by docweave are site-relative
//! pathnames built with [`normalize_url`]. Artifact file names and chunk names
//! derive from [`docu_hash`] and [`chunk_name`], which depend only on their
//! input string, so two loads of the same tree name their outputs identically.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Everything but the characters `encodeURIComponent` leaves alone.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Join URL segments into a single pathname.
///
/// Empty segments are skipped, duplicate slashes collapse, and the result
/// always starts with `/`. A trailing slash survives only when the last
/// non-empty segment ends with one.
///
/// ```text
/// ["/", "docs", "foo/bar"]  → /docs/foo/bar
/// ["/", "docs", "/"]        → /docs/
/// ["/base/", "docs", "next"] → /base/docs/next
/// ```
pub fn normalize_url(parts: &[&str]) -> String {
    let mut joined = String::from("/");
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }

    let mut normalized = String::with_capacity(joined.len());
    let mut prev_slash = false;
    for c in joined.chars() {
        if c == '/' {
            if !prev_slash {
                normalized.push('/');
            }
            prev_slash = true;
        } else {
            normalized.push(c);
            prev_slash = false;
        }
    }
    normalized
}

pub fn add_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Convert an arbitrary string into a lowercase, dash-separated identifier.
///
/// - Non-alphanumeric characters become dashes
/// - A lowercase-to-uppercase transition starts a new word (`barSlug` → `bar-slug`)
/// - Consecutive dashes collapse, leading and trailing dashes are stripped
pub fn kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('-');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else {
            prev_lower = false;
            out.push('-');
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    let mut prev_dash = false;
    for c in out.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }
    collapsed.trim_matches('-').to_string()
}

/// First `len` hex characters of the SHA-256 digest of `input`.
pub fn short_hash(input: &str, len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..len.min(hex.len())].to_string()
}

/// Stable, human-readable artifact name for a route path.
///
/// `/` maps to `index`; anything else becomes `<kebab>-<hash>` where the hash
/// disambiguates paths that kebab-case to the same string (`/docs` vs `/docs/`).
pub fn docu_hash(input: &str) -> String {
    if input == "/" {
        return "index".to_string();
    }
    let kebab = kebab_case(input);
    let hash = short_hash(input, 3);
    if kebab.is_empty() {
        hash
    } else {
        format!("{kebab}-{hash}")
    }
}

/// Chunk name for a lazily loaded module.
///
/// `name` is the human-readable part (usually the route path); the hash is
/// taken over the module path so two modules of the same route stay distinct.
pub fn chunk_name(module_path: &str, prefix: &str, name: Option<&str>) -> String {
    let readable = kebab_case(name.unwrap_or(module_path));
    format!("{prefix}---{readable}-{}", short_hash(module_path, 6))
}

/// Whether `path` is a well-formed site-relative pathname.
///
/// Must start with a single `/` and must not carry a scheme, domain, query
/// string, fragment, whitespace, or characters a URL parser would escape.
pub fn is_valid_pathname(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") {
        return false;
    }
    !path.chars().any(|c| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '?' | '#' | '\\' | '"' | '<' | '>' | '`' | '{' | '}' | '|' | '^')
    }) && !path.contains("://")
}

/// Percent-encode one URL component, leaving only unreserved characters.
///
/// Multi-byte characters are encoded byte by byte: `é` → `%C3%A9`.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT_ENCODE_SET).to_string()
}

/// Percent-encode every segment of a `/`-separated path.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Drop the extension of the last path segment, if it has one.
pub fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => &path[..dot],
        _ => path,
    }
}

/// Turn a content-file path into the `@site/…` alias used in `source` fields.
///
/// The result always uses `/` separators so generated artifacts do not depend
/// on the host platform.
pub fn site_alias(site_dir: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(site_dir).unwrap_or(file);
    let segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    format!("@site/{}", segments.join("/"))
}

/// Convert a relative file path into a route path fragment.
///
/// The extension is stripped and `index` files map to their directory:
/// `index.js` → `/`, `foo/index.md` → `/foo/`, `bar/baz.js` → `/bar/baz`.
pub fn file_to_path(relative: &str) -> String {
    let without_ext = strip_extension(relative);
    if without_ext == "index" {
        return "/".to_string();
    }
    if let Some(dir) = without_ext.strip_suffix("/index") {
        return format!("/{dir}/");
    }
    format!("/{without_ext}")
}
