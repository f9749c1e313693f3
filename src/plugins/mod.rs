//! Built-in plugins.

pub mod blog;
pub mod client_redirects;
pub mod docs;
pub mod pages;

pub use blog::BlogPlugin;
pub use client_redirects::ClientRedirectsPlugin;
pub use docs::DocsPlugin;
pub use pages::PagesPlugin;

/// Absolute glob patterns for `include` patterns under `dir`.
///
/// The directory part is escaped, so `[` or `*` in a site path match literally.
pub(crate) fn watch_patterns(dir: &std::path::Path, include: &[String]) -> Vec<String> {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let dir = dir.trim_end_matches(['/', '\\']);
    include
        .iter()
        .map(|pattern| format!("{dir}/{pattern}"))
        .collect()
}
