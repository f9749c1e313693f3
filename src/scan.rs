//! Content file discovery.
//!
//! Walks a content root and returns every file matching the plugin's include
//! globs, as sorted `/`-separated paths relative to the root:
//!
//! ```text
//! docs/                      scan_root(docs, ["**/*.md", "**/*.mdx"])
//! ├── hello.md          →    "hello.md"
//! ├── foo/
//! │   ├── bar.md        →    "foo/bar.md"
//! │   └── baz.mdx       →    "foo/baz.mdx"
//! ├── notes.txt              (not included)
//! └── .drafts/               (hidden, skipped)
//! ```
//!
//! ## Missing roots
//!
//! A root that does not exist yields `None` ("no content"), which callers keep
//! distinct from an existing root with no matching files (`Some(vec![])`).
//! Neither case is an error.

use glob::{MatchOptions, Pattern};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
    #[error("Invalid include pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include globs.
///
/// A leading `**/` also matches files at the root (`**/*.md` matches
/// `hello.md`), independent of how the glob engine treats an empty
/// directory sequence.
#[derive(Debug, Clone)]
pub struct IncludeSet {
    patterns: Vec<(Pattern, Option<Pattern>)>,
}

impl IncludeSet {
    pub fn new(include: &[String]) -> Result<Self, ScanError> {
        let compile = |p: &str| {
            Pattern::new(p).map_err(|source| ScanError::Pattern {
                pattern: p.to_string(),
                source,
            })
        };
        let mut patterns = Vec::with_capacity(include.len());
        for raw in include {
            let root_level = match raw.strip_prefix("**/") {
                Some(rest) => Some(compile(rest)?),
                None => None,
            };
            patterns.push((compile(raw)?, root_level));
        }
        Ok(Self { patterns })
    }

    pub fn matches(&self, relative: &str) -> bool {
        self.patterns.iter().any(|(full, root_level)| {
            full.matches_with(relative, MATCH_OPTIONS)
                || root_level
                    .as_ref()
                    .is_some_and(|p| p.matches_with(relative, MATCH_OPTIONS))
        })
    }
}

/// List every included file under `root`.
///
/// Returns `Ok(None)` when `root` does not exist.
pub fn scan_root(root: &Path, include: &IncludeSet) -> Result<Option<Vec<String>>, ScanError> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "Content root not found");
        return Ok(None);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.display().to_string(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = relative_path(root, entry.path()) else {
            continue;
        };
        if include.matches(&relative) {
            files.push(relative);
        }
    }

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "Scanned content root");
    Ok(Some(files))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// `/`-joined path of `path` relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// First path segment of a relative path (`foo/bar.md` → `foo`).
///
/// `None` for files directly in the root.
pub fn first_segment(relative: &str) -> Option<&str> {
    relative.split_once('/').map(|(head, _)| head)
}
