//! Document metadata resolution.
//!
//! Every scanned docs file becomes one [`DocMetadata`]. The file's location
//! decides its version and language, its path decides its id, and its
//! front-matter and body fill in the rest.
//!
//! ## Roots
//!
//! ```text
//! docs/foo/bar.md                                  → next,  default language
//! versioned_docs/version-1.0.0/foo/bar.md          → 1.0.0, default language
//! translated_docs/ja/foo/bar.md                    → next,  ja
//! translated_docs/ja/version-1.0.0/foo/bar.md      → 1.0.0, ja
//! ```
//!
//! ## Ids
//!
//! | Location | `unversionedId` | `id` |
//! |----------|-----------------|------|
//! | `docs/foo/bar.md` | `foo/bar` | `foo/bar` |
//! | `versioned_docs/version-1.0.0/foo/bar.md` | `foo/bar` | `version-1.0.0/foo/bar` |
//! | `translated_docs/ja/foo/bar.md` | `foo/bar` | `ja/foo/bar` |
//!
//! A front-matter `id` replaces the base name and keeps the directory.
//!
//! ## Permalinks
//!
//! `baseUrl / routeBasePath / lang? / versionSegment? / (slug | unversionedId)`.
//! The latest version has no segment, the unversioned tree is served under
//! `next`, every other version under its label. The home doc sits at the
//! version root with a trailing slash.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Title**: front-matter `title` → first `# heading` → base name of the id
//! - **Description**: front-matter `description` → first paragraph → empty

use crate::config::DocsOptions;
use crate::env::{Env, NEXT_VERSION, TRANSLATED_DOCS_DIR, VERSION_PREFIX};
use crate::frontmatter::{self, FrontMatterError};
use crate::scan::first_segment;
use crate::types::{DocMetadata, DocsMetadata};
use crate::url::{add_trailing_slash, normalize_url, site_alias, strip_extension};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front-matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error(
        "{path}: folder '{folder}' is reserved for versioned or translated docs and cannot be used in the docs directory"
    )]
    ReservedFolder { path: PathBuf, folder: String },
    #[error("{path}: '{folder}' is not a folder of a version listed in the versions manifest")]
    UnknownVersion { path: PathBuf, folder: String },
    #[error("Duplicate doc id '{id}': {first} and {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
}

/// Which content root a docs file was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocsRoot {
    /// The plugin's unversioned, untranslated docs dir.
    Docs,
    /// `versioned_docs/`, files prefixed with their `version-<label>/` folder.
    Versioned,
    /// `translated_docs/`, files prefixed with their language folder.
    Translated,
}

/// One scanned docs file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub root: DocsRoot,
    /// `/`-separated path relative to the root.
    pub relative: String,
}

impl SourceFile {
    pub fn new(root: DocsRoot, relative: impl Into<String>) -> Self {
        Self {
            root,
            relative: relative.into(),
        }
    }
}

/// Everything per-file processing reads. Shared across worker threads.
#[derive(Debug, Clone, Copy)]
pub struct MetadataContext<'a> {
    pub site_dir: &'a Path,
    pub base_url: &'a str,
    pub options: &'a DocsOptions,
    pub env: &'a Env,
}

impl MetadataContext<'_> {
    pub fn root_dir(&self, root: DocsRoot) -> PathBuf {
        match root {
            DocsRoot::Docs => self.site_dir.join(&self.options.path),
            DocsRoot::Versioned => self.env.versioning.docs_dir.clone(),
            DocsRoot::Translated => self.site_dir.join(TRANSLATED_DOCS_DIR),
        }
    }

    /// Root URL of one (version, language) scope, without trailing slash.
    ///
    /// `version` is `None` for the unversioned tree.
    pub fn scope_root(&self, version: Option<&str>, language: Option<&str>) -> String {
        let segment = version_segment(self.env, version);
        normalize_url(&[
            self.base_url,
            &self.options.route_base_path,
            language.unwrap_or(""),
            segment.unwrap_or(""),
        ])
    }
}

/// URL segment of a version: none for the latest, `next` for the unversioned
/// tree, the label otherwise. Always none without versioning.
pub fn version_segment<'v>(env: &Env, version: Option<&'v str>) -> Option<&'v str> {
    if !env.versioning.enabled {
        return None;
    }
    match version {
        None => Some(NEXT_VERSION),
        Some(v) if env.versioning.is_latest(v) => None,
        Some(v) => Some(v),
    }
}

/// Version and language of a file, plus its path inside that scope.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    version: Option<String>,
    language: Option<String>,
    rest: String,
}

fn locate(file: &SourceFile, ctx: &MetadataContext, path: &Path) -> Result<Option<Location>, MetadataError> {
    let env = ctx.env;
    match file.root {
        DocsRoot::Docs => {
            if let Some(folder) = first_segment(&file.relative) {
                let reserved = env.translation.enabled_tags().contains(&folder)
                    || env.versioning.version_folders().iter().any(|v| v == folder);
                if reserved {
                    return Err(MetadataError::ReservedFolder {
                        path: path.to_path_buf(),
                        folder: folder.to_string(),
                    });
                }
            }
            Ok(Some(Location {
                version: None,
                language: None,
                rest: file.relative.clone(),
            }))
        }
        DocsRoot::Versioned => {
            let (version, rest) = split_version(&file.relative, ctx, path)?;
            Ok(Some(Location {
                version: Some(version),
                language: None,
                rest: rest.to_string(),
            }))
        }
        DocsRoot::Translated => {
            let Some((tag, rest)) = file.relative.split_once('/') else {
                return Ok(None);
            };
            if !env.translation.translated_tags().contains(&tag) {
                tracing::debug!(path = %path.display(), language = tag, "Skipping doc in non-translated language folder");
                return Ok(None);
            }
            let versioned = first_segment(rest).is_some_and(|s| s.starts_with(VERSION_PREFIX));
            let (version, rest) = if versioned && env.versioning.enabled {
                let (version, rest) = split_version(rest, ctx, path)?;
                (Some(version), rest)
            } else {
                (None, rest)
            };
            Ok(Some(Location {
                version,
                language: Some(tag.to_string()),
                rest: rest.to_string(),
            }))
        }
    }
}

fn split_version<'r>(
    relative: &'r str,
    ctx: &MetadataContext,
    path: &Path,
) -> Result<(String, &'r str), MetadataError> {
    let unknown = |folder: &str| MetadataError::UnknownVersion {
        path: path.to_path_buf(),
        folder: folder.to_string(),
    };
    let (folder, rest) = relative.split_once('/').ok_or_else(|| unknown(""))?;
    let label = folder
        .strip_prefix(VERSION_PREFIX)
        .filter(|label| ctx.env.versioning.contains(label))
        .ok_or_else(|| unknown(folder))?;
    Ok((label.to_string(), rest))
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title:       resolve(&[front_matter_title, first_heading, base_name])
/// description: resolve(&[front_matter_description, first_paragraph])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Resolve one docs file.
///
/// Returns `Ok(None)` for files the docs loader skips: translations into
/// languages that are not enabled (or the default language), and unversioned
/// docs when `skip_next_release` is set.
pub fn process_metadata(
    file: &SourceFile,
    ctx: &MetadataContext,
) -> Result<Option<DocMetadata>, MetadataError> {
    let path = ctx.root_dir(file.root).join(&file.relative);
    let Some(location) = locate(file, ctx, &path)? else {
        return Ok(None);
    };
    if location.version.is_none() && ctx.env.versioning.enabled && ctx.options.skip_next_release {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|source| MetadataError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed = frontmatter::parse(&content).map_err(|source| MetadataError::FrontMatter {
        path: path.clone(),
        source,
    })?;
    let fm = &parsed.front_matter;

    let stem = strip_extension(&location.rest);
    let (dir, file_base) = match stem.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", stem),
    };
    let base = fm.id.as_deref().unwrap_or(file_base);
    let unversioned_id = if dir.is_empty() {
        base.to_string()
    } else {
        format!("{dir}/{base}")
    };

    let mut id = String::new();
    if let Some(version) = &location.version {
        id.push_str(&format!("{VERSION_PREFIX}{version}/"));
    }
    if let Some(language) = &location.language {
        id.push_str(&format!("{language}/"));
    }
    id.push_str(&unversioned_id);

    let is_docs_home_page = ctx.options.home_page_id.as_deref() == Some(unversioned_id.as_str());
    let root = ctx.scope_root(location.version.as_deref(), location.language.as_deref());
    let permalink = if is_docs_home_page {
        add_trailing_slash(&root)
    } else {
        match fm.slug.as_deref() {
            Some(slug) if slug.starts_with('/') => normalize_url(&[&root, slug]),
            Some(slug) => normalize_url(&[&root, dir, slug]),
            None => normalize_url(&[&root, &unversioned_id]),
        }
    };

    let base_name = unversioned_id.rsplit('/').next().unwrap_or(&unversioned_id);
    let heading = frontmatter::first_heading(parsed.body);
    let paragraph = frontmatter::first_paragraph(parsed.body);
    let title = resolve(&[fm.title.as_deref(), heading.as_deref(), Some(base_name)])
        .unwrap_or_else(|| base_name.to_string());
    let description =
        resolve(&[fm.description.as_deref(), paragraph.as_deref()]).unwrap_or_default();

    let version = ctx
        .env
        .versioning
        .enabled
        .then(|| location.version.clone().unwrap_or_else(|| NEXT_VERSION.to_string()));

    tracing::debug!(id = %id, permalink = %permalink, "Resolved doc");
    Ok(Some(DocMetadata {
        id,
        unversioned_id,
        source: site_alias(ctx.site_dir, &path),
        permalink,
        version,
        language: location.language,
        title,
        description,
        sidebar_label: fm.sidebar_label.clone(),
        sidebar: None,
        is_docs_home_page,
        previous: None,
        next: None,
    }))
}

/// Resolve every file in parallel.
///
/// Results keep the order of `files`. The first error aborts the batch.
pub fn process_all(
    files: &[SourceFile],
    ctx: &MetadataContext,
) -> Result<Vec<DocMetadata>, MetadataError> {
    let resolved: Vec<Option<DocMetadata>> = files
        .par_iter()
        .map(|file| process_metadata(file, ctx))
        .collect::<Result<_, _>>()?;
    Ok(resolved.into_iter().flatten().collect())
}

/// Index documents by id. A repeated id is an error naming both sources.
pub fn index_documents(docs: Vec<DocMetadata>) -> Result<DocsMetadata, MetadataError> {
    let mut indexed = DocsMetadata::new();
    for doc in docs {
        if let Some(existing) = indexed.get(&doc.id) {
            return Err(MetadataError::DuplicateId {
                id: doc.id.clone(),
                first: existing.source.clone(),
                second: doc.source,
            });
        }
        indexed.insert(doc.id.clone(), doc);
    }
    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Language, TranslationEnv, VersioningEnv};
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn versioned_env(site: &Path) -> Env {
        Env {
            translation: TranslationEnv::default(),
            versioning: VersioningEnv {
                enabled: true,
                versions: vec!["1.0.1".into(), "1.0.0".into()],
                latest_version: Some("1.0.1".into()),
                docs_dir: site.join("versioned_docs"),
                sidebars_dir: site.join("versioned_sidebars"),
            },
        }
    }

    fn translated_env() -> Env {
        let lang = |tag: &str| Language {
            tag: tag.into(),
            name: tag.into(),
            enabled: true,
        };
        Env {
            translation: TranslationEnv {
                enabled: true,
                default_language: Some(lang("en")),
                enabled_languages: vec![lang("en"), lang("ja")],
            },
            versioning: VersioningEnv::default(),
        }
    }

    fn process(
        site: &Path,
        env: &Env,
        options: &DocsOptions,
        file: SourceFile,
    ) -> Result<Option<DocMetadata>, MetadataError> {
        let ctx = MetadataContext {
            site_dir: site,
            base_url: "/",
            options,
            env,
        };
        process_metadata(&file, &ctx)
    }

    // =========================================================================
    // resolve() tests
    // =========================================================================

    #[test]
    fn resolve_picks_first_non_none() {
        assert_eq!(
            resolve(&[Some("Front Matter"), Some("Heading")]),
            Some("Front Matter".to_string())
        );
    }

    #[test]
    fn resolve_skips_none_and_blank() {
        assert_eq!(
            resolve(&[None, Some("  \n\t  "), Some("Fallback")]),
            Some("Fallback".to_string())
        );
    }

    #[test]
    fn resolve_returns_none_when_all_none() {
        assert_eq!(resolve(&[None, None]), None);
        assert_eq!(resolve(&[]), None);
    }

    #[test]
    fn resolve_trims_whitespace() {
        assert_eq!(
            resolve(&[Some("  Padded Title  ")]),
            Some("Padded Title".to_string())
        );
    }

    // =========================================================================
    // process_metadata() tests
    // =========================================================================

    #[test]
    fn unversioned_doc_without_versioning() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "docs/foo/bar.md",
            "---\ntitle: Bar\ndescription: This is custom description\n---\nbody",
        );
        let doc = process(
            tmp.path(),
            &Env::default(),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Docs, "foo/bar.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.id, "foo/bar");
        assert_eq!(doc.unversioned_id, "foo/bar");
        assert_eq!(doc.permalink, "/docs/foo/bar");
        assert_eq!(doc.source, "@site/docs/foo/bar.md");
        assert_eq!(doc.description, "This is custom description");
        assert_eq!(doc.version, None);
        assert_eq!(doc.language, None);
        assert!(!doc.is_docs_home_page);
    }

    #[test]
    fn home_doc_maps_to_route_root() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/hello.md", "---\ntitle: Hello, World !\n---\nHi");
        let options = DocsOptions {
            home_page_id: Some("hello".into()),
            ..DocsOptions::default()
        };
        let doc = process(
            tmp.path(),
            &Env::default(),
            &options,
            SourceFile::new(DocsRoot::Docs, "hello.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.permalink, "/docs/");
        assert!(doc.is_docs_home_page);
        assert_eq!(doc.title, "Hello, World !");
    }

    #[test]
    fn title_and_description_fallbacks() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "# Heading Title\n\nFirst paragraph.\n");
        write(tmp.path(), "docs/guides/plain.md", "");
        let env = Env::default();
        let options = DocsOptions::default();

        let a = process(tmp.path(), &env, &options, SourceFile::new(DocsRoot::Docs, "a.md"))
            .unwrap()
            .unwrap();
        assert_eq!(a.title, "Heading Title");
        assert_eq!(a.description, "First paragraph.");

        let plain = process(
            tmp.path(),
            &env,
            &options,
            SourceFile::new(DocsRoot::Docs, "guides/plain.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(plain.title, "plain");
        assert_eq!(plain.description, "");
    }

    #[test]
    fn front_matter_id_keeps_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/foo/file-name.md", "---\nid: baz\n---\n");
        let doc = process(
            tmp.path(),
            &Env::default(),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Docs, "foo/file-name.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.id, "foo/baz");
        assert_eq!(doc.permalink, "/docs/foo/baz");
    }

    #[test]
    fn slugs_relative_and_absolute() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/foo/rel.md", "---\nslug: bazSlug.html\n---\n");
        write(tmp.path(), "docs/foo/abs.md", "---\nslug: /rootSlug\n---\n");
        let env = Env::default();
        let options = DocsOptions::default();

        let rel = process(tmp.path(), &env, &options, SourceFile::new(DocsRoot::Docs, "foo/rel.md"))
            .unwrap()
            .unwrap();
        assert_eq!(rel.permalink, "/docs/foo/bazSlug.html");

        let abs = process(tmp.path(), &env, &options, SourceFile::new(DocsRoot::Docs, "foo/abs.md"))
            .unwrap()
            .unwrap();
        assert_eq!(abs.permalink, "/docs/rootSlug");
    }

    #[test]
    fn versioned_docs_get_version_segments() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/hello.md", "# Next");
        write(tmp.path(), "versioned_docs/version-1.0.1/hello.md", "# Latest");
        write(tmp.path(), "versioned_docs/version-1.0.0/hello.md", "# Old");
        let env = versioned_env(tmp.path());
        let options = DocsOptions::default();

        let next = process(tmp.path(), &env, &options, SourceFile::new(DocsRoot::Docs, "hello.md"))
            .unwrap()
            .unwrap();
        assert_eq!(next.id, "hello");
        assert_eq!(next.version.as_deref(), Some("next"));
        assert_eq!(next.permalink, "/docs/next/hello");

        let latest = process(
            tmp.path(),
            &env,
            &options,
            SourceFile::new(DocsRoot::Versioned, "version-1.0.1/hello.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(latest.id, "version-1.0.1/hello");
        assert_eq!(latest.unversioned_id, "hello");
        assert_eq!(latest.permalink, "/docs/hello");

        let old = process(
            tmp.path(),
            &env,
            &options,
            SourceFile::new(DocsRoot::Versioned, "version-1.0.0/hello.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(old.version.as_deref(), Some("1.0.0"));
        assert_eq!(old.permalink, "/docs/1.0.0/hello");
        assert_eq!(old.source, "@site/versioned_docs/version-1.0.0/hello.md");
    }

    #[test]
    fn skip_next_release_drops_unversioned_docs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/hello.md", "# Next");
        let options = DocsOptions {
            skip_next_release: true,
            ..DocsOptions::default()
        };
        let result = process(
            tmp.path(),
            &versioned_env(tmp.path()),
            &options,
            SourceFile::new(DocsRoot::Docs, "hello.md"),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn unlisted_version_folder_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "versioned_docs/version-9.9.9/hello.md", "# Gone");
        let err = process(
            tmp.path(),
            &versioned_env(tmp.path()),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Versioned, "version-9.9.9/hello.md"),
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::UnknownVersion { folder, .. } if folder == "version-9.9.9"));
    }

    #[test]
    fn reserved_version_folder_in_docs_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/version-1.0.0/hello.md", "# Misplaced");
        let err = process(
            tmp.path(),
            &versioned_env(tmp.path()),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Docs, "version-1.0.0/hello.md"),
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::ReservedFolder { ref folder, .. } if folder == "version-1.0.0"));
        assert!(err.to_string().contains("hello.md"));
    }

    #[test]
    fn reserved_language_folder_in_docs_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/ja/hello.md", "# Misplaced");
        let err = process(
            tmp.path(),
            &translated_env(),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Docs, "ja/hello.md"),
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::ReservedFolder { folder, .. } if folder == "ja"));
    }

    #[test]
    fn translated_doc_gets_language_scope() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "translated_docs/ja/foo/bar.md", "# バー");
        let doc = process(
            tmp.path(),
            &translated_env(),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Translated, "ja/foo/bar.md"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.id, "ja/foo/bar");
        assert_eq!(doc.unversioned_id, "foo/bar");
        assert_eq!(doc.language.as_deref(), Some("ja"));
        assert_eq!(doc.permalink, "/docs/ja/foo/bar");
        assert_eq!(doc.title, "バー");
    }

    #[test]
    fn default_and_disabled_language_folders_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "translated_docs/en/hello.md", "# Hello");
        write(tmp.path(), "translated_docs/fr/hello.md", "# Bonjour");
        let env = translated_env();
        let options = DocsOptions::default();
        for relative in ["en/hello.md", "fr/hello.md"] {
            let result = process(
                tmp.path(),
                &env,
                &options,
                SourceFile::new(DocsRoot::Translated, relative),
            )
            .unwrap();
            assert!(result.is_none(), "{relative} should be skipped");
        }
    }

    #[test]
    fn front_matter_error_names_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/broken.md", "---\ntitle: [oops\n---\n");
        let err = process(
            tmp.path(),
            &Env::default(),
            &DocsOptions::default(),
            SourceFile::new(DocsRoot::Docs, "broken.md"),
        )
        .unwrap_err();
        assert!(matches!(err, MetadataError::FrontMatter { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    // =========================================================================
    // process_all() / index_documents() tests
    // =========================================================================

    #[test]
    fn process_all_keeps_input_order() {
        let tmp = TempDir::new().unwrap();
        let names = ["c", "a", "b", "e", "d"];
        for name in names {
            write(tmp.path(), &format!("docs/{name}.md"), &format!("# {name}"));
        }
        let files: Vec<SourceFile> = names
            .iter()
            .map(|n| SourceFile::new(DocsRoot::Docs, format!("{n}.md")))
            .collect();
        let env = Env::default();
        let options = DocsOptions::default();
        let ctx = MetadataContext {
            site_dir: tmp.path(),
            base_url: "/",
            options: &options,
            env: &env,
        };
        let docs = process_all(&files, &ctx).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, names);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/one.md", "---\nid: same\n---\n");
        write(tmp.path(), "docs/two.md", "---\nid: same\n---\n");
        let env = Env::default();
        let options = DocsOptions::default();
        let ctx = MetadataContext {
            site_dir: tmp.path(),
            base_url: "/",
            options: &options,
            env: &env,
        };
        let files = vec![
            SourceFile::new(DocsRoot::Docs, "one.md"),
            SourceFile::new(DocsRoot::Docs, "two.md"),
        ];
        let err = index_documents(process_all(&files, &ctx).unwrap()).unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateId { ref id, .. } if id == "same"));
        assert!(err.to_string().contains("@site/docs/one.md"));
    }
}
