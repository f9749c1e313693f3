//! Generated artifact writer.
//!
//! Final stage of a `build`. Takes a [`LoadedSite`] and writes everything the
//! client runtime imports into the generated dir.
//!
//! ## Output Structure
//!
//! ```text
//! .docweave/
//! ├── routes.js                 # Route tree + catch-all route
//! ├── registry.js               # Chunk name → lazy import
//! ├── routesChunkNames.json     # Route path → chunk names
//! ├── site-config.json          # Resolved config, translations included
//! ├── metadata/
//! │   └── blog-a1b.json         # Inline route metadata
//! ├── content-docs/default/
//! │   ├── docs-foo-bar-c3d.json # One per doc
//! │   ├── docs-route-f00.json   # One per (version, language) scope
//! │   └── source-to-metadata.json
//! └── content-blog/default/
//!     └── …
//! ```
//!
//! ## Idempotence
//!
//! Every artifact derives from sorted inputs only, so loading an unchanged
//! tree twice produces byte-identical files. A file whose content is already
//! on disk is not touched, leaving its modification time alone for bundler
//! watchers.

use crate::load::LoadedSite;
use crate::routes::{registry_code, routes_code};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize {name}: {source}")]
    Json {
        name: String,
        source: serde_json::Error,
    },
}

/// One artifact of a generate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// `/`-separated path relative to the generated dir.
    pub path: String,
    /// False when the file already had this content.
    pub changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub generated_dir: PathBuf,
    pub files: Vec<GeneratedFile>,
}

impl Manifest {
    pub fn changed_count(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }
}

/// Write `content` unless the file already holds exactly that.
fn write_if_changed(path: &Path, content: &str) -> Result<bool, GenerateError> {
    if fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
        return Ok(false);
    }
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)?;
    Ok(true)
}

fn pretty_json<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<String, GenerateError> {
    serde_json::to_string_pretty(value).map_err(|source| GenerateError::Json {
        name: name.to_string(),
        source,
    })
}

/// Every artifact of `site` as (relative path, content), in write order.
pub fn artifacts(site: &LoadedSite) -> Result<Vec<(String, String)>, GenerateError> {
    let routes = &site.routes;
    let mut files = vec![
        ("routes.js".to_string(), routes_code(&routes.tree)),
        ("registry.js".to_string(), registry_code(&routes.registry)),
        (
            "routesChunkNames.json".to_string(),
            pretty_json("routesChunkNames.json", &routes.routes_chunk_names)?,
        ),
        (
            "site-config.json".to_string(),
            pretty_json("site-config.json", &site.config)?,
        ),
    ];
    for (route_path, alias) in &routes.routes_metadata_path {
        let Some(relative) = alias.strip_prefix("@generated/") else {
            continue;
        };
        let metadata = &routes.routes_metadata[route_path];
        files.push((relative.to_string(), pretty_json(relative, metadata)?));
    }
    files.extend(site.data.iter().map(|d| (d.path.clone(), d.content.clone())));
    Ok(files)
}

/// Write every artifact of `site` into its generated dir.
pub fn write_generated(site: &LoadedSite) -> Result<Manifest, GenerateError> {
    let generated_dir = site.generated_dir();
    let mut manifest = Manifest {
        generated_dir: generated_dir.clone(),
        files: Vec::new(),
    };
    for (relative, content) in artifacts(site)? {
        let path = relative
            .split('/')
            .fold(generated_dir.clone(), |path, segment| path.join(segment));
        let changed = write_if_changed(&path, &content)?;
        tracing::debug!(file = %relative, changed, "Generated");
        manifest.files.push(GeneratedFile {
            path: relative,
            changed,
        });
    }
    tracing::info!(
        files = manifest.files.len(),
        changed = manifest.changed_count(),
        dir = %generated_dir.display(),
        "Wrote generated files"
    );
    Ok(manifest)
}
