//! File watching for `start`.
//!
//! ```text
//! notify thread                         worker thread
//! ─────────────                         ─────────────
//! event ─▶ kind filter ─▶ glob filter   recv first path
//!                │                      drain until quiet for debounce_ms
//!        generation += 1                ticket = generation now
//!        send(path) ──────────────────▶ load_site
//!                                       ticket superseded? ─▶ skip writes
//!                                       write_generated
//! ```
//!
//! Only one worker exists, so reloads never overlap. Every accepted event bumps
//! the generation before it is queued. A reload that sees a newer generation
//! once loading finishes throws its result away; the queued events then drive
//! one follow-up reload that covers all of them.
//!
//! Dropping the notify watcher drops the only sender, which ends the worker
//! after it finishes any pending reload.

use crate::config::{CONFIG_FILE_NAME, I18N_DIR};
use crate::env::LANGUAGES_FILE;
use crate::generate::{Manifest, write_generated};
use crate::load::{LoadedSite, load_site};
use crate::scan::MATCH_OPTIONS;
use glob::Pattern;
use notify::{Event, EventKind, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid watch pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Failed to spawn reload worker: {0}")]
    Spawn(std::io::Error),
}

/// Site-level files every load reads, whatever the plugins.
pub fn site_patterns(site_dir: &Path) -> Vec<String> {
    let site = Pattern::escape(&site_dir.to_string_lossy());
    let site = site.trim_end_matches(['/', '\\']);
    vec![
        format!("{site}/{CONFIG_FILE_NAME}"),
        format!("{site}/{LANGUAGES_FILE}"),
        format!("{site}/*versions.json"),
        format!("{site}/{I18N_DIR}/*.json"),
    ]
}

/// Decides which changed paths trigger a reload.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    patterns: Vec<Pattern>,
    ignored: Vec<PathBuf>,
}

impl WatchFilter {
    /// `ignored` dirs win over any pattern, so writing outputs never loops.
    ///
    /// Each `/**/` also matches zero directories: `docs/**/*.md` covers
    /// `docs/hello.md`.
    pub fn new(patterns: &[String], ignored: Vec<PathBuf>) -> Result<Self, WatchError> {
        let compile = |p: &str| {
            Pattern::new(p).map_err(|source| WatchError::Pattern {
                pattern: p.to_string(),
                source,
            })
        };
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            compiled.push(compile(raw)?);
            if raw.contains("/**/") {
                compiled.push(compile(&raw.replace("/**/", "/"))?);
            }
        }
        Ok(Self {
            patterns: compiled,
            ignored,
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.ignored.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }
}

fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Snapshot of the generation counter taken when a reload starts.
#[derive(Debug, Clone)]
pub struct ReloadTicket {
    generation: Arc<AtomicU64>,
    started: u64,
}

impl ReloadTicket {
    fn new(generation: &Arc<AtomicU64>) -> Self {
        Self {
            generation: Arc::clone(generation),
            started: generation.load(Ordering::SeqCst),
        }
    }

    /// True once an event arrived after this reload started.
    pub fn is_superseded(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.started
    }
}

/// Worker loop: debounce queued paths, then call `reload` once per batch.
///
/// Returns when the sender side is gone and the last batch is handled.
pub fn run_reloads(
    rx: Receiver<PathBuf>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
    mut reload: impl FnMut(&[PathBuf], &ReloadTicket),
) {
    while let Ok(first) = rx.recv() {
        let mut changed = vec![first];
        let disconnected = loop {
            match rx.recv_timeout(debounce) {
                Ok(path) => changed.push(path),
                Err(RecvTimeoutError::Timeout) => break false,
                Err(RecvTimeoutError::Disconnected) => break true,
            }
        };
        changed.sort();
        changed.dedup();
        let ticket = ReloadTicket::new(&generation);
        reload(&changed, &ticket);
        if disconnected {
            return;
        }
    }
}

/// Reload `site_dir` and write its outputs unless `ticket` got superseded.
///
/// Failures are logged. The watch keeps running either way.
pub fn reload_site(site_dir: &Path, changed: &[PathBuf], ticket: &ReloadTicket) -> Option<Manifest> {
    tracing::info!(files = changed.len(), "Change detected, reloading");
    for path in changed {
        tracing::debug!(path = %path.display(), "Changed");
    }
    let site = match load_site(site_dir) {
        Ok(site) => site,
        Err(e) => {
            tracing::error!(error = %e, "Reload failed");
            return None;
        }
    };
    if ticket.is_superseded() {
        tracing::debug!("Reload superseded by newer changes, skipping writes");
        return None;
    }
    match write_generated(&site) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::error!(error = %e, "Writing generated files failed");
            None
        }
    }
}

/// A running watch over one site.
pub struct Watcher {
    watcher: notify::RecommendedWatcher,
    worker: JoinHandle<()>,
}

impl Watcher {
    /// Watch `site` recursively, reloading on relevant changes.
    ///
    /// Patterns come from `site` as loaded now. A config change that adds a
    /// plugin needs a restart before the new plugin's paths are watched.
    pub fn start(
        site: &LoadedSite,
        on_reload: impl Fn(&Manifest) + Send + 'static,
    ) -> Result<Self, WatchError> {
        let site_dir = site.site_dir.clone();
        let mut patterns = site_patterns(&site_dir);
        patterns.extend(site.paths_to_watch());
        let filter = WatchFilter::new(&patterns, vec![site.generated_dir(), site.out_dir()])?;
        let debounce = Duration::from_millis(site.config.site.watch.debounce_ms);

        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel::<PathBuf>();

        let counter = Arc::clone(&generation);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "Watch error");
                    return;
                }
            };
            if !is_content_event(&event.kind) {
                return;
            }
            for path in event.paths.into_iter().filter(|p| filter.matches(p)) {
                counter.fetch_add(1, Ordering::SeqCst);
                if tx.send(path).is_err() {
                    return;
                }
            }
        })?;
        watcher.watch(&site_dir, RecursiveMode::Recursive)?;

        let worker = std::thread::Builder::new()
            .name("docweave-reload".into())
            .spawn(move || {
                run_reloads(rx, generation, debounce, |changed, ticket| {
                    if let Some(manifest) = reload_site(&site_dir, changed, ticket) {
                        on_reload(&manifest);
                    }
                });
            })
            .map_err(WatchError::Spawn)?;

        tracing::info!(
            dir = %site.site_dir.display(),
            patterns = patterns.len(),
            debounce_ms = debounce.as_millis() as u64,
            "Watching for changes"
        );
        Ok(Self { watcher, worker })
    }

    /// Block until the worker exits, which only happens after [`Self::stop`].
    pub fn wait(self) {
        let Self { watcher, worker } = self;
        let _watcher = watcher;
        if worker.join().is_err() {
            tracing::error!("Reload worker panicked");
        }
    }

    /// Stop watching, then wait for any in-flight reload to finish.
    pub fn stop(self) {
        let Self { watcher, worker } = self;
        drop(watcher);
        if worker.join().is_err() {
            tracing::error!("Reload worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;
    use std::fs;

    fn filter(site: &Path) -> WatchFilter {
        let mut patterns = site_patterns(site);
        patterns.push(format!("{}/docs/**/*.md", site.display()));
        WatchFilter::new(&patterns, vec![site.join(".docweave"), site.join("build")]).unwrap()
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn content_and_site_files_match() {
        let site = Path::new("/site");
        let f = filter(site);
        assert!(f.matches(&site.join("docs/hello.md")));
        assert!(f.matches(&site.join("docs/foo/bar.md")));
        assert!(f.matches(&site.join("config.toml")));
        assert!(f.matches(&site.join("versions.json")));
        assert!(f.matches(&site.join("community_versions.json")));
        assert!(f.matches(&site.join("i18n/ja.json")));
    }

    #[test]
    fn unrelated_files_do_not_match() {
        let site = Path::new("/site");
        let f = filter(site);
        assert!(!f.matches(&site.join("docs/notes.txt")));
        assert!(!f.matches(&site.join("README.md")));
        assert!(!f.matches(&site.join("i18n/ja/extra.json")));
    }

    #[test]
    fn output_dirs_are_ignored() {
        let site = Path::new("/site");
        let mut patterns = vec!["/site/**/*.json".to_string()];
        patterns.extend(site_patterns(site));
        let f = WatchFilter::new(&patterns, vec![site.join(".docweave"), site.join("build")]).unwrap();
        assert!(!f.matches(&site.join(".docweave/routesChunkNames.json")));
        assert!(!f.matches(&site.join("build/docs/index.json")));
        assert!(f.matches(&site.join("sidebars.json")));
    }

    #[test]
    fn glob_characters_in_site_dir_match_literally() {
        let site = Path::new("/tmp/[site]");
        let f = filter(site);
        assert!(f.matches(&site.join("config.toml")));
        assert!(!f.matches(Path::new("/tmp/s/config.toml")));
    }

    #[test]
    fn invalid_pattern_is_error() {
        let err = WatchFilter::new(&["/site/[".to_string()], Vec::new()).unwrap_err();
        assert!(matches!(err, WatchError::Pattern { .. }));
    }

    #[test]
    fn only_content_events_count() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
        assert!(is_content_event(&EventKind::Create(CreateKind::File)));
        assert!(is_content_event(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_content_event(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_content_event(&EventKind::Access(AccessKind::Any)));
    }

    // =========================================================================
    // Debounce and supersession
    // =========================================================================

    #[test]
    fn queued_events_coalesce_into_one_reload() {
        let (tx, rx) = mpsc::channel();
        for name in ["b.md", "a.md", "b.md"] {
            tx.send(PathBuf::from(name)).unwrap();
        }
        drop(tx);

        let mut batches = Vec::new();
        run_reloads(rx, Arc::new(AtomicU64::new(3)), Duration::from_millis(10), |changed, _| {
            batches.push(changed.to_vec());
        });
        assert_eq!(batches, vec![vec![PathBuf::from("a.md"), PathBuf::from("b.md")]]);
    }

    #[test]
    fn event_during_reload_supersedes_it() {
        let (tx, rx) = mpsc::channel();
        tx.send(PathBuf::from("a.md")).unwrap();
        drop(tx);

        let generation = Arc::new(AtomicU64::new(1));
        let counter = Arc::clone(&generation);
        let mut seen = Vec::new();
        run_reloads(rx, generation, Duration::from_millis(10), |_, ticket| {
            seen.push(ticket.is_superseded());
            counter.fetch_add(1, Ordering::SeqCst);
            seen.push(ticket.is_superseded());
        });
        assert_eq!(seen, vec![false, true]);
    }

    #[test]
    fn separate_bursts_reload_separately() {
        let (tx, rx) = mpsc::channel();
        let sender = std::thread::spawn(move || {
            tx.send(PathBuf::from("first.md")).unwrap();
            std::thread::sleep(Duration::from_millis(300));
            tx.send(PathBuf::from("second.md")).unwrap();
        });

        let mut batches = Vec::new();
        run_reloads(rx, Arc::new(AtomicU64::new(0)), Duration::from_millis(20), |changed, _| {
            batches.push(changed.to_vec());
        });
        sender.join().unwrap();
        assert_eq!(
            batches,
            vec![vec![PathBuf::from("first.md")], vec![PathBuf::from("second.md")]]
        );
    }

    // =========================================================================
    // Reload
    // =========================================================================

    #[test]
    fn reload_writes_generated_files() {
        let tmp = setup_fixtures("simple-site");
        let ticket = ReloadTicket::new(&Arc::new(AtomicU64::new(0)));
        let manifest = reload_site(tmp.path(), &[tmp.path().join("docs/hello.md")], &ticket).unwrap();
        assert!(manifest.changed_count() > 0);
        assert!(tmp.path().join(".docweave/routes.js").is_file());
    }

    #[test]
    fn superseded_reload_skips_writes() {
        let tmp = setup_fixtures("simple-site");
        let generation = Arc::new(AtomicU64::new(0));
        let ticket = ReloadTicket::new(&generation);
        generation.fetch_add(1, Ordering::SeqCst);
        assert!(reload_site(tmp.path(), &[], &ticket).is_none());
        assert!(!tmp.path().join(".docweave").exists());
    }

    #[test]
    fn failed_reload_is_not_fatal() {
        let tmp = setup_fixtures("simple-site");
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "title = \"\"\n").unwrap();
        let ticket = ReloadTicket::new(&Arc::new(AtomicU64::new(0)));
        assert!(reload_site(tmp.path(), &[], &ticket).is_none());
    }
}
