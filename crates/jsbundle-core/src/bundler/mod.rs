//! JavaScript bundler.
//!
//! Bundles an entry file and everything it transitively imports into a
//! single script.
//!
//! ## Usage
//!
//! ```ignore
//! use jsbundle_core::bundler::Bundler;
//! use jsbundle_core::config::BundleConfig;
//!
//! let mut bundler = Bundler::new(project_root, BundleConfig::default());
//! let output = bundler.build()?;
//! println!("{} modules", output.modules.len());
//! ```
//!
//! ## Architecture
//!
//! 1. **Crawl** - Load the entry, then each frontier of newly imported
//!    paths in parallel. `.js` files are compiled, everything else is
//!    copied as an asset.
//! 2. **Graph** - Link imports to modules and order them.
//! 3. **Emit** - Runtime prelude, module factories, instantiation.
//! 4. **Extras** - HTML template injection and cache persistence.

mod assets;
mod cache;
mod emit;
mod graph;
mod html;

pub use assets::{asset_file_name, asset_module_code, is_script, load_asset};
pub use cache::{CachedFile, FileCache, CACHE_FILE_NAME};
pub use emit::{emit_bundle, epilogue, prelude};
pub use graph::{Module, ModuleGraph, ModuleId, ModuleKind, TopoOrder};
pub use html::{inject_script, write_index_html};

use crate::config::BundleConfig;
use crate::error::{BundleErrors, Error};
use jsbundle_parser::load_file;
use rayon::prelude::*;
use rustc_hash::FxHashSet as HashSet;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Quiet period after the last change before watch mode rebuilds. Also
/// bounds how long a set `stop` flag goes unnoticed.
pub const WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// The bundle source.
    pub code: String,
    /// Where the bundle was written.
    pub outfile: PathBuf,
    /// Every module path, in discovery order.
    pub modules: Vec<String>,
    /// Emitted asset file names.
    pub assets: Vec<String>,
    /// Written `index.html`, when a template is configured.
    pub html: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub duration: Duration,
}

/// One file after loading.
struct LoadedFile {
    path: String,
    code: String,
    imports: Vec<String>,
    kind: ModuleKind,
    /// Set when freshly compiled, so the cache can be refreshed.
    fresh: Option<SystemTime>,
    asset_name: Option<String>,
}

/// The bundler, holding a project's config and its file cache.
pub struct Bundler {
    root: PathBuf,
    config: BundleConfig,
    cache: FileCache,
    /// Every path visited by the last build, including failed ones.
    reachable: Vec<String>,
}

impl Bundler {
    /// Create a bundler for the project at `root`.
    ///
    /// With a permanent cache configured, the persisted cache is loaded.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: BundleConfig) -> Self {
        let root = root.into();
        let cache = if config.permanent_cache.enable {
            FileCache::load(&root.join(&config.permanent_cache.dir_name))
        } else {
            FileCache::new()
        };
        Self {
            root,
            config,
            cache,
            reachable: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths visited by the last build.
    #[must_use]
    pub fn reachable(&self) -> &[String] {
        &self.reachable
    }

    fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.bundle_dir)
    }

    /// Entry path in the slash-separated form the rewriter produces.
    fn entry_path(&self) -> String {
        let entry = self.config.entry.replace('\\', "/");
        entry.strip_prefix("./").unwrap_or(&entry).to_string()
    }

    /// Build the bundle and write it to `<bundleDir>/bundle.js`.
    ///
    /// Every file that fails to load is reported, not just the first.
    pub fn build(&mut self) -> Result<BundleOutput, BundleErrors> {
        let start = Instant::now();
        let entry = self.entry_path();
        let out_dir = self.out_dir();
        std::fs::create_dir_all(&out_dir).map_err(Error::from)?;

        // 1. Crawl, one frontier at a time
        let mut graph = ModuleGraph::new();
        let mut errors = Vec::new();
        let mut assets = Vec::new();
        let mut seen: HashSet<String> = HashSet::default();
        seen.insert(entry.clone());
        let mut reachable = vec![entry.clone()];
        let mut frontier = vec![entry.clone()];

        while !frontier.is_empty() {
            let results: Vec<Result<LoadedFile, Error>> = frontier
                .par_iter()
                .map(|path| self.load_one(path, &out_dir))
                .collect();

            let mut next = Vec::new();
            for result in results {
                let file = match result {
                    Ok(file) => file,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };

                for import in &file.imports {
                    if seen.insert(import.clone()) {
                        reachable.push(import.clone());
                        next.push(import.clone());
                    }
                }
                if let Some(modified) = file.fresh {
                    self.cache.insert(
                        file.path.clone(),
                        CachedFile {
                            code: file.code.clone(),
                            imports: file.imports.clone(),
                            modified,
                        },
                    );
                }
                assets.extend(file.asset_name);

                let module = Module::new(file.path, file.code, file.imports, file.kind);
                if let Err(e) = graph.add(module) {
                    warn!(error = %e, "module id collision");
                    errors.push(e);
                }
            }
            frontier = next;
        }
        self.reachable = reachable;

        if !errors.is_empty() {
            return Err(BundleErrors::new(errors));
        }

        // 2. Order modules
        graph.link();
        let topo = graph.toposort();
        let mut warnings = Vec::new();
        if !topo.cyclic.is_empty() {
            let paths: Vec<&str> = topo
                .cyclic
                .iter()
                .filter_map(|&id| graph.get(id).map(|m| m.path.as_str()))
                .collect();
            let message = format!("Circular dependency between: {}", paths.join(", "));
            warn!("{message}");
            warnings.push(message);
        }

        // 3. Emit
        let entry_id = graph.id_by_path(&entry).unwrap_or(0);
        let code = emit_bundle(&graph, &topo.order, entry_id, &self.config.env);
        let outfile = out_dir.join("bundle.js");
        std::fs::write(&outfile, &code).map_err(Error::from)?;

        // 4. Extras
        let html = if self.config.template_html.is_empty() {
            None
        } else {
            Some(write_index_html(
                &self.root.join(&self.config.template_html),
                &out_dir,
                "bundle.js",
            )?)
        };

        if self.config.permanent_cache.enable {
            let dir = self.root.join(&self.config.permanent_cache.dir_name);
            if let Err(e) = self.cache.save(&dir) {
                warn!(error = %e, "failed to save cache");
                warnings.push(format!("Cannot save cache: {e}"));
            }
        }

        let duration = start.elapsed();
        info!(
            modules = graph.len(),
            duration_ms = duration.as_millis() as u64,
            "build finished"
        );

        Ok(BundleOutput {
            code,
            outfile,
            modules: graph.iter().map(|(_, m)| m.path.clone()).collect(),
            assets,
            html,
            warnings,
            duration,
        })
    }

    /// Load one file, from the cache when its mtime is unchanged.
    fn load_one(&self, path: &str, out_dir: &Path) -> Result<LoadedFile, Error> {
        let full = self.root.join(path);
        let metadata = std::fs::metadata(&full).map_err(|_| Error::FileNotFound {
            path: path.to_string(),
        })?;

        if !is_script(path) {
            let (code, name) = load_asset(&self.root, out_dir, path)?;
            debug!(path, "copied asset");
            return Ok(LoadedFile {
                path: path.to_string(),
                code,
                imports: Vec::new(),
                kind: ModuleKind::Asset,
                fresh: None,
                asset_name: Some(name),
            });
        }

        let modified = metadata.modified().ok();
        if let Some(cached) = modified.and_then(|m| self.cache.get(path, m)) {
            debug!(path, "cache hit");
            return Ok(LoadedFile {
                path: path.to_string(),
                code: cached.code.clone(),
                imports: cached.imports.clone(),
                kind: ModuleKind::Script,
                fresh: None,
                asset_name: None,
            });
        }

        let source = std::fs::read(&full)?;
        let module = load_file(&source, path)?;
        debug!(path, imports = module.imports.len(), "loaded file");
        Ok(LoadedFile {
            path: path.to_string(),
            code: String::from_utf8_lossy(&module.code).into_owned(),
            imports: module.imports,
            kind: ModuleKind::Script,
            fresh: modified,
            asset_name: None,
        })
    }

    /// Build, then rebuild whenever a reachable file changes, until
    /// `stop` is set. Each build result is handed to `on_build`.
    ///
    /// Changes are coalesced: a rebuild starts once no reachable file
    /// has changed for [`WATCH_INTERVAL`].
    pub fn watch<F>(&mut self, stop: &AtomicBool, mut on_build: F) -> Result<(), Error>
    where
        F: FnMut(&Result<BundleOutput, BundleErrors>),
    {
        let (tx, rx) = mpsc::channel::<PathBuf>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "watch error"),
            },
            notify::Config::default(),
        )?;
        // Event paths are reported under the watched path, so it has to be
        // the canonical root for `relative_path` to match them.
        let root = self.root.canonicalize()?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!(root = %root.display(), "watching for changes");

        let result = self.build();
        on_build(&result);
        let mut watched: HashSet<String> = self.reachable.iter().cloned().collect();
        let mut last_change: Option<Instant> = None;

        while !stop.load(Ordering::Relaxed) {
            match rx.recv_timeout(WATCH_INTERVAL) {
                Ok(path) => {
                    if relative_path(&root, &path).is_some_and(|rel| watched.contains(&rel)) {
                        debug!(path = %path.display(), "reachable file changed");
                        last_change = Some(Instant::now());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if last_change.is_some_and(|at| at.elapsed() >= WATCH_INTERVAL) {
                last_change = None;
                debug!("change detected, rebuilding");
                let result = self.build();
                on_build(&result);
                watched = self.reachable.iter().cloned().collect();
            }
        }
        Ok(())
    }
}

/// Writes, creations, removals and renames. Access and metadata-only
/// events are ignored.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

/// `path` relative to `root`, slash-separated like module paths.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind};

    #[test]
    fn test_relative_path_is_slash_separated() {
        let root = Path::new("/project");
        assert_eq!(
            relative_path(root, &root.join("src").join("a.js")).as_deref(),
            Some("src/a.js")
        );
        assert_eq!(relative_path(root, Path::new("/elsewhere/a.js")), None);
    }

    #[test]
    fn test_content_changes() {
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(is_content_change(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(!is_content_change(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Permissions
        ))));
        assert!(!is_content_change(&EventKind::Access(AccessKind::Read)));
    }
}
