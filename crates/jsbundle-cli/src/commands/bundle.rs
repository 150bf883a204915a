//! `jsbundle bundle` command implementation.
//!
//! Bundles the configured entry and everything it imports into
//! `<bundleDir>/bundle.js`.

use jsbundle_core::{BundleConfig, BundleErrors, BundleOutput, Bundler, CONFIG_FILE_NAME};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use super::serve;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Bundle command action.
#[derive(Debug, Clone)]
pub struct BundleAction {
    /// Project root.
    pub cwd: PathBuf,
    /// Config file, relative to `cwd` (default: jsbundle.config.json).
    pub config: Option<PathBuf>,
    /// Entry override.
    pub entry: Option<String>,
    /// Output directory override.
    pub out_dir: Option<String>,
    /// Keep rebuilding on changes.
    pub watch: bool,
}

/// JSON output for bundle command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleResultJson {
    ok: bool,
    entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    modules: Vec<String>,
    assets: Vec<String>,
    size_bytes: usize,
    duration_ms: u64,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BundleErrorJson>,
}

#[derive(Serialize)]
struct BundleErrorJson {
    code: String,
    message: String,
    count: usize,
}

/// Run the bundle command.
pub fn run(action: BundleAction, json: bool) -> Result<()> {
    let config = resolve_config(&action)?;
    let watch = action.watch || config.watch_files;
    let dev_server = config.dev_server.enable;

    // --json promises exactly one object on stdout
    if (watch || dev_server) && json {
        eprintln!("error: --json cannot be combined with watch mode or the dev server");
        std::process::exit(2);
    }

    let entry = config.entry.clone();
    let mut bundler = Bundler::new(&action.cwd, config);

    if watch || dev_server {
        return run_until_interrupted(bundler, &entry, watch);
    }

    match bundler.build() {
        Ok(output) => {
            if json {
                let result = BundleResultJson {
                    ok: true,
                    entry,
                    outfile: Some(output.outfile.display().to_string()),
                    size_bytes: output.code.len(),
                    duration_ms: output.duration.as_millis() as u64,
                    modules: output.modules,
                    assets: output.assets,
                    warnings: output.warnings,
                    error: None,
                };
                println!("{}", serde_json::to_string(&result).into_diagnostic()?);
            } else {
                print_summary(&entry, &output);
            }
            Ok(())
        }
        Err(errors) => {
            if json {
                let code = errors
                    .errors
                    .first()
                    .map_or("INTERNAL_ERROR", jsbundle_core::Error::code);
                let result = BundleResultJson {
                    ok: false,
                    entry,
                    outfile: None,
                    modules: Vec::new(),
                    assets: Vec::new(),
                    size_bytes: 0,
                    duration_ms: 0,
                    warnings: Vec::new(),
                    error: Some(BundleErrorJson {
                        code: code.to_string(),
                        message: errors.to_string(),
                        count: errors.len(),
                    }),
                };
                println!("{}", serde_json::to_string(&result).into_diagnostic()?);
            } else {
                print_errors(&errors);
            }
            std::process::exit(1);
        }
    }
}

/// Watch mode and the dev server, each optional, until Ctrl-C.
fn run_until_interrupted(mut bundler: Bundler, entry: &str, watch: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_stop.store(true, Ordering::Relaxed);
        }
    });

    let report = |result: &Result<BundleOutput, BundleErrors>| match result {
        Ok(output) => print_summary(entry, output),
        Err(errors) => print_errors(errors),
    };

    let dev_server = bundler.config().dev_server.clone();
    if dev_server.enable {
        let dir = bundler.root().join(&bundler.config().bundle_dir);
        println!("  Dev server listening at http://localhost:{}", dev_server.port);
        if !watch {
            report(&bundler.build());
            return runtime.block_on(serve::serve(dir, dev_server.port));
        }

        let server_stop = Arc::clone(&stop);
        runtime.spawn(async move {
            if let Err(e) = serve::serve(dir, dev_server.port).await {
                eprintln!("error: {e}");
                server_stop.store(true, Ordering::Relaxed);
            }
        });
    }

    eprintln!("  watching {} for changes (Ctrl+C to stop)", bundler.root().display());
    bundler.watch(&stop, report).into_diagnostic()
}

/// Load the config file and apply command-line overrides.
fn resolve_config(action: &BundleAction) -> Result<BundleConfig> {
    let path = config_path(&action.cwd, action.config.as_deref());
    let loaded = BundleConfig::load(&path).into_diagnostic()?;
    if !loaded.from_file {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
    }

    let mut config = loaded.config;
    if let Some(entry) = &action.entry {
        config.entry.clone_from(entry);
    }
    if let Some(out_dir) = &action.out_dir {
        config.bundle_dir.clone_from(out_dir);
    }
    Ok(config)
}

/// Config path, relative to `cwd` unless absolute.
pub fn config_path(cwd: &Path, config: Option<&Path>) -> PathBuf {
    cwd.join(config.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME)))
}

fn print_summary(entry: &str, output: &BundleOutput) {
    let size_kb = output.code.len() as f64 / 1024.0;
    println!(
        "  {} -> {} ({} modules, {:.1}KB, {}ms)",
        entry,
        output.outfile.display(),
        output.modules.len(),
        size_kb,
        output.duration.as_millis()
    );
    for asset in &output.assets {
        println!("    + {asset}");
    }
    if let Some(html) = &output.html {
        println!("    + {}", html.display());
    }
    for warning in &output.warnings {
        eprintln!("  warning: {warning}");
    }
}

fn print_errors(errors: &BundleErrors) {
    for err in &errors.errors {
        eprintln!("error: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_defaults_to_project_file() {
        let cwd = Path::new("/project");
        assert_eq!(
            config_path(cwd, None),
            PathBuf::from("/project/jsbundle.config.json")
        );
        assert_eq!(
            config_path(cwd, Some(Path::new("conf/dev.json"))),
            PathBuf::from("/project/conf/dev.json")
        );
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"entry": "src/main.js", "bundleDir": "dist"}"#,
        )
        .unwrap();

        let action = BundleAction {
            cwd: dir.path().to_path_buf(),
            config: None,
            entry: None,
            out_dir: Some("out".to_string()),
            watch: false,
        };
        let config = resolve_config(&action).unwrap();
        assert_eq!(config.entry, "src/main.js");
        assert_eq!(config.bundle_dir, "out");
    }
}
