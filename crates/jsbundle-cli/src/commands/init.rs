//! `jsbundle init` command implementation.
//!
//! Writes the default config. Won't overwrite an existing file unless
//! forced.

use super::bundle::config_path;
use jsbundle_core::BundleConfig;
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct InitResultJson {
    ok: bool,
    path: String,
    created: bool,
}

/// Run the init command.
pub fn run(cwd: &Path, config: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let path = config_path(cwd, config);
    let exists = path.exists();

    if exists && !force {
        if json {
            let result = InitResultJson {
                ok: true,
                path: path.display().to_string(),
                created: false,
            };
            println!("{}", serde_json::to_string(&result).into_diagnostic()?);
        } else {
            println!("  {} already exists (use --force to overwrite)", path.display());
        }
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| miette!("Failed to create {}: {}", parent.display(), e))?;
    }
    BundleConfig::default().save(&path).into_diagnostic()?;

    if json {
        let result = InitResultJson {
            ok: true,
            path: path.display().to_string(),
            created: true,
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else if exists {
        println!("  Overwrote {}", path.display());
    } else {
        println!("  Created {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempdir().unwrap();
        run(dir.path(), None, false, true).unwrap();

        let loaded = BundleConfig::load(&dir.path().join("jsbundle.config.json")).unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.config, BundleConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, "{\"entry\":\"main.js\"}").unwrap();

        run(dir.path(), Some(Path::new("custom.json")), false, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"entry\":\"main.js\"}"
        );

        run(dir.path(), Some(Path::new("custom.json")), true, true).unwrap();
        let loaded = BundleConfig::load(&path).unwrap();
        assert_eq!(loaded.config.entry, "index.js");
    }
}
