use crate::error::Error;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "jsbundle.config.json";

/// Runtime configuration for the jsbundle CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Project bundle configuration, read from `jsbundle.config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleConfig {
    /// Entry file, relative to the project root.
    pub entry: String,
    /// Output directory; the bundle is written to `<bundle_dir>/bundle.js`.
    pub bundle_dir: String,
    /// HTML template to inject the bundle script into. Empty disables it.
    pub template_html: String,
    /// Rebuild when a reachable file changes.
    pub watch_files: bool,
    pub permanent_cache: PermanentCache,
    pub dev_server: DevServer,
    /// Exposed to the bundle as `process.env`.
    pub env: HashMap<String, String>,
}

/// Persisted file cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermanentCache {
    pub enable: bool,
    /// Directory holding `cache.json`, relative to the project root.
    pub dir_name: String,
}

impl Default for PermanentCache {
    fn default() -> Self {
        Self {
            enable: false,
            dir_name: ".jsbundle-cache".to_string(),
        }
    }
}

/// Static file server over the bundle directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevServer {
    pub enable: bool,
    pub port: u16,
}

impl Default for DevServer {
    fn default() -> Self {
        Self {
            enable: false,
            port: 8080,
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        let mut env = HashMap::default();
        env.insert("NODE_ENV".to_string(), "development".to_string());
        Self {
            entry: "index.js".to_string(),
            bundle_dir: "build".to_string(),
            template_html: String::new(),
            watch_files: false,
            permanent_cache: PermanentCache::default(),
            dev_server: DevServer::default(),
            env,
        }
    }
}

/// A config together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BundleConfig,
    pub path: PathBuf,
    /// False when the file was absent and defaults were used.
    pub from_file: bool,
}

impl BundleConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<LoadedConfig, Error> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedConfig {
                    config: Self::default(),
                    path: path.to_path_buf(),
                    from_file: false,
                });
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = serde_json::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            from_file: true,
        })
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::other(e.to_string()))?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Path of the written bundle, relative to the project root.
    #[must_use]
    pub fn bundle_path(&self) -> PathBuf {
        Path::new(&self.bundle_dir).join("bundle.js")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = BundleConfig::default();
        assert_eq!(config.entry, "index.js");
        assert_eq!(config.bundle_dir, "build");
        assert_eq!(config.permanent_cache.dir_name, ".jsbundle-cache");
        assert_eq!(config.env.get("NODE_ENV").map(String::as_str), Some("development"));
        assert_eq!(config.bundle_path(), Path::new("build").join("bundle.js"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let loaded = BundleConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(!loaded.from_file);
        assert_eq!(loaded.config, BundleConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"entry": "src/main.js", "permanentCache": {"enable": true}}"#,
        )
        .unwrap();

        let loaded = BundleConfig::load(&path).unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.config.entry, "src/main.js");
        assert_eq!(loaded.config.bundle_dir, "build");
        assert!(loaded.config.permanent_cache.enable);
        assert_eq!(loaded.config.permanent_cache.dir_name, ".jsbundle-cache");
    }

    #[test]
    fn test_dev_server_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"devServer": {"enable": true}}"#).unwrap();

        let config = BundleConfig::load(&path).unwrap().config;
        assert!(config.dev_server.enable);
        assert_eq!(config.dev_server.port, 8080);

        std::fs::write(&path, r#"{"devServer": {"port": 70000}}"#).unwrap();
        assert!(matches!(
            BundleConfig::load(&path),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_config_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ entry: ").unwrap();
        assert!(matches!(
            BundleConfig::load(&path),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = BundleConfig::default();
        config.template_html = "index.html".into();
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"templateHtml\": \"index.html\""));
        assert_eq!(BundleConfig::load(&path).unwrap().config, config);
    }
}
