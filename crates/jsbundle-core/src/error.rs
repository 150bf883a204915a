use jsbundle_parser::LoadError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for jsbundle operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("Error loading file {path}:\nCannot find file")]
    FileNotFound { path: String },

    #[error("Module id {id} is shared by {first} and {second}")]
    ModuleIdCollision {
        id: String,
        first: String,
        second: String,
    },

    #[error("Invalid HTML template {path}: {message}")]
    Template { path: PathBuf, message: String },

    #[error("File watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable machine-readable code, used in `--json` output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => "CONFIG_INVALID",
            Self::Load(_) => "PARSE_ERROR",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::ModuleIdCollision { .. } => "MODULE_ID_COLLISION",
            Self::Template { .. } => "TEMPLATE_INVALID",
            Self::Watch(_) => "WATCH_FAILED",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }
}

/// Every failure of one build, in the order the files were visited.
#[derive(Debug, Default)]
pub struct BundleErrors {
    pub errors: Vec<Error>,
}

impl BundleErrors {
    #[must_use]
    pub fn new(errors: Vec<Error>) -> Self {
        Self { errors }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl From<Error> for BundleErrors {
    fn from(err: Error) -> Self {
        Self { errors: vec![err] }
    }
}

impl fmt::Display for BundleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BundleErrors {}
