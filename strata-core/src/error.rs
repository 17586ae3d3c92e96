//! Error types for strata-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading `strata.yaml`.
///
/// A missing file is not an error (defaults apply); everything here is fatal
/// and aborts the run before any output is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error. Includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two of the content, template and output directories nest inside each
    /// other (or are the same directory).
    #[error("{first} {} and {second} {} overlap; they must be separate directories", first_path.display(), second_path.display())]
    OverlappingDirs {
        first: &'static str,
        first_path: PathBuf,
        second: &'static str,
        second_path: PathBuf,
    },

    /// Relative paths could not be resolved.
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Errors from the file enumerator.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Filesystem error while walking, with the path that failed.
    #[error("I/O error while listing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shell-style pattern did not compile.
    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Errors raised while turning source files into content items.
///
/// Every variant is fatal for the whole build: a single malformed file aborts
/// the run instead of producing a partial site.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with a `Key: value` metadata block.
    #[error("no metadata found in {path}")]
    MissingMetadata { path: PathBuf },

    /// A required metadata field is absent.
    #[error("missing required field '{field}' in {path}")]
    MissingField { path: PathBuf, field: &'static str },

    /// The `date` field does not match the configured date format.
    #[error("invalid date '{value}' in {path} (expected format '{format}'): {source}")]
    InvalidDate {
        path: PathBuf,
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A source path is not below the content root.
    #[error("{path} is not inside the content directory {root}")]
    OutsideContentRoot { path: PathBuf, root: PathBuf },

    /// Two items resolved to the same output file.
    #[error("destination {path} is already claimed by another item")]
    DestinationCollision { path: PathBuf },

    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// Convenience constructor for [`ContentError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ContentError {
    ContentError::Io {
        path: path.into(),
        source,
    }
}
