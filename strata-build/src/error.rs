//! Error types for strata-build.

use std::path::PathBuf;

use thiserror::Error;

use strata_core::{ConfigError, ContentError, WalkError};
use strata_plugins::PluginError;
use strata_renderer::RenderError;

/// All errors that can arise from a build or status run.
///
/// Everything except [`BuildError::Io`] during the write and reconcile
/// stages is raised before the output tree is touched.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    /// An item reached the write stage without an output path.
    #[error("{item} has no destination path")]
    MissingDestination { item: String },

    /// An item marked for writing was never rendered.
    #[error("{item} is marked for writing but has no rendered page")]
    NotRendered { item: String },

    /// Update mode compares against the config file's timestamp, so the file
    /// must exist.
    #[error("update mode requires a configuration file, but {path} does not exist")]
    MissingConfig { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BuildError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.into(),
        source,
    }
}
