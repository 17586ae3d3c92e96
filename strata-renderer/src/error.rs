//! Error types for strata-renderer.

use std::path::PathBuf;

use thiserror::Error;

use strata_core::WalkError;

/// All errors that can arise from template loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera rejected a template while loading the template directory.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Rendering one item failed. `message` carries tera's full cause chain,
    /// which names the failing template and line.
    #[error("failed to render {item} with template '{template}': {message}")]
    Template {
        template: String,
        item: String,
        message: String,
    },

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),
}
