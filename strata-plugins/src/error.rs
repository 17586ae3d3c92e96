//! Error types for strata-plugins.

use thiserror::Error;

use strata_core::{ContentError, WalkError};

/// All errors that can arise from plug-in resolution and execution.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A configured plug-in name has no implementation.
    #[error("unknown {kind} '{name}'; expected one of: {expected}")]
    Unknown {
        kind: &'static str,
        name: String,
        expected: String,
    },

    /// `local-url` met a `$name` placeholder other than `$LOCALURL`.
    #[error("unknown placeholder '${name}' in {item} (write '$$' for a literal '$')")]
    UnknownPlaceholder { item: String, name: String },

    /// `local-url` met a `$` not followed by a placeholder name.
    #[error("invalid placeholder at byte {position} in {item} (write '$$' for a literal '$')")]
    InvalidPlaceholder { item: String, position: usize },

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Content(#[from] ContentError),
}
