//! # strata-build
//!
//! Incremental build engine: decides which pages are stale, writes what
//! changed, copies static files and removes output that no longer maps back
//! to a source.
//!
//! Call [`build_site`] to run a whole build, or [`status`] to see what the
//! next build would do without touching the output tree.

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod staleness;
pub mod writer;

pub use error::BuildError;
pub use pipeline::{build_site, scan, status, BuildOptions, BuildReport, ItemStatus, StatusReport};
pub use reconcile::Removal;
pub use staleness::StaleReason;
pub use writer::{CopyResult, WriteResult};
