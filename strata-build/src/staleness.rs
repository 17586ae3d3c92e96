//! Staleness evaluation.
//!
//! A source-backed item is stale when any of these hold (checked in this
//! order, first match is reported):
//!
//! 1. `Missing`: the destination does not exist
//! 2. `SourceChanged`: the source is newer than the destination
//! 3. `ConfigChanged`: the destination is older than the config file
//! 4. `TemplatesChanged`: the destination is older than the newest template
//!
//! Generated items have no source. They are stale (`ContentChanged`) when
//! any source-backed item is stale, or when the output root holds a page
//! that no item claims and that mirrors no content file, i.e. its source
//! was deleted or renamed. A generated item whose own destination is
//! missing is stale too (`Missing`). With update mode off every item is
//! stale (`FullRebuild`).

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use strata_core::{enumerate, BuildConfig, SiteContext, CONFIG_FILE_NAME};

use crate::error::{io_err, BuildError};

/// Why an item must be (re)written this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleReason {
    Missing,
    SourceChanged,
    ConfigChanged,
    TemplatesChanged,
    ContentChanged,
    FullRebuild,
}

impl StaleReason {
    pub fn name(&self) -> &'static str {
        match self {
            StaleReason::Missing => "missing",
            StaleReason::SourceChanged => "source changed",
            StaleReason::ConfigChanged => "config changed",
            StaleReason::TemplatesChanged => "templates changed",
            StaleReason::ContentChanged => "content changed",
            StaleReason::FullRebuild => "full rebuild",
        }
    }
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Run-wide timestamps
// ---------------------------------------------------------------------------

/// The two timestamps every item is compared against, computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    /// Newest file under the template directory; `None` when there are none.
    pub newest_template: Option<SystemTime>,
    pub config: SystemTime,
}

impl Timestamps {
    /// Read both timestamps. The config file must exist.
    pub fn collect(config: &BuildConfig) -> Result<Self, BuildError> {
        let newest_template = if config.template_dir.is_dir() {
            enumerate::newest_mtime(&config.template_dir)?
        } else {
            None
        };

        let config_path: PathBuf = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.root_dir.join(CONFIG_FILE_NAME));
        let Some(config_time) = mtime(&config_path)? else {
            return Err(BuildError::MissingConfig { path: config_path });
        };

        Ok(Timestamps {
            newest_template,
            config: config_time,
        })
    }

    /// Decide one source-backed item.
    pub fn check(&self, source: &Path, destination: &Path) -> Result<Option<StaleReason>, BuildError> {
        let Some(dst_time) = mtime(destination)? else {
            return Ok(Some(StaleReason::Missing));
        };
        let src_time = mtime(source)?.ok_or_else(|| {
            io_err(source, std::io::Error::new(ErrorKind::NotFound, "source vanished"))
        })?;

        let reason = if src_time > dst_time {
            Some(StaleReason::SourceChanged)
        } else if dst_time < self.config {
            Some(StaleReason::ConfigChanged)
        } else if self.newest_template.is_some_and(|t| dst_time < t) {
            Some(StaleReason::TemplatesChanged)
        } else {
            None
        };
        Ok(reason)
    }
}

/// Modification time of `path`, `None` if it does not exist.
pub(crate) fn mtime(path: &Path) -> Result<Option<SystemTime>, BuildError> {
    match std::fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some).map_err(|e| io_err(path, e)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Set `updated` on every item of `site` and return the reason per item, in
/// item order (`None` = current).
pub fn evaluate(site: &mut SiteContext, update: bool) -> Result<Vec<Option<StaleReason>>, BuildError> {
    if !update {
        tracing::debug!("update mode off, every item is stale");
        for item in site.items_mut() {
            item.updated = true;
        }
        return Ok(vec![Some(StaleReason::FullRebuild); site.len()]);
    }

    let stamps = Timestamps::collect(site.config())?;
    let mut reasons = Vec::with_capacity(site.len());
    for item in site.items() {
        let reason = match (&item.source_path, &item.destination_path) {
            (Some(source), Some(destination)) => stamps.check(source, destination)?,
            (Some(_), None) => Some(StaleReason::Missing),
            (None, _) => None,
        };
        reasons.push(reason);
    }

    let content_changed = site
        .items()
        .iter()
        .zip(&reasons)
        .any(|(item, reason)| !item.is_generated() && reason.is_some())
        || has_removed_pages(site)?;

    for (item, reason) in site.items().iter().zip(reasons.iter_mut()) {
        if !item.is_generated() {
            continue;
        }
        let exists = match &item.destination_path {
            Some(destination) => mtime(destination)?.is_some(),
            None => false,
        };
        *reason = if content_changed {
            Some(StaleReason::ContentChanged)
        } else if !exists {
            Some(StaleReason::Missing)
        } else {
            None
        };
    }

    for (item, reason) in site.items_mut().zip(&reasons) {
        item.updated = reason.is_some();
        match reason {
            Some(reason) => tracing::debug!("{}: stale ({reason})", item.label()),
            None => tracing::debug!("{}: current", item.label()),
        }
    }
    Ok(reasons)
}

/// Some page under the output root has no item and no content file behind
/// it. Reconciliation deletes it this run, so generated listings must be
/// rebuilt without it.
fn has_removed_pages(site: &SiteContext) -> Result<bool, BuildError> {
    let config = site.config();
    if !config.output_dir.is_dir() {
        return Ok(false);
    }
    let pattern = format!(".{}", config.output_extension);
    for page in enumerate::list_files_no_follow(&config.output_dir, &pattern)? {
        if site.contains_destination(&page) {
            continue;
        }
        let Ok(relative) = page.strip_prefix(&config.output_dir) else {
            continue;
        };
        if config.content_dir.join(relative).exists() {
            continue;
        }
        tracing::debug!("{} no longer has a source", page.display());
        return Ok(true);
    }
    Ok(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
