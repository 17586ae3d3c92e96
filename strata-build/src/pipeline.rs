//! Build pipeline entrypoints used by the CLI.
//!
//! ```text
//! scan → metadata parsers + content filters → generators
//!      → staleness → render → validate destinations
//!      → write pages → copy static files → reconcile
//! ```
//!
//! Everything up to and including destination validation only reads the
//! filesystem, so scan, template and plug-in errors abort before the output
//! tree is touched.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use strata_core::content::load_item;
use strata_core::enumerate::{self, ALL_FILES};
use strata_core::{BuildConfig, ContentError, SiteContext};
use strata_plugins::PluginRegistry;
use strata_renderer::TemplateEngine;

use crate::error::BuildError;
use crate::reconcile::{reconcile, Removal};
use crate::staleness::{evaluate, StaleReason};
use crate::writer::{copy_static, destination_of, write_item, CopyResult, WriteResult};

/// Per-run switches layered over [`BuildConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Rewrite everything regardless of timestamps.
    pub full: bool,
    /// Decide everything, touch nothing.
    pub dry_run: bool,
}

/// What a build did (or, with `dry_run`, would do).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub dry_run: bool,
    pub pages: Vec<WriteResult>,
    pub copies: Vec<CopyResult>,
    /// Deletions in the order they were performed.
    pub removed: Vec<Removal>,
}

impl BuildReport {
    /// Pages written (or that would be written).
    pub fn written(&self) -> usize {
        self.pages
            .iter()
            .filter(|r| !matches!(r, WriteResult::Unchanged { .. }))
            .count()
    }

    /// Static files copied (or that would be copied).
    pub fn copied(&self) -> usize {
        self.copies
            .iter()
            .filter(|r| !matches!(r, CopyResult::Skipped { .. }))
            .count()
    }

    /// `true` when the run changed (or would change) nothing.
    pub fn is_noop(&self) -> bool {
        self.written() == 0 && self.copied() == 0 && self.removed.is_empty()
    }
}

/// One row of [`StatusReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ItemStatus {
    pub label: String,
    pub destination: Option<PathBuf>,
    pub generated: bool,
    /// `None` when the item is current.
    pub reason: Option<StaleReason>,
}

/// What the next build would do, computed without writing.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub update: bool,
    pub items: Vec<ItemStatus>,
    /// Static files the next build would copy.
    pub pending_copies: Vec<PathBuf>,
    /// Output the next build would delete.
    pub orphans: Vec<Removal>,
}

impl StatusReport {
    pub fn stale_count(&self) -> usize {
        self.items.iter().filter(|i| i.reason.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Load every content source, run metadata parsers and content filters on
/// each, then run the generators.
pub fn scan(config: &BuildConfig, registry: &PluginRegistry) -> Result<SiteContext, BuildError> {
    let mut site = SiteContext::new(config.clone());
    for source in enumerate::list_files(&config.content_dir, &config.content_pattern())? {
        let mut item = load_item(&source, config)?;
        registry.process_item(&mut item, config)?;
        site.push(item)?;
    }
    let sources = site.len();
    registry.run_generators(&mut site)?;
    tracing::debug!(
        "scanned {sources} source(s), {} generated item(s)",
        site.len() - sources
    );
    Ok(site)
}

/// Files under the content root that are mirrored verbatim.
fn static_files(config: &BuildConfig) -> Result<Vec<PathBuf>, BuildError> {
    if !config.copy_static && !config.copy_sources {
        return Ok(vec![]);
    }
    let files = enumerate::list_files(&config.content_dir, ALL_FILES)?
        .into_iter()
        .filter(|path| {
            let is_source = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == config.content_extension);
            if is_source {
                config.copy_sources
            } else {
                config.copy_static
            }
        })
        .collect();
    Ok(files)
}

/// Every item has a destination, and no static copy lands on a page.
fn validate_destinations(site: &SiteContext, statics: &[PathBuf]) -> Result<(), BuildError> {
    for item in site.items() {
        destination_of(item)?;
    }
    let config = site.config();
    for source in statics {
        let mirror = config.mirror_for(source)?;
        if site.contains_destination(&mirror) {
            return Err(ContentError::DestinationCollision { path: mirror }.into());
        }
    }
    Ok(())
}

fn render_updated(site: &mut SiteContext, engine: &TemplateEngine) -> Result<(), BuildError> {
    let mut pages = Vec::new();
    for item in site.items() {
        if item.updated {
            tracing::debug!("rendering {} with '{}'", item.label(), item.template);
            pages.push(Some(engine.render_item(item, site)?));
        } else {
            pages.push(None);
        }
    }
    for (item, page) in site.items_mut().zip(pages) {
        if page.is_some() {
            item.rendered_page = page;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entrypoints
// ---------------------------------------------------------------------------

/// Run a whole build.
pub fn build_site(config: &BuildConfig, options: BuildOptions) -> Result<BuildReport, BuildError> {
    let update = config.update && !options.full;
    tracing::info!(
        "building '{}' from {} ({})",
        config.site_name,
        config.content_dir.display(),
        if update { "incremental" } else { "full" }
    );

    let registry = PluginRegistry::from_config(config)?;
    let engine = TemplateEngine::new(&config.template_dir)?;
    let mut site = scan(config, &registry)?;
    evaluate(&mut site, update)?;
    render_updated(&mut site, &engine)?;
    let statics = static_files(config)?;
    validate_destinations(&site, &statics)?;

    let mut report = BuildReport {
        dry_run: options.dry_run,
        ..BuildReport::default()
    };
    let mut ledger: BTreeSet<PathBuf> = BTreeSet::new();

    for item in site.items() {
        let result = write_item(item, options.dry_run)?;
        ledger.insert(result.path().to_path_buf());
        report.pages.push(result);
    }
    for source in &statics {
        let result = copy_static(source, config, update, options.dry_run)?;
        ledger.insert(result.path().to_path_buf());
        report.copies.push(result);
    }
    report.removed = reconcile(config, &ledger, options.dry_run)?;

    tracing::info!(
        "{} page(s) written, {} file(s) copied, {} removed",
        report.written(),
        report.copied(),
        report.removed.len()
    );
    Ok(report)
}

/// Evaluate staleness and orphans without touching the output tree.
pub fn status(config: &BuildConfig) -> Result<StatusReport, BuildError> {
    let registry = PluginRegistry::from_config(config)?;
    let mut site = scan(config, &registry)?;
    let reasons = evaluate(&mut site, config.update)?;
    let statics = static_files(config)?;

    let mut ledger: BTreeSet<PathBuf> = site
        .items()
        .iter()
        .filter_map(|item| item.destination_path.clone())
        .collect();
    let mut pending_copies = Vec::new();
    for source in &statics {
        let result = copy_static(source, config, config.update, true)?;
        if matches!(result, CopyResult::WouldCopy { .. }) {
            pending_copies.push(result.path().to_path_buf());
        }
        ledger.insert(result.path().to_path_buf());
    }

    let items = site
        .items()
        .iter()
        .zip(reasons)
        .map(|(item, reason)| ItemStatus {
            label: display_label(item.source_path.as_deref(), &item.label(), config),
            destination: item.destination_path.clone(),
            generated: item.is_generated(),
            reason,
        })
        .collect();

    Ok(StatusReport {
        update: config.update,
        items,
        pending_copies,
        orphans: reconcile(config, &ledger, true)?,
    })
}

/// Sources are shown relative to the content root.
fn display_label(source: Option<&Path>, fallback: &str, config: &BuildConfig) -> String {
    source
        .and_then(|s| s.strip_prefix(&config.content_dir).ok())
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site_at(tmp: &TempDir) -> BuildConfig {
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        fs::create_dir_all(config.content_dir.join("img")).unwrap();
        fs::create_dir_all(&config.template_dir).unwrap();
        fs::write(config.template_dir.join("post.html"), "{{ page.body }}").unwrap();
        fs::write(config.content_dir.join("a.md"), "Template: post\n\nhi\n").unwrap();
        fs::write(config.content_dir.join("img").join("x.png"), "png").unwrap();
        config
    }

    #[test]
    fn static_files_follow_copy_flags() {
        let tmp = TempDir::new().unwrap();
        let mut config = site_at(&tmp);
        let names = |config: &BuildConfig| -> Vec<String> {
            static_files(config)
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(&config), vec!["x.png"]);
        config.copy_sources = true;
        assert_eq!(names(&config), vec!["a.md", "x.png"]);
        config.copy_static = false;
        assert_eq!(names(&config), vec!["a.md"]);
    }

    #[test]
    fn static_copy_colliding_with_a_page_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let config = site_at(&tmp);
        fs::write(config.content_dir.join("a.html"), "<p>hand written</p>").unwrap();

        let err = build_site(&config, BuildOptions::default()).unwrap_err();
        assert!(
            matches!(err, BuildError::Content(ContentError::DestinationCollision { .. })),
            "got: {err}"
        );
        assert!(!config.output_dir.exists(), "nothing is written on a fatal error");
    }

    #[test]
    fn report_counts() {
        let tmp = TempDir::new().unwrap();
        let config = site_at(&tmp);
        let report = build_site(&config, BuildOptions::default()).unwrap();
        assert_eq!(report.written(), 1);
        assert_eq!(report.copied(), 1);
        assert!(!report.is_noop());
        assert_eq!(
            fs::read_to_string(config.output_dir.join("a.html")).unwrap(),
            "<p>hi</p>\n"
        );
    }
}
