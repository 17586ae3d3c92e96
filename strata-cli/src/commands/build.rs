//! `strata build`: render stale pages and bring the output tree in line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use strata_build::{build_site, BuildOptions, BuildReport, CopyResult, Removal, WriteResult};
use strata_core::{BuildConfig, CONFIG_FILE_NAME};

/// Arguments for `strata build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Site configuration file.
    #[arg(long, short = 'c', default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Rewrite every page and copy every static file, ignoring timestamps.
    #[arg(long)]
    pub full: bool,

    /// Show what would be written, copied and removed without touching
    /// the output directory.
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildArgs {
    pub fn run(self) -> Result<()> {
        let config = BuildConfig::load(&self.config)
            .with_context(|| format!("failed to load '{}'", self.config.display()))?;
        let options = BuildOptions {
            full: self.full,
            dry_run: self.dry_run,
        };
        let report = build_site(&config, options)
            .with_context(|| format!("build failed for '{}'", config.site_name))?;
        print_report(&config, &report);
        Ok(())
    }
}

fn print_report(config: &BuildConfig, report: &BuildReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let site = &config.site_name;

    if report.is_noop() {
        println!("{prefix}✓ '{site}': nothing to do");
        return;
    }

    println!(
        "{prefix}✓ '{site}' built ({} written, {} unchanged, {} copied, {} removed)",
        report.written(),
        report.pages.len() - report.written(),
        report.copied(),
        report.removed.len(),
    );

    let rel = |path: &Path| relative(path, &config.output_dir);
    for page in &report.pages {
        match page {
            WriteResult::Written { path } => println!("  ✎  {}", rel(path)),
            WriteResult::WouldWrite { path } => println!("  ~  {}", rel(path)),
            WriteResult::Unchanged { path } => println!("  ·  {} (unchanged)", rel(path)),
        }
    }
    for copy in &report.copies {
        match copy {
            CopyResult::Copied { path } => println!("  ⇢  {}", rel(path)),
            CopyResult::WouldCopy { path } => println!("  ~  {} (copy)", rel(path)),
            CopyResult::Skipped { .. } => {}
        }
    }
    for removal in &report.removed {
        match removal {
            Removal::File(path) => println!("  ✗  {}", rel(path)),
            Removal::Dir(path) => println!("  ✗  {}/", rel(path)),
        }
    }
}

/// `path` relative to `root`, or unchanged when it lies elsewhere.
pub(crate) fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
