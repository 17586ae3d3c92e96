//! `strata status [--json]`: what the next build would do.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use strata_build::{status, ItemStatus, Removal, StaleReason, StatusReport};
use strata_core::{BuildConfig, CONFIG_FILE_NAME};
use tabled::{settings::Style, Table, Tabled};

use super::build::relative;

/// Arguments for `strata status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Site configuration file.
    #[arg(long, short = 'c', default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = BuildConfig::load(&self.config)
            .with_context(|| format!("failed to load '{}'", self.config.display()))?;
        let report = status(&config)
            .with_context(|| format!("status failed for '{}'", config.site_name))?;
        if self.json {
            print_json(&config, report)
        } else {
            print_table(&config, report);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusReportJson {
    site: String,
    update: bool,
    summary: StatusSummaryJson,
    items: Vec<ItemStatusJson>,
    pending_copies: Vec<PathBuf>,
    orphans: Vec<Removal>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    items: usize,
    stale: usize,
    pending_copies: usize,
    orphans: usize,
}

#[derive(Serialize)]
struct ItemStatusJson {
    item: String,
    destination: Option<PathBuf>,
    generated: bool,
    status: &'static str,
    reason: Option<StaleReason>,
}

fn print_json(config: &BuildConfig, report: StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        site: config.site_name.clone(),
        update: report.update,
        summary: StatusSummaryJson {
            items: report.items.len(),
            stale: report.stale_count(),
            pending_copies: report.pending_copies.len(),
            orphans: report.orphans.len(),
        },
        items: report
            .items
            .into_iter()
            .map(|row| ItemStatusJson {
                status: status_key(&row),
                item: row.label,
                destination: row.destination,
                generated: row.generated,
                reason: row.reason,
            })
            .collect(),
        pending_copies: report.pending_copies,
        orphans: report.orphans,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Output")]
    output: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn print_table(config: &BuildConfig, report: StatusReport) {
    println!(
        "strata v{} | {} | {} items | {} stale | {} orphans",
        env!("CARGO_PKG_VERSION"),
        config.site_name,
        report.items.len(),
        report.stale_count(),
        report.orphans.len(),
    );
    if !report.update {
        println!("{}", "update mode is off: every page is rebuilt".yellow());
    }

    if report.items.is_empty() {
        println!("No content found under {}.", config.content_dir.display());
    } else {
        let rows: Vec<StatusTableRow> = report
            .items
            .iter()
            .map(|row| StatusTableRow {
                item: if row.generated {
                    format!("{} (generated)", row.label)
                } else {
                    row.label.clone()
                },
                output: row
                    .destination
                    .as_deref()
                    .map(|d| relative(d, &config.output_dir))
                    .unwrap_or_else(|| "-".to_string()),
                status: status_label(row),
                reason: row.reason.map(|r| r.to_string()).unwrap_or_default(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if !report.pending_copies.is_empty() {
        println!("{} static file(s) to copy:", report.pending_copies.len());
        for path in &report.pending_copies {
            println!("  ~  {}", relative(path, &config.output_dir));
        }
    }
    if !report.orphans.is_empty() {
        println!("{}", "Orphaned output (removed on next build):".magenta());
        for orphan in &report.orphans {
            println!("  ✗  {}", relative(orphan.path(), &config.output_dir));
        }
    }
    if report.stale_count() > 0 || !report.orphans.is_empty() {
        println!("Run 'strata build' to bring the output up to date.");
    }
}

fn status_key(row: &ItemStatus) -> &'static str {
    if row.reason.is_some() {
        "updated"
    } else {
        "current"
    }
}

fn status_label(row: &ItemStatus) -> String {
    match row.reason {
        Some(_) => "UPDATED".yellow().bold().to_string(),
        None => "CURRENT".green().bold().to_string(),
    }
}
