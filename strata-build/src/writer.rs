//! Output writer: rendered pages and static-file copies.
//!
//! ## `write_item`
//!
//! 1. Resolve the destination (an item without one aborts the run).
//! 2. Skip items not marked `updated` → [`WriteResult::Unchanged`].
//! 3. Create missing parent directories.
//! 4. Write UTF-8 text to `<path>.strata.tmp`.
//! 5. Rename onto the final path.
//!
//! Every outcome carries the destination path, so the caller can add it to
//! the written-file ledger whether or not bytes were written.

use std::path::{Path, PathBuf};

use filetime::FileTime;
use serde::Serialize;

use strata_core::{BuildConfig, ContentItem};

use crate::error::{io_err, BuildError};
use crate::staleness::mtime;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of writing one rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum WriteResult {
    /// File was (re)written.
    Written { path: PathBuf },
    /// Item is current; the existing file was left alone.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

/// Outcome of copying one static file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CopyResult {
    Copied { path: PathBuf },
    /// The existing copy is at least as new as the source.
    Skipped { path: PathBuf },
    WouldCopy { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

impl CopyResult {
    pub fn path(&self) -> &Path {
        match self {
            CopyResult::Copied { path }
            | CopyResult::Skipped { path }
            | CopyResult::WouldCopy { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The destination of `item`, or [`BuildError::MissingDestination`].
pub fn destination_of(item: &ContentItem) -> Result<&Path, BuildError> {
    item.destination_path
        .as_deref()
        .ok_or_else(|| BuildError::MissingDestination { item: item.label() })
}

/// Write one item's rendered page if it is marked `updated`.
pub fn write_item(item: &ContentItem, dry_run: bool) -> Result<WriteResult, BuildError> {
    let path = destination_of(item)?;
    if !item.updated {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }
    let page = item
        .rendered_page
        .as_deref()
        .ok_or_else(|| BuildError::NotRendered { item: item.label() })?;

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    let tmp = PathBuf::from(format!("{}.strata.tmp", path.display()));
    write_via(path, page, &tmp)?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn write_via(path: &Path, content: &str, tmp: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Static files
// ---------------------------------------------------------------------------

/// Mirror `source` (a file under the content root) into the output root.
///
/// The bytes are copied when `update` is off, when there is no copy yet, or
/// when the source is newer than the copy. Copies take the source's
/// timestamps so the next run sees them as current. A destination that
/// resolves to the source itself (through a symlinked output directory) is
/// always skipped.
pub fn copy_static(
    source: &Path,
    config: &BuildConfig,
    update: bool,
    dry_run: bool,
) -> Result<CopyResult, BuildError> {
    let destination = config.mirror_for(source)?;

    if same_file(source, &destination) {
        tracing::debug!("{} is the source itself, not copying", destination.display());
        return Ok(CopyResult::Skipped { path: destination });
    }

    let needed = if update {
        match mtime(&destination)? {
            None => true,
            Some(dst_time) => mtime(source)?.is_some_and(|src_time| src_time > dst_time),
        }
    } else {
        true
    };

    if !needed {
        tracing::debug!("skipped copy: {}", destination.display());
        return Ok(CopyResult::Skipped { path: destination });
    }
    if dry_run {
        tracing::info!("[dry-run] would copy: {}", destination.display());
        return Ok(CopyResult::WouldCopy { path: destination });
    }

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::copy(source, &destination).map_err(|e| io_err(&destination, e))?;
    let meta = std::fs::metadata(source).map_err(|e| io_err(source, e))?;
    filetime::set_file_times(
        &destination,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
    .map_err(|e| io_err(&destination, e))?;

    tracing::info!("copied: {}", destination.display());
    Ok(CopyResult::Copied { path: destination })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::set_file_mtime;
    use std::fs;
    use tempfile::TempDir;

    fn item(config: &BuildConfig, rel: &str, page: Option<&str>, updated: bool) -> ContentItem {
        let mut item = ContentItem::generated(config, rel, "post", config.output_dir.join(rel));
        item.rendered_page = page.map(str::to_string);
        item.updated = updated;
        item
    }

    fn config() -> (TempDir, BuildConfig) {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        (tmp, config)
    }

    #[test]
    fn writes_and_creates_parent_directories() {
        let (_tmp, config) = config();
        let item = item(&config, "a/b/page.html", Some("héllo ✓"), true);
        let result = write_item(&item, false).unwrap();
        let path = config.output_dir.join("a/b/page.html");
        assert_eq!(result, WriteResult::Written { path: path.clone() });
        assert_eq!(fs::read_to_string(&path).unwrap(), "héllo ✓");
    }

    #[test]
    fn truncates_existing_file_and_leaves_no_tmp() {
        let (_tmp, config) = config();
        let path = config.output_dir.join("page.html");
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(&path, "a much longer previous version").unwrap();

        write_item(&item(&config, "page.html", Some("new"), true), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!config.output_dir.join("page.html.strata.tmp").exists());
    }

    #[test]
    fn current_item_is_unchanged() {
        let (_tmp, config) = config();
        let result = write_item(&item(&config, "page.html", None, false), false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert!(!config.output_dir.join("page.html").exists());
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let (_tmp, config) = config();
        let result = write_item(&item(&config, "page.html", Some("x"), true), true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!config.output_dir.exists(), "dry-run must not create directories");
    }

    #[test]
    fn missing_destination_is_fatal() {
        let (_tmp, config) = config();
        let mut item = item(&config, "page.html", Some("x"), true);
        item.destination_path = None;
        let err = write_item(&item, false).unwrap_err();
        assert!(matches!(err, BuildError::MissingDestination { .. }));
    }

    #[test]
    fn unrendered_item_is_fatal() {
        let (_tmp, config) = config();
        let err = write_item(&item(&config, "page.html", None, true), false).unwrap_err();
        assert!(matches!(err, BuildError::NotRendered { .. }));
    }

    #[test]
    fn copy_preserves_mtime_and_skips_when_current() {
        let (_tmp, config) = config();
        let source = config.content_dir.join("img").join("logo.png");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, [0u8, 1, 2, 3]).unwrap();
        set_file_mtime(&source, FileTime::from_unix_time(1_000, 0)).unwrap();

        let first = copy_static(&source, &config, true, false).unwrap();
        let dest = config.output_dir.join("img").join("logo.png");
        assert_eq!(first, CopyResult::Copied { path: dest.clone() });
        assert_eq!(fs::read(&dest).unwrap(), vec![0u8, 1, 2, 3]);
        let copied = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(copied.unix_seconds(), 1_000);

        let second = copy_static(&source, &config, true, false).unwrap();
        assert_eq!(second, CopyResult::Skipped { path: dest.clone() });

        let forced = copy_static(&source, &config, false, true).unwrap();
        assert_eq!(forced, CopyResult::WouldCopy { path: dest });
    }

    #[cfg(unix)]
    #[test]
    fn copy_through_linked_output_never_truncates_the_source() {
        let (_tmp, config) = config();
        let source = config.content_dir.join("img").join("logo.png");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "png").unwrap();
        fs::create_dir_all(&config.output_dir).unwrap();
        std::os::unix::fs::symlink(config.content_dir.join("img"), config.output_dir.join("img"))
            .unwrap();

        let result = copy_static(&source, &config, false, false).unwrap();
        assert!(matches!(result, CopyResult::Skipped { .. }), "got: {result:?}");
        assert_eq!(fs::read_to_string(&source).unwrap(), "png");
    }

    #[test]
    fn newer_source_is_copied_again() {
        let (_tmp, config) = config();
        let source = config.content_dir.join("style.css");
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::write(&source, "a{}").unwrap();
        set_file_mtime(&source, FileTime::from_unix_time(1_000, 0)).unwrap();
        copy_static(&source, &config, true, false).unwrap();

        fs::write(&source, "b{}").unwrap();
        set_file_mtime(&source, FileTime::from_unix_time(2_000, 0)).unwrap();
        let result = copy_static(&source, &config, true, false).unwrap();
        assert!(matches!(result, CopyResult::Copied { .. }));
        assert_eq!(
            fs::read_to_string(config.output_dir.join("style.css")).unwrap(),
            "b{}"
        );
    }
}
