//! Output reconciliation: make the output tree match the written-file ledger.
//!
//! 1. Delete every file under the output root that is not in the ledger.
//! 2. Mark every directory under the output root that holds no ledger entry
//!    and whose counterpart under the content root is gone or holds no
//!    files.
//! 3. Remove marked directories deepest first. The output root itself is
//!    never removed.
//!
//! Dot-prefixed entries are invisible to the enumerator and therefore never
//! deleted; a marked directory that still holds one is kept with a warning.
//!
//! Symbolic links are never followed. A link is one entry: it is unlinked
//! when nothing in the ledger lives at or below it, and whatever it points
//! to is left alone.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use strata_core::enumerate::{self, ALL_FILES};
use strata_core::BuildConfig;

use crate::error::{io_err, BuildError};

/// One deletion, in the order it was performed. `File` also covers
/// symbolic links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "kebab-case")]
pub enum Removal {
    File(PathBuf),
    Dir(PathBuf),
}

impl Removal {
    pub fn path(&self) -> &Path {
        match self {
            Removal::File(path) | Removal::Dir(path) => path,
        }
    }
}

/// Delete orphaned output. With `dry_run` nothing is touched and the
/// returned list is what would have been removed.
pub fn reconcile(
    config: &BuildConfig,
    ledger: &BTreeSet<PathBuf>,
    dry_run: bool,
) -> Result<Vec<Removal>, BuildError> {
    let output = &config.output_dir;
    if !output.is_dir() {
        return Ok(vec![]);
    }
    let mut removed = Vec::new();

    for file in enumerate::list_files_no_follow(output, ALL_FILES)? {
        if in_ledger(&file, ledger) {
            continue;
        }
        if dry_run {
            tracing::info!("[dry-run] would delete: {}", file.display());
        } else {
            remove_entry(&file).map_err(|e| io_err(&file, e))?;
            tracing::info!("deleted: {}", file.display());
        }
        removed.push(Removal::File(file));
    }

    let mut marked = Vec::new();
    for dir in enumerate::list_dirs_no_follow(output)? {
        if is_orphan_dir(&dir, config, ledger)? {
            marked.push(dir);
        }
    }
    marked.sort_by(|a, b| b.cmp(a));

    for dir in marked {
        if dir == *output {
            continue;
        }
        if dry_run {
            tracing::info!("[dry-run] would remove directory: {}", dir.display());
            removed.push(Removal::Dir(dir));
            continue;
        }
        if has_entries(&dir)? {
            tracing::warn!("keeping {}: it still holds hidden files", dir.display());
            continue;
        }
        std::fs::remove_dir(&dir).map_err(|e| io_err(&dir, e))?;
        tracing::info!("removed directory: {}", dir.display());
        removed.push(Removal::Dir(dir));
    }

    Ok(removed)
}

/// Nothing in the ledger lives below `dir`, and its content counterpart is
/// missing or empty.
fn is_orphan_dir(
    dir: &Path,
    config: &BuildConfig,
    ledger: &BTreeSet<PathBuf>,
) -> Result<bool, BuildError> {
    let Ok(relative) = dir.strip_prefix(&config.output_dir) else {
        return Ok(false);
    };
    if in_ledger(dir, ledger) {
        return Ok(false);
    }
    let counterpart = config.content_dir.join(relative);
    if !counterpart.is_dir() {
        return Ok(true);
    }
    Ok(enumerate::list_files(&counterpart, ALL_FILES)?.is_empty())
}

/// `path` itself or anything below it was written this run. Descendants
/// sort directly after their ancestor.
fn in_ledger(path: &Path, ledger: &BTreeSet<PathBuf>) -> bool {
    ledger
        .range(path.to_path_buf()..)
        .next()
        .is_some_and(|written| written.starts_with(path))
}

/// Remove a file or a symbolic link. Windows unlinks directory links with
/// `remove_dir`.
fn remove_entry(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(err) if path.is_dir() => std::fs::remove_dir(path).map_err(|_| err),
        other => other,
    }
}

fn has_entries(dir: &Path) -> Result<bool, BuildError> {
    let mut entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    Ok(entries.next().is_some())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BuildConfig) {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        fs::create_dir_all(&config.content_dir).unwrap();
        fs::create_dir_all(&config.output_dir).unwrap();
        (tmp, config)
    }

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn removes_exactly_the_unlisted_file() {
        let (_tmp, config) = setup();
        let kept = config.output_dir.join("kept.html");
        let orphan = config.output_dir.join("orphan.html");
        write(&kept);
        write(&orphan);
        let ledger = BTreeSet::from([kept.clone()]);

        let removed = reconcile(&config, &ledger, false).unwrap();
        assert_eq!(removed, vec![Removal::File(orphan.clone())]);
        assert!(kept.exists());
        assert!(!orphan.exists());
    }

    #[test]
    fn nested_directories_go_deepest_first() {
        let (_tmp, config) = setup();
        let c = config.output_dir.join("a").join("b").join("c");
        fs::create_dir_all(&c).unwrap();

        let removed = reconcile(&config, &BTreeSet::new(), false).unwrap();
        assert_eq!(
            removed,
            vec![
                Removal::Dir(c.clone()),
                Removal::Dir(config.output_dir.join("a").join("b")),
                Removal::Dir(config.output_dir.join("a")),
            ]
        );
        assert!(config.output_dir.is_dir(), "output root is never removed");
    }

    #[test]
    fn directory_with_content_counterpart_is_kept() {
        let (_tmp, config) = setup();
        write(&config.content_dir.join("blog").join("notes.txt"));
        fs::create_dir_all(config.output_dir.join("blog")).unwrap();

        let removed = reconcile(&config, &BTreeSet::new(), false).unwrap();
        assert!(removed.is_empty());
        assert!(config.output_dir.join("blog").is_dir());
    }

    #[test]
    fn directory_whose_counterpart_emptied_is_removed() {
        let (_tmp, config) = setup();
        fs::create_dir_all(config.content_dir.join("sub")).unwrap();
        let orphan = config.output_dir.join("sub").join("post2.html");
        write(&orphan);

        let removed = reconcile(&config, &BTreeSet::new(), false).unwrap();
        assert_eq!(
            removed,
            vec![
                Removal::File(orphan),
                Removal::Dir(config.output_dir.join("sub")),
            ]
        );
    }

    #[test]
    fn directory_holding_a_ledger_entry_is_kept() {
        let (_tmp, config) = setup();
        let page = config.output_dir.join("tags").join("rust.html");
        write(&page);
        let ledger = BTreeSet::from([page.clone()]);

        let removed = reconcile(&config, &ledger, false).unwrap();
        assert!(removed.is_empty());
        assert!(page.exists());
    }

    #[test]
    fn hidden_files_are_never_touched() {
        let (_tmp, config) = setup();
        let hidden = config.output_dir.join("old").join(".keep");
        write(&hidden);
        write(&config.output_dir.join(".nojekyll"));

        let removed = reconcile(&config, &BTreeSet::new(), false).unwrap();
        assert!(removed.is_empty());
        assert!(hidden.exists());
        assert!(config.output_dir.join(".nojekyll").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_unlinked_not_emptied() {
        let (_tmp, config) = setup();
        let logo = config.content_dir.join("img").join("logo.png");
        write(&logo);
        let link = config.output_dir.join("img");
        std::os::unix::fs::symlink(config.content_dir.join("img"), &link).unwrap();

        let removed = reconcile(&config, &BTreeSet::new(), false).unwrap();
        assert_eq!(removed, vec![Removal::File(link.clone())]);
        assert!(logo.exists(), "the link target must survive");
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_holding_a_ledger_entry_is_kept() {
        let (_tmp, config) = setup();
        let logo = config.content_dir.join("img").join("logo.png");
        write(&logo);
        let link = config.output_dir.join("img");
        std::os::unix::fs::symlink(config.content_dir.join("img"), &link).unwrap();
        let ledger = BTreeSet::from([link.join("logo.png")]);

        let removed = reconcile(&config, &ledger, false).unwrap();
        assert!(removed.is_empty(), "got: {removed:?}");
        assert!(link.join("logo.png").exists());
    }

    #[test]
    fn ledger_lookup_matches_descendants_only() {
        let ledger = BTreeSet::from([PathBuf::from("/out/img/logo.png"), PathBuf::from("/out/img2")]);
        assert!(in_ledger(Path::new("/out/img"), &ledger));
        assert!(in_ledger(Path::new("/out/img2"), &ledger));
        assert!(!in_ledger(Path::new("/out/im"), &ledger));
        assert!(!in_ledger(Path::new("/out/img/logo"), &ledger));
    }

    #[test]
    fn dry_run_reports_without_deleting() {
        let (_tmp, config) = setup();
        let orphan = config.output_dir.join("gone").join("page.html");
        write(&orphan);

        let removed = reconcile(&config, &BTreeSet::new(), true).unwrap();
        assert_eq!(
            removed,
            vec![
                Removal::File(orphan.clone()),
                Removal::Dir(config.output_dir.join("gone")),
            ]
        );
        assert!(orphan.exists());
    }

    #[test]
    fn missing_output_root_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        assert!(reconcile(&config, &BTreeSet::new(), false).unwrap().is_empty());
    }
}
