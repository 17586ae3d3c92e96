//! Recursive file and directory listing.
//!
//! Both listings skip every entry whose name starts with a dot (and do not
//! descend into such directories), never include the root itself, and return
//! paths in a deterministic order: a depth-first walk with siblings sorted by
//! file name.
//!
//! [`list_files`] and [`list_dirs`] follow symbolic links, which suits the
//! content and template trees. The `_no_follow` variants are for trees the
//! caller deletes from: a link is one entry, reported by
//! [`list_files_no_follow`] whatever it points to, and never descended into.
//!
//! # Patterns
//!
//! | Pattern   | Matches                                   |
//! |-----------|-------------------------------------------|
//! | `.*`, `*` | every file                                |
//! | `.md`     | suffix form: file names ending in `.md`  |
//! | `*.md`    | any shell-style glob against the file name|

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::error::WalkError;

/// Pattern that matches every file.
pub const ALL_FILES: &str = ".*";

/// List every file below `root` whose name matches `pattern`.
pub fn list_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, WalkError> {
    collect_files(root, pattern, true)
}

/// List every file and symbolic link below `root` whose name matches
/// `pattern`, without following links.
pub fn list_files_no_follow(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, WalkError> {
    collect_files(root, pattern, false)
}

/// List every directory below `root` (not just leaves), parents before
/// children.
pub fn list_dirs(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    collect_dirs(root, true)
}

/// [`list_dirs`] without following links. A link to a directory is not a
/// directory here.
pub fn list_dirs_no_follow(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    collect_dirs(root, false)
}

fn collect_files(root: &Path, pattern: &str, follow: bool) -> Result<Vec<PathBuf>, WalkError> {
    let matcher = compile(pattern)?;
    let mut files = Vec::new();
    for entry in walk(root, follow) {
        let entry = entry.map_err(|e| walk_err(root, e))?;
        let file_type = entry.file_type();
        if !(file_type.is_file() || file_type.is_symlink()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matcher.as_ref().map_or(true, |p| p.matches(&name)) {
            tracing::trace!("found: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn collect_dirs(root: &Path, follow: bool) -> Result<Vec<PathBuf>, WalkError> {
    let mut dirs = Vec::new();
    for entry in walk(root, follow) {
        let entry = entry.map_err(|e| walk_err(root, e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Newest modification time of any file below `root`, `None` when there
/// are no files.
pub fn newest_mtime(root: &Path) -> Result<Option<std::time::SystemTime>, WalkError> {
    let mut newest = None;
    for path in list_files(root, ALL_FILES)? {
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|source| WalkError::Io {
                path: path.clone(),
                source,
            })?;
        if newest.map_or(true, |n| modified > n) {
            newest = Some(modified);
        }
    }
    Ok(newest)
}

fn walk(root: &Path, follow: bool) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow)
        .sort_by_file_name()
        .into_iter()
        // The root is exempt: temp directories are often dot-prefixed.
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn compile(pattern: &str) -> Result<Option<Pattern>, WalkError> {
    let glob = match pattern {
        "" | "*" | ALL_FILES => return Ok(None),
        suffix if suffix.starts_with('.') => format!("*{suffix}"),
        other => other.to_string(),
    };
    Pattern::new(&glob)
        .map(Some)
        .map_err(|source| WalkError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn walk_err(root: &Path, err: walkdir::Error) -> WalkError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    WalkError::Io {
        path,
        source: err.into(),
    }
}
