//! `category` metadata parser.
//!
//! Each directory between the content root and a source file becomes a
//! category. The innermost directory is treated differently:
//!
//! - several content files below it → it is a category too;
//! - a single content file → the directory names that piece of content and
//!   is dropped.

use std::path::{Component, Path};

use strata_core::{enumerate, BuildConfig, ContentError, MetaValue, Metadata};

use crate::error::PluginError;
use crate::MetaParser;

/// Reserved metadata key written by this parser.
pub const CATEGORY_KEY: &str = "category";

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryParser;

impl MetaParser for CategoryParser {
    fn parse(&self, source: &Path, config: &BuildConfig) -> Result<Metadata, PluginError> {
        let relative = source
            .strip_prefix(&config.content_dir)
            .map_err(|_| ContentError::OutsideContentRoot {
                path: source.to_path_buf(),
                root: config.content_dir.clone(),
            })?;

        let mut categories: Vec<String> = relative
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(dir) = source.parent() {
            let siblings = enumerate::list_files(dir, &config.content_pattern())?;
            if siblings.len() <= 1 {
                categories.pop();
            }
        }

        tracing::debug!("categories for {}: {:?}", source.display(), categories);
        let mut metadata = Metadata::new();
        metadata.insert(CATEGORY_KEY.to_string(), MetaValue::List(categories));
        Ok(metadata)
    }
}
