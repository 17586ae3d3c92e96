//! # strata-plugins
//!
//! Typed plug-ins selected by name from `strata.yaml`:
//!
//! | Config name  | Kind            | Effect                                         |
//! |--------------|-----------------|------------------------------------------------|
//! | `category`   | metadata parser | `category` list from the source directory      |
//! | `local-url`  | content filter  | expands `$LOCALURL` in the rendered body       |
//! | `blog-index` | generator       | appends `index.html` listing every post        |
//! | `tag-cloud`  | generator       | appends per-tag index pages and `tagcloud.html`|
//!
//! Names are resolved once by [`PluginRegistry::from_config`]; an unknown
//! name is a hard error.

pub mod blog_index;
pub mod category;
pub mod error;
pub mod local_url;
pub mod registry;
pub mod tag_cloud;

use std::path::Path;

use strata_core::{BuildConfig, ContentItem, Metadata, SiteContext};

pub use error::PluginError;
pub use registry::{ContentFilterKind, GeneratorKind, MetaParserKind, PluginRegistry};

/// Extracts extra metadata for a source file.
pub trait MetaParser {
    fn parse(&self, source: &Path, config: &BuildConfig) -> Result<Metadata, PluginError>;
}

/// Rewrites an item's rendered body. Runs after Markdown conversion.
pub trait ContentFilter {
    fn filter(&self, item: &ContentItem) -> Result<String, PluginError>;
}

/// Appends synthetic items to the site. Runs after every source is loaded
/// and before staleness evaluation.
pub trait Generator {
    fn run(&self, site: &mut SiteContext) -> Result<(), PluginError>;
}
