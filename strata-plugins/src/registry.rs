//! Plug-in kinds and the [`PluginRegistry`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use strata_core::{BuildConfig, ContentItem, Metadata, SiteContext};

use crate::blog_index::BlogIndex;
use crate::category::CategoryParser;
use crate::error::PluginError;
use crate::local_url::LocalUrl;
use crate::tag_cloud::TagCloud;
use crate::{ContentFilter, Generator, MetaParser};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Every available metadata parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaParserKind {
    Category,
}

/// Every available content filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFilterKind {
    LocalUrl,
}

/// Every available generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    BlogIndex,
    TagCloud,
}

impl MetaParserKind {
    pub fn all() -> &'static [MetaParserKind] {
        &[MetaParserKind::Category]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MetaParserKind::Category => "category",
        }
    }
}

impl ContentFilterKind {
    pub fn all() -> &'static [ContentFilterKind] {
        &[ContentFilterKind::LocalUrl]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContentFilterKind::LocalUrl => "local-url",
        }
    }
}

impl GeneratorKind {
    pub fn all() -> &'static [GeneratorKind] {
        &[GeneratorKind::BlogIndex, GeneratorKind::TagCloud]
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::BlogIndex => "blog-index",
            GeneratorKind::TagCloud => "tag-cloud",
        }
    }
}

/// Case-insensitive lookup that also accepts the CamelCase class names
/// older configurations used (`TagCloudGenerator`, `LocalURL`, ...).
fn lookup<T: Copy>(
    kind: &'static str,
    name: &str,
    all: &[T],
    name_of: fn(&T) -> &'static str,
    aliases: &[(&str, T)],
) -> Result<T, PluginError> {
    let wanted = name.trim().to_ascii_lowercase();
    if let Some(found) = all.iter().find(|k| name_of(k) == wanted) {
        return Ok(*found);
    }
    if let Some((_, found)) = aliases.iter().find(|(alias, _)| alias.to_ascii_lowercase() == wanted) {
        return Ok(*found);
    }
    Err(PluginError::Unknown {
        kind,
        name: name.to_string(),
        expected: all.iter().map(name_of).collect::<Vec<_>>().join(", "),
    })
}

impl FromStr for MetaParserKind {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            "metadata parser",
            s,
            Self::all(),
            Self::name,
            &[("CategoryMetaParser", MetaParserKind::Category)],
        )
    }
}

impl FromStr for ContentFilterKind {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            "content filter",
            s,
            Self::all(),
            Self::name,
            &[("LocalURL", ContentFilterKind::LocalUrl)],
        )
    }
}

impl FromStr for GeneratorKind {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            "generator",
            s,
            Self::all(),
            Self::name,
            &[
                ("BlogIndexGenerator", GeneratorKind::BlogIndex),
                ("TagCloudGenerator", GeneratorKind::TagCloud),
            ],
        )
    }
}

impl fmt::Display for MetaParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl fmt::Display for ContentFilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl MetaParser for MetaParserKind {
    fn parse(&self, source: &Path, config: &BuildConfig) -> Result<Metadata, PluginError> {
        match self {
            MetaParserKind::Category => CategoryParser.parse(source, config),
        }
    }
}

impl ContentFilter for ContentFilterKind {
    fn filter(&self, item: &ContentItem) -> Result<String, PluginError> {
        match self {
            ContentFilterKind::LocalUrl => LocalUrl.filter(item),
        }
    }
}

impl Generator for GeneratorKind {
    fn run(&self, site: &mut SiteContext) -> Result<(), PluginError> {
        match self {
            GeneratorKind::BlogIndex => BlogIndex.run(site),
            GeneratorKind::TagCloud => TagCloud.run(site),
        }
    }
}

// ---------------------------------------------------------------------------
// PluginRegistry
// ---------------------------------------------------------------------------

/// Ordered, enabled plug-ins. Built once at startup and passed to the
/// stages that need it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRegistry {
    pub meta_parsers: Vec<MetaParserKind>,
    pub content_filters: Vec<ContentFilterKind>,
    pub generators: Vec<GeneratorKind>,
}

impl PluginRegistry {
    /// Resolve the plug-in names listed in `config`, keeping their order.
    pub fn from_config(config: &BuildConfig) -> Result<Self, PluginError> {
        Ok(PluginRegistry {
            meta_parsers: parse_all(&config.meta_parsers)?,
            content_filters: parse_all(&config.content_filters)?,
            generators: parse_all(&config.generators)?,
        })
    }

    /// Run every metadata parser (merging results into the item's metadata)
    /// and then every content filter on one source-backed item.
    pub fn process_item(
        &self,
        item: &mut ContentItem,
        config: &BuildConfig,
    ) -> Result<(), PluginError> {
        if let Some(source) = item.source_path.clone() {
            for parser in &self.meta_parsers {
                tracing::debug!("running metadata parser {parser} on {}", source.display());
                item.metadata.extend(parser.parse(&source, config)?);
            }
        }
        for filter in &self.content_filters {
            tracing::debug!("running content filter {filter} on {}", item.label());
            item.rendered_body = filter.filter(item)?;
        }
        Ok(())
    }

    /// Run every generator in configured order.
    pub fn run_generators(&self, site: &mut SiteContext) -> Result<(), PluginError> {
        for generator in &self.generators {
            let before = site.len();
            generator.run(site)?;
            tracing::debug!("generator {generator} appended {} item(s)", site.len() - before);
        }
        Ok(())
    }
}

fn parse_all<T: FromStr<Err = PluginError>>(names: &[String]) -> Result<Vec<T>, PluginError> {
    names.iter().map(|n| n.parse()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
