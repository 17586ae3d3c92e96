//! Domain types: content items, the site context and metadata values.
//!
//! All path fields use `PathBuf`; `None` stands in for "no source file"
//! (generated items) and "no destination yet".

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::BuildConfig;
use crate::error::ContentError;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// A single metadata value. Source files only produce [`MetaValue::Text`];
/// metadata parsers may attach lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::List(items) => Some(items),
            MetaValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => s.fmt(f),
            MetaValue::List(items) => items.join(", ").fmt(f),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_owned())
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        MetaValue::List(items)
    }
}

/// Lowercase metadata key → value.
pub type Metadata = BTreeMap<String, MetaValue>;

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// One unit of renderable output.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    /// Input file, or `None` for items synthesised by a generator.
    pub source_path: Option<PathBuf>,
    /// Where the rendered page is written. Derived from `source_path` for
    /// real items; set explicitly by generators.
    pub destination_path: Option<PathBuf>,
    /// Public URL of the rendered page.
    pub url: String,
    pub title: String,
    /// Template name relative to the template directory.
    pub template: String,
    pub date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub hidden: bool,
    pub metadata: Metadata,
    /// Tag → index page file, filled in by the tag-cloud generator.
    pub tag_files: BTreeMap<String, String>,
    /// Body after Markdown conversion and content filters.
    pub rendered_body: String,
    /// Final page after template application.
    pub rendered_page: Option<String>,
    /// Must this item be (re)written this run?
    pub updated: bool,
    /// Generator-specific template data.
    pub extra: serde_json::Value,
}

impl ContentItem {
    /// An item synthesised by a generator, writing to `destination`.
    pub fn generated(
        config: &BuildConfig,
        title: impl Into<String>,
        template: impl Into<String>,
        destination: PathBuf,
    ) -> Self {
        ContentItem {
            source_path: None,
            url: config.url_for(&destination).unwrap_or_default(),
            destination_path: Some(destination),
            title: title.into(),
            template: template.into(),
            date: None,
            tags: vec![],
            hidden: false,
            metadata: Metadata::new(),
            tag_files: BTreeMap::new(),
            rendered_body: String::new(),
            rendered_page: None,
            updated: false,
            extra: serde_json::Value::Null,
        }
    }

    /// `true` for items not backed by a source file.
    pub fn is_generated(&self) -> bool {
        self.source_path.is_none()
    }

    /// Human-readable label for logs and errors.
    pub fn label(&self) -> String {
        match (&self.source_path, &self.destination_path) {
            (Some(source), _) => source.display().to_string(),
            (None, Some(dest)) => format!("<generated {}>", dest.display()),
            (None, None) => format!("<generated '{}'>", self.title),
        }
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            title: self.title.clone(),
            url: self.url.clone(),
            template: self.template.clone(),
            date: self.date,
            tags: self.tags.clone(),
            category: self
                .metadata
                .get("category")
                .and_then(MetaValue::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

/// Listing-friendly view of an item, used by index-style templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub title: String,
    pub url: String,
    pub template: String,
    pub date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub category: Vec<String>,
}

// ---------------------------------------------------------------------------
// SiteContext
// ---------------------------------------------------------------------------

/// The whole-site aggregate: configuration plus items in insertion order
/// (real content first, then generator output).
///
/// Items can be appended and mutated in place but never removed or
/// reordered. Two items may not share a destination.
#[derive(Debug, Clone)]
pub struct SiteContext {
    config: BuildConfig,
    items: Vec<ContentItem>,
    claimed: HashSet<PathBuf>,
}

impl SiteContext {
    pub fn new(config: BuildConfig) -> Self {
        SiteContext {
            config,
            items: Vec::new(),
            claimed: HashSet::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Append an item. Fails if its destination is already claimed.
    pub fn push(&mut self, item: ContentItem) -> Result<(), ContentError> {
        if let Some(dest) = &item.destination_path {
            if !self.claimed.insert(dest.clone()) {
                return Err(ContentError::DestinationCollision { path: dest.clone() });
            }
        }
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Mutable access without the ability to reorder or remove.
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ContentItem> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items backed by a source file.
    pub fn sources(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|i| !i.is_generated())
    }

    /// Non-hidden items using `template`, newest first (undated last).
    pub fn listed(&self, template: &str) -> Vec<&ContentItem> {
        let mut listed: Vec<&ContentItem> = self
            .items
            .iter()
            .filter(|i| !i.is_generated() && !i.hidden && i.template == template)
            .collect();
        listed.sort_by(|a, b| b.date.cmp(&a.date));
        listed
    }

    pub fn contains_destination(&self, path: &Path) -> bool {
        self.claimed.contains(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
