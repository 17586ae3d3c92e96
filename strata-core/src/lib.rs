//! strata core library: domain types, configuration, content parsing and
//! file enumeration.
//!
//! - [`types`]: [`ContentItem`], [`SiteContext`] and metadata values
//! - [`config`]: [`BuildConfig`] loaded from `strata.yaml`
//! - [`content`]: metadata block + Markdown source parsing
//! - [`enumerate`]: recursive file and directory listing
//! - [`error`]: [`ConfigError`], [`ContentError`], [`WalkError`]

pub mod config;
pub mod content;
pub mod enumerate;
pub mod error;
pub mod markdown;
pub mod types;

pub use config::{BuildConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, ContentError, WalkError};
pub use types::{ContentItem, MetaValue, Metadata, PageSummary, SiteContext};
