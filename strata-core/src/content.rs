//! Content source parsing.
//!
//! A source file starts with a metadata block of `Key: value` lines. Lines
//! indented by four or more spaces continue the previous value. The block
//! ends at the first blank line and everything after it is the Markdown
//! body:
//!
//! ```text
//! Title: Foo
//! Template: post
//! Tags: rust, web
//!     static sites
//!
//! Body text in *Markdown*.
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::config::BuildConfig;
use crate::error::{io_err, ContentError};
use crate::markdown;
use crate::types::{ContentItem, MetaValue, Metadata};

/// Split `input` into its metadata block and body.
///
/// Returns `None` when the first line is not a metadata line.
pub fn split_metadata(input: &str) -> Option<(Metadata, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut metadata = Metadata::new();
    let mut last_key: Option<String> = None;
    let mut offset = 0;

    for line in input.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            offset += line.len();
            break;
        }
        if let Some((key, value)) = meta_line(content) {
            metadata.insert(key.clone(), MetaValue::Text(value.to_string()));
            last_key = Some(key);
        } else if let (Some(key), true) = (&last_key, content.starts_with("    ")) {
            if let Some(MetaValue::Text(existing)) = metadata.get_mut(key) {
                existing.push('\n');
                existing.push_str(content.trim());
            }
        } else if last_key.is_none() {
            return None;
        } else {
            // First non-metadata line ends the block without a blank line.
            break;
        }
        offset += line.len();
    }

    if metadata.is_empty() {
        return None;
    }
    Some((metadata, &input[offset..]))
}

fn meta_line(line: &str) -> Option<(String, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let (key, value) = line[indent..].split_once(':')?;
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some((key.to_ascii_lowercase(), value.trim()))
}

/// Read and parse a single source file into a [`ContentItem`].
///
/// The item's destination and URL are derived from `source` and `config`.
/// Metadata parsers and content filters have not run yet.
pub fn load_item(source: &Path, config: &BuildConfig) -> Result<ContentItem, ContentError> {
    tracing::debug!("reading content from {}", source.display());
    let input = std::fs::read_to_string(source).map_err(|e| io_err(source, e))?;
    parse_item(source, &input, config)
}

/// Parse already-read source text. See [`load_item`].
pub fn parse_item(
    source: &Path,
    input: &str,
    config: &BuildConfig,
) -> Result<ContentItem, ContentError> {
    let (metadata, body) = split_metadata(input).ok_or_else(|| ContentError::MissingMetadata {
        path: source.to_path_buf(),
    })?;

    let template = text(&metadata, "template")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ContentError::MissingField {
            path: source.to_path_buf(),
            field: "template",
        })?
        .to_string();

    let title = match text(&metadata, "title") {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let date = match text(&metadata, "date") {
        Some(value) => Some(parse_date(source, value, &config.date_format)?),
        None => None,
    };

    let tags = text(&metadata, "tags").map(split_tags).unwrap_or_default();
    let hidden = text(&metadata, "hidden")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1"))
        .unwrap_or(false);

    let destination = config.destination_for(source)?;
    let url = config.url_for(&destination).unwrap_or_default();

    Ok(ContentItem {
        source_path: Some(source.to_path_buf()),
        destination_path: Some(destination),
        url,
        title,
        template,
        date,
        tags,
        hidden,
        metadata,
        tag_files: BTreeMap::new(),
        rendered_body: markdown::to_html(body),
        rendered_page: None,
        updated: false,
        extra: serde_json::Value::Null,
    })
}

fn text<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(MetaValue::as_text)
}

fn parse_date(source: &Path, value: &str, format: &str) -> Result<NaiveDateTime, ContentError> {
    NaiveDateTime::parse_from_str(value, format).map_err(|e| ContentError::InvalidDate {
        path: source.to_path_buf(),
        value: value.to_string(),
        format: format.to_string(),
        source: e,
    })
}

/// Comma-separated tags, trimmed and lowercased; empty entries dropped.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
