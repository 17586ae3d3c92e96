//! `local-url` content filter.
//!
//! Replaces `$LOCALURL` (or `${LOCALURL}`) with the URL of the directory the
//! current page lives in. With this filter enabled every literal `$` in a
//! body must be written `$$`.

use strata_core::ContentItem;

use crate::error::PluginError;
use crate::ContentFilter;

const PLACEHOLDER: &str = "LOCALURL";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalUrl;

impl ContentFilter for LocalUrl {
    fn filter(&self, item: &ContentItem) -> Result<String, PluginError> {
        let local = local_url(&item.url);
        tracing::debug!("local URL for {}: {local}", item.label());
        substitute(&item.rendered_body, local, &item.label())
    }
}

/// Directory part of a page URL.
fn local_url(url: &str) -> &str {
    url.rsplit_once('/').map_or("", |(dir, _)| dir)
}

fn substitute(body: &str, local: &str, label: &str) -> Result<String, PluginError> {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    let mut consumed = 0;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let position = consumed + pos;
        let invalid = move || PluginError::InvalidPlaceholder {
            item: label.to_string(),
            position,
        };

        let (name, used) = if after.starts_with('$') {
            out.push('$');
            consumed = position + 2;
            rest = &after[1..];
            continue;
        } else if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(invalid)?;
            (&braced[..end], end + 2)
        } else {
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..len], len)
        };

        if !is_identifier(name) {
            return Err(invalid());
        }
        if name != PLACEHOLDER {
            return Err(PluginError::UnknownPlaceholder {
                item: label.to_string(),
                name: name.to_string(),
            });
        }
        out.push_str(local);
        consumed = position + 1 + used;
        rest = &after[used..];
    }
    out.push_str(rest);
    Ok(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
