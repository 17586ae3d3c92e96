//! Template context: serializable rendering payload built from one
//! [`ContentItem`] and the [`SiteContext`] it belongs to.
//!
//! Shape seen by templates:
//!
//! ```text
//! site.name, site.url
//! page.title, page.url, page.body, page.date, page.date_formatted,
//! page.tags, page.category, page.tag_files, page.metadata, page.template
//! pages[]      every listed page (title, url, template, date, tags, category)
//! extra        generator data (`posts`, `tag`, `tags`, ...)
//! meta.strata_version
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use strata_core::{ContentItem, Metadata, PageSummary, SiteContext};

use crate::error::RenderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub site: SiteCtx,
    pub page: PageCtx,
    /// Every non-hidden source-backed page, in scan order.
    pub pages: Vec<PageSummary>,
    /// Generator-specific data; `null` for source-backed items.
    pub extra: serde_json::Value,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteCtx {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCtx {
    pub title: String,
    pub url: String,
    pub template: String,
    /// Rendered HTML body.
    pub body: String,
    pub date: Option<NaiveDateTime>,
    /// `date` formatted with the configured `date_format`.
    pub date_formatted: Option<String>,
    pub tags: Vec<String>,
    pub category: Vec<String>,
    pub tag_files: BTreeMap<String, String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub strata_version: String,
}

impl TemplateContext {
    /// Build the context for `item`, taking site-wide data from `site`.
    pub fn for_item(item: &ContentItem, site: &SiteContext) -> Self {
        let config = site.config();
        let summary = item.summary();
        TemplateContext {
            site: SiteCtx {
                name: config.site_name.clone(),
                url: config.site_url.clone(),
            },
            page: PageCtx {
                title: item.title.clone(),
                url: item.url.clone(),
                template: item.template.clone(),
                body: item.rendered_body.clone(),
                date: item.date,
                date_formatted: item
                    .date
                    .map(|d| d.format(&config.date_format).to_string()),
                tags: item.tags.clone(),
                category: summary.category,
                tag_files: item.tag_files.clone(),
                metadata: item.metadata.clone(),
            },
            pages: site
                .sources()
                .filter(|i| !i.hidden)
                .map(ContentItem::summary)
                .collect(),
            extra: item.extra.clone(),
            meta: MetaCtx {
                strata_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use strata_core::{BuildConfig, MetaValue};
    use tempfile::TempDir;

    fn site() -> (TempDir, SiteContext) {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        let mut site = SiteContext::new(config.clone());
        for (name, hidden) in [("visible", false), ("secret", true)] {
            let mut item = ContentItem::generated(
                &config,
                name,
                "post",
                config.output_dir.join(format!("{name}.html")),
            );
            item.source_path = Some(config.content_dir.join(format!("{name}.md")));
            item.hidden = hidden;
            item.date = NaiveDate::from_ymd_opt(2014, 5, 1).and_then(|d| d.and_hms_opt(9, 30, 0));
            item.metadata
                .insert("category".into(), MetaValue::from(vec!["blog".to_string()]));
            site.push(item).unwrap();
        }
        (tmp, site)
    }

    #[test]
    fn context_fields_populated() {
        let (_tmp, site) = site();
        let ctx = TemplateContext::for_item(&site.items()[0], &site);
        assert_eq!(ctx.site.name, "Spam");
        assert_eq!(ctx.page.title, "visible");
        assert_eq!(ctx.page.url, "http://localhost/visible.html");
        assert_eq!(ctx.page.category, vec!["blog".to_string()]);
        assert_eq!(ctx.page.date_formatted.as_deref(), Some("2014-05-01 09:30"));
        assert_eq!(ctx.pages.len(), 1, "hidden pages are not listed");
        assert!(ctx.extra.is_null());
    }

    #[test]
    fn to_tera_context_succeeds() {
        let (_tmp, site) = site();
        let ctx = TemplateContext::for_item(&site.items()[1], &site);
        let tera_ctx = ctx.to_tera_context().expect("context conversion");
        assert!(tera_ctx.contains_key("page"));
        assert!(tera_ctx.contains_key("extra"));
    }
}
