//! `blog-index` generator.
//!
//! Appends `index.<output_extension>` at the output root, rendered with the
//! `index` template. Its `extra.posts` holds every non-hidden `post`, newest
//! first.

use serde_json::json;

use strata_core::{ContentItem, PageSummary, SiteContext};

use crate::error::PluginError;
use crate::Generator;

/// Template listed posts must use.
pub const POST_TEMPLATE: &str = "post";

#[derive(Debug, Clone, Copy, Default)]
pub struct BlogIndex;

impl Generator for BlogIndex {
    fn run(&self, site: &mut SiteContext) -> Result<(), PluginError> {
        let item = {
            let config = site.config();
            let posts: Vec<PageSummary> = site
                .listed(POST_TEMPLATE)
                .into_iter()
                .map(ContentItem::summary)
                .collect();
            let destination = config
                .output_dir
                .join(format!("index.{}", config.output_extension));
            let mut item = ContentItem::generated(config, "index", "index", destination);
            item.extra = json!({ "posts": posts });
            item
        };
        tracing::debug!("autogenerated {}", item.label());
        site.push(item)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use strata_core::{BuildConfig, ContentError};
    use tempfile::TempDir;

    fn post(config: &BuildConfig, name: &str, day: u32, hidden: bool) -> ContentItem {
        let mut item = ContentItem::generated(
            config,
            name,
            POST_TEMPLATE,
            config.output_dir.join(format!("{name}.html")),
        );
        item.source_path = Some(config.content_dir.join(format!("{name}.md")));
        item.date = NaiveDate::from_ymd_opt(2014, 5, day).and_then(|d| d.and_hms_opt(0, 0, 0));
        item.hidden = hidden;
        item
    }

    #[test]
    fn appends_index_listing_visible_posts_newest_first() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        let mut site = SiteContext::new(config.clone());
        site.push(post(&config, "first", 1, false)).unwrap();
        site.push(post(&config, "second", 2, false)).unwrap();
        site.push(post(&config, "draft", 3, true)).unwrap();

        BlogIndex.run(&mut site).expect("run");

        let index = site.items().last().expect("index item");
        assert!(index.is_generated());
        assert_eq!(index.template, "index");
        assert_eq!(
            index.destination_path,
            Some(config.output_dir.join("index.html"))
        );
        let titles: Vec<_> = index.extra["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn collides_with_a_real_index_page() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        let mut site = SiteContext::new(config.clone());
        let mut real = post(&config, "index", 1, false);
        real.template = "page".into();
        site.push(real).unwrap();

        let err = BlogIndex.run(&mut site).unwrap_err();
        assert!(matches!(
            err,
            PluginError::Content(ContentError::DestinationCollision { .. })
        ));
    }
}
