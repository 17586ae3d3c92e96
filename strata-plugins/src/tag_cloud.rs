//! `tag-cloud` generator.
//!
//! For every tag used by a non-hidden `post` it appends a tag index page
//! (`tag_<tag>_index.<ext>`, template `tag`), records that page's URL in
//! each post's `tag_files`, and finally appends `tagcloud.<ext>` (template
//! `tagcloud`) with a weight in `1..=10` per tag.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use strata_core::{ContentItem, PageSummary, SiteContext};

use crate::blog_index::POST_TEMPLATE;
use crate::error::PluginError;
use crate::Generator;

const MAX_WEIGHT: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct TagCloud;

/// Per-tag entry exposed to the `tagcloud` template.
#[derive(Debug, Clone, Serialize)]
struct TagEntry {
    count: usize,
    weight: usize,
    url: String,
}

/// `tag_<tag>_index.<ext>` with spaces → `_` and `/` → `-`.
pub fn tag_file_name(tag: &str, extension: &str) -> String {
    format!(
        "tag_{}_index.{extension}",
        tag.replace(' ', "_").replace('/', "-")
    )
}

/// Scale `count` against the most used tag into `1..=MAX_WEIGHT`.
fn weight(count: usize, max: usize) -> usize {
    (count * MAX_WEIGHT / max.max(1)).clamp(1, MAX_WEIGHT)
}

impl Generator for TagCloud {
    fn run(&self, site: &mut SiteContext) -> Result<(), PluginError> {
        let config = site.config().clone();

        let mut posts_by_tag: BTreeMap<String, Vec<PageSummary>> = BTreeMap::new();
        for post in site.listed(POST_TEMPLATE) {
            for tag in &post.tags {
                posts_by_tag
                    .entry(tag.clone())
                    .or_default()
                    .push(post.summary());
            }
        }
        let max = posts_by_tag.values().map(Vec::len).max().unwrap_or(1);
        tracing::debug!("{} tag(s), most used tag used {max} time(s)", posts_by_tag.len());

        let mut entries: BTreeMap<String, TagEntry> = BTreeMap::new();
        for (tag, posts) in posts_by_tag {
            let destination = config
                .output_dir
                .join(tag_file_name(&tag, &config.output_extension));
            let mut index = ContentItem::generated(
                &config,
                format!("Tag index: {tag}"),
                "tag",
                destination,
            );
            index.extra = json!({ "tag": tag, "posts": posts });
            entries.insert(
                tag.clone(),
                TagEntry {
                    count: posts.len(),
                    weight: weight(posts.len(), max),
                    url: index.url.clone(),
                },
            );
            site.push(index)?;
        }

        for item in site.items_mut() {
            if item.is_generated() || item.hidden || item.template != POST_TEMPLATE {
                continue;
            }
            item.tag_files = item
                .tags
                .iter()
                .filter_map(|tag| entries.get(tag).map(|e| (tag.clone(), e.url.clone())))
                .collect();
        }

        let tag_names: Vec<&String> = entries.keys().collect();
        let mut cloud = ContentItem::generated(
            &config,
            "Tag cloud",
            "tagcloud",
            config
                .output_dir
                .join(format!("tagcloud.{}", config.output_extension)),
        );
        cloud.extra = json!({ "tags": entries, "tag_names": tag_names });
        site.push(cloud)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strata_core::BuildConfig;
    use tempfile::TempDir;

    fn post(config: &BuildConfig, name: &str, tags: &[&str]) -> ContentItem {
        let mut item = ContentItem::generated(
            config,
            name,
            POST_TEMPLATE,
            config.output_dir.join(format!("{name}.html")),
        );
        item.source_path = Some(config.content_dir.join(format!("{name}.md")));
        item.tags = tags.iter().map(|t| t.to_string()).collect();
        item
    }

    #[rstest]
    #[case(1, 1, 10)]
    #[case(1, 2, 5)]
    #[case(3, 4, 7)]
    #[case(1, 50, 1)]
    fn weights_are_scaled_into_range(
        #[case] count: usize,
        #[case] max: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(weight(count, max), expected);
    }

    #[rstest]
    #[case("rust", "tag_rust_index.html")]
    #[case("static sites", "tag_static_sites_index.html")]
    #[case("ci/cd", "tag_ci-cd_index.html")]
    fn tag_file_names(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(tag_file_name(tag, "html"), expected);
    }

    #[test]
    fn appends_tag_indexes_then_cloud_and_links_posts() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        let mut site = SiteContext::new(config.clone());
        site.push(post(&config, "a", &["rust", "web"])).unwrap();
        site.push(post(&config, "b", &["rust"])).unwrap();
        let mut hidden = post(&config, "c", &["secret"]);
        hidden.hidden = true;
        site.push(hidden).unwrap();

        TagCloud.run(&mut site).expect("run");

        let titles: Vec<_> = site.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["a", "b", "c", "Tag index: rust", "Tag index: web", "Tag cloud"]
        );

        let a = &site.items()[0];
        assert_eq!(
            a.tag_files.get("rust").map(String::as_str),
            Some("http://localhost/tag_rust_index.html")
        );
        assert_eq!(a.tag_files.len(), 2);
        assert!(site.items()[2].tag_files.is_empty(), "hidden posts are not linked");

        let cloud = site.items().last().unwrap();
        assert_eq!(cloud.template, "tagcloud");
        assert_eq!(cloud.extra["tags"]["rust"]["weight"], 10);
        assert_eq!(cloud.extra["tags"]["web"]["weight"], 5);
        assert_eq!(cloud.extra["tag_names"], json!(["rust", "web"]));
    }

    #[test]
    fn no_tags_still_produces_an_empty_cloud() {
        let tmp = TempDir::new().unwrap();
        let config = BuildConfig::defaults_at(tmp.path()).unwrap();
        let mut site = SiteContext::new(config.clone());
        site.push(post(&config, "a", &[])).unwrap();

        TagCloud.run(&mut site).expect("run");
        assert_eq!(site.len(), 2);
        assert_eq!(site.items()[1].extra["tag_names"], json!([]));
    }
}
