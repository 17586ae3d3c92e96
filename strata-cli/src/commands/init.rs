//! `strata init [PATH]`: scaffold a buildable site.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use strata_core::CONFIG_FILE_NAME;

const CONFIG: &str = "\
site_name: My Site
site_url: http://localhost
generators: [blog-index]
";

const SAMPLE_POST: &str = "\
Title: Hello, world
Template: post
Date: 2024-01-01 09:00
Tags: welcome

This site was generated by **strata**. Edit `content/hello-world.md` and run
`strata build` again: only the pages that changed are rewritten.
";

const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>{{ page.title }} | {{ site.name }}</title></head>
<body>
{% block content %}{% endblock content %}
</body>
</html>
"#;

const POST_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}
<h1>{{ page.title }}</h1>
{% if page.date_formatted %}<p>{{ page.date_formatted }}</p>{% endif %}
{{ page.body }}
<p><a href="{{ site.url }}/index.html">All posts</a></p>
{% endblock content %}
"#;

const INDEX_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}
<h1>{{ site.name }}</h1>
<ul>
{% for post in extra.posts %}  <li><a href="{{ post.url }}">{{ post.title }}</a></li>
{% endfor %}</ul>
{% endblock content %}
"#;

/// Scaffold a new site. Existing files are left alone.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Site directory (created when missing).
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("cannot create '{}'", self.path.display()))?;

        let files: [(&str, &str); 5] = [
            (CONFIG_FILE_NAME, CONFIG),
            ("content/hello-world.md", SAMPLE_POST),
            ("templates/base.html", BASE_TEMPLATE),
            ("templates/post.html", POST_TEMPLATE),
            ("templates/index.html", INDEX_TEMPLATE),
        ];
        for (relative, contents) in files {
            let path = self.path.join(relative);
            if scaffold(&path, contents)? {
                println!("✓ created {relative}");
            } else {
                println!("· {relative} exists, left unchanged");
            }
        }
        println!("Run 'strata build' in {} to render the site.", self.path.display());
        Ok(())
    }
}

/// Write `contents` to `path` unless it exists. Returns whether it wrote.
fn scaffold(path: &Path, contents: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("cannot write '{}'", path.display()))?;
    tracing::debug!("scaffolded {}", path.display());
    Ok(true)
}
