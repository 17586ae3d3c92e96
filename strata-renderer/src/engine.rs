//! Tera rendering engine: [`TemplateEngine`].
//!
//! Every file under the template directory is registered under its path
//! relative to that directory, with `/` separators:
//!
//! | File on disk                   | Template name      |
//! |--------------------------------|--------------------|
//! | `templates/post.html`          | `post.html`        |
//! | `templates/partials/nav.html`  | `partials/nav.html`|
//!
//! Content refers to templates by name; a name without an extension gets
//! `.html` appended (`template: post` → `post.html`).

use std::path::Path;

use tera::Tera;

use strata_core::enumerate::{self, ALL_FILES};
use strata_core::{ContentItem, SiteContext};

use crate::context::TemplateContext;
use crate::error::RenderError;

const DEFAULT_TEMPLATE_EXTENSION: &str = "html";

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Map a content `template` value to a registered template name.
pub fn resolve_template_name(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.{DEFAULT_TEMPLATE_EXTENSION}")
    }
}

fn load_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        tracing::warn!("template directory {} does not exist", dir.display());
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    for path in enumerate::list_files(dir, ALL_FILES)? {
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("loaded template {name}");
        templates.push((name, contents));
    }
    Ok(templates)
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera engine holding every template of one site.
///
/// Output is not autoescaped: page bodies are already HTML.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every file under `template_dir`. A syntax error in any template
    /// fails here, before anything is rendered.
    pub fn new(template_dir: &Path) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(load_templates(template_dir)?)?;
        Ok(TemplateEngine { tera })
    }

    /// Whether `name` (as written in content metadata) resolves to a loaded
    /// template.
    pub fn has_template(&self, name: &str) -> bool {
        let resolved = resolve_template_name(name);
        self.tera.get_template_names().any(|n| n == resolved)
    }

    /// Sorted names of every loaded template.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Render `template` with an explicit context.
    pub fn render(&self, template: &str, ctx: &TemplateContext) -> Result<String, RenderError> {
        let name = resolve_template_name(template);
        let tera_ctx = ctx.to_tera_context()?;
        self.tera.render(&name, &tera_ctx).map_err(|e| RenderError::Template {
            template: name.clone(),
            item: ctx.page.url.clone(),
            message: describe(&e),
        })
    }

    /// Render one item of `site` through its template.
    pub fn render_item(&self, item: &ContentItem, site: &SiteContext) -> Result<String, RenderError> {
        let ctx = TemplateContext::for_item(item, site);
        self.render(&item.template, &ctx).map_err(|err| match err {
            RenderError::Template {
                template, message, ..
            } => RenderError::Template {
                template,
                item: item.label(),
                message,
            },
            other => other,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
