//! # strata-renderer
//!
//! Tera-based template engine that turns a [`ContentItem`] into its final
//! page.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use strata_renderer::TemplateEngine;
//! use strata_core::SiteContext;
//!
//! fn render_all(site: &SiteContext) {
//!     if let Ok(engine) = TemplateEngine::new(&site.config().template_dir) {
//!         for item in site.items() {
//!             if let Ok(page) = engine.render_item(item, site) {
//!                 println!("{}: {} bytes", item.label(), page.len());
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! [`ContentItem`]: strata_core::ContentItem

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{resolve_template_name, TemplateEngine};
pub use error::RenderError;
