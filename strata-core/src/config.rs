//! Build configuration loaded from `strata.yaml`.
//!
//! # Resolution
//!
//! ```text
//! <config dir>/
//!   strata.yaml
//!   <root_dir>/            (default ".")
//!     <content_dir>/       (default "content")
//!     <template_dir>/      (default "templates")
//!     <output_dir>/        (default "output")
//! ```
//!
//! Relative `root_dir` resolves against the directory holding the config file
//! (or the working directory when no file exists). The other three
//! directories resolve against `root_dir`. Every path in [`BuildConfig`] is
//! absolute and lexically normalised. The three directories may not nest
//! inside one another ([`ConfigError::OverlappingDirs`]).

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ContentError};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "strata.yaml";

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_site_name")]
    site_name: String,
    #[serde(default = "default_site_url")]
    site_url: String,
    #[serde(default = "default_root_dir")]
    root_dir: PathBuf,
    #[serde(default = "default_content_dir")]
    content_dir: PathBuf,
    #[serde(default = "default_template_dir")]
    template_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default = "default_date_format")]
    date_format: String,
    #[serde(default = "default_content_extension")]
    content_extension: String,
    #[serde(default = "default_output_extension")]
    output_extension: String,
    #[serde(default = "yes")]
    copy_static: bool,
    #[serde(default)]
    copy_sources: bool,
    #[serde(default = "yes")]
    update: bool,
    #[serde(default = "default_meta_parsers")]
    meta_parsers: Vec<String>,
    #[serde(default)]
    content_filters: Vec<String>,
    #[serde(default)]
    generators: Vec<String>,
}

fn default_site_name() -> String {
    "Spam".to_string()
}
fn default_site_url() -> String {
    "http://localhost".to_string()
}
fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}
fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}
fn default_content_extension() -> String {
    "md".to_string()
}
fn default_output_extension() -> String {
    "html".to_string()
}
fn default_meta_parsers() -> Vec<String> {
    vec!["category".to_string()]
}
fn yes() -> bool {
    true
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            site_name: default_site_name(),
            site_url: default_site_url(),
            root_dir: default_root_dir(),
            content_dir: default_content_dir(),
            template_dir: default_template_dir(),
            output_dir: default_output_dir(),
            date_format: default_date_format(),
            content_extension: default_content_extension(),
            output_extension: default_output_extension(),
            copy_static: true,
            copy_sources: false,
            // No file means no configuration timestamp to compare against.
            update: false,
            meta_parsers: default_meta_parsers(),
            content_filters: vec![],
            generators: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved build configuration, passed by reference through the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub site_name: String,
    /// Base URL without a trailing slash.
    pub site_url: String,
    pub root_dir: PathBuf,
    pub content_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `chrono` format string for the `date` metadata field.
    pub date_format: String,
    /// Extension of content sources, without the dot.
    pub content_extension: String,
    /// Extension of rendered pages, without the dot.
    pub output_extension: String,
    /// Copy non-content files from the content tree to the output tree.
    pub copy_static: bool,
    /// Also mirror the content sources themselves into the output tree.
    pub copy_sources: bool,
    /// Incremental mode. When `false` every item is rewritten.
    pub update: bool,
    pub meta_parsers: Vec<String>,
    pub content_filters: Vec<String>,
    pub generators: Vec<String>,
    /// The file this configuration was read from; `None` when running on
    /// defaults.
    pub config_file: Option<PathBuf>,
}

impl BuildConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file falls back to defaults (with a warning); an unreadable
    /// or malformed file is a [`ConfigError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = absolutize(path).map_err(ConfigError::WorkingDir)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("no {} found, using default values", path.display());
                return Self::resolve(RawConfig::default(), &base, None);
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Self::from_yaml_str(&contents, &path)
    }

    /// Parse configuration text as if it had been read from `path`.
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let path = absolutize(path).map_err(ConfigError::WorkingDir)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        // An empty file is a valid, all-defaults configuration.
        let raw: RawConfig = if contents.trim().is_empty() {
            serde_yaml::from_str("{}")
        } else {
            serde_yaml::from_str(contents)
        }
        .map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        Self::resolve(raw, &base, Some(path))
    }

    /// Pure defaults rooted at `root_dir`, with no backing config file.
    pub fn defaults_at(root_dir: &Path) -> Result<Self, ConfigError> {
        let base = absolutize(root_dir).map_err(ConfigError::WorkingDir)?;
        Self::resolve(RawConfig::default(), &base, None)
    }

    fn resolve(
        raw: RawConfig,
        base: &Path,
        config_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let root_dir = normalize(&base.join(&raw.root_dir));
        let config = BuildConfig {
            site_name: raw.site_name,
            site_url: raw.site_url.trim_end_matches('/').to_string(),
            content_dir: normalize(&root_dir.join(&raw.content_dir)),
            template_dir: normalize(&root_dir.join(&raw.template_dir)),
            output_dir: normalize(&root_dir.join(&raw.output_dir)),
            root_dir,
            date_format: raw.date_format,
            content_extension: raw.content_extension.trim_start_matches('.').to_string(),
            output_extension: raw.output_extension.trim_start_matches('.').to_string(),
            copy_static: raw.copy_static,
            copy_sources: raw.copy_sources,
            update: raw.update,
            meta_parsers: raw.meta_parsers,
            content_filters: raw.content_filters,
            generators: raw.generators,
            config_file,
        };
        config.check_roots()?;
        Ok(config)
    }

    /// The content, template and output directories must not nest inside
    /// one another. Output under the content root would be copied back into
    /// itself on every build.
    fn check_roots(&self) -> Result<(), ConfigError> {
        let roots = [
            ("content_dir", &self.content_dir),
            ("template_dir", &self.template_dir),
            ("output_dir", &self.output_dir),
        ];
        for (i, (first, first_path)) in roots.iter().enumerate() {
            for (second, second_path) in &roots[i + 1..] {
                if first_path.starts_with(second_path) || second_path.starts_with(first_path) {
                    return Err(ConfigError::OverlappingDirs {
                        first: *first,
                        first_path: first_path.to_path_buf(),
                        second: *second,
                        second_path: second_path.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Output path for a content source: the content-root prefix becomes the
    /// output root and the extension becomes [`Self::output_extension`].
    pub fn destination_for(&self, source: &Path) -> Result<PathBuf, ContentError> {
        let relative = self.relative_to_content(source)?;
        Ok(self
            .output_dir
            .join(relative)
            .with_extension(&self.output_extension))
    }

    /// Mirrored output location for a file copied verbatim.
    pub fn mirror_for(&self, source: &Path) -> Result<PathBuf, ContentError> {
        Ok(self.output_dir.join(self.relative_to_content(source)?))
    }

    /// Public URL of an output file, or `None` when `destination` is outside
    /// the output root.
    pub fn url_for(&self, destination: &Path) -> Option<String> {
        let relative = destination.strip_prefix(&self.output_dir).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(format!("{}/{}", self.site_url, parts.join("/")))
    }

    /// Content file pattern understood by
    /// [`crate::enumerate::list_files`].
    pub fn content_pattern(&self) -> String {
        format!(".{}", self.content_extension)
    }

    fn relative_to_content<'a>(&self, source: &'a Path) -> Result<&'a Path, ContentError> {
        source
            .strip_prefix(&self.content_dir)
            .map_err(|_| ContentError::OutsideContentRoot {
                path: source.to_path_buf(),
                root: self.content_dir.clone(),
            })
    }
}

fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Lexically drop `.` and resolve `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
