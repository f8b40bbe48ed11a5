//! Site configuration management for `blogsmith.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                             |
//! |-------------|-----------------------------------------------------|
//! | `[site]`    | Site metadata (title, author, url)                  |
//! | `[build]`   | Content pipeline (dirs, collections, permalinks...) |
//! | `[style]`   | Sass entry, load paths, unused-CSS pass             |
//! | `[serve]`   | Preview server (port, interface)                    |
//! | `[extra]`   | User-defined fields exposed to templates            |
//!
//! The file is optional: the defaults describe the layout the tool was built
//! for, so a bare `blogsmith compile` in such a tree works without one.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Ben Briggs"
//! url = "http://beneb.info"
//! author = "Ben Briggs"
//!
//! [build]
//! output = "build"
//!
//! [build.feed]
//! limit = 10
//!
//! [serve]
//! port = 8082
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod site;
mod style;

pub use build::{BuildConfig, CollectionConfig, PermalinkRule};
pub use error::ConfigError;
pub use site::SiteInfo;
pub use style::StyleConfig;

use crate::cli::{Cli, Commands};
use crate::log;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use serve::ServeConfig;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing blogsmith.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Production mode: drafts dropped, output cleaned before building
    #[serde(skip)]
    pub production: bool,

    /// Basic site information
    #[serde(default)]
    pub site: SiteInfo,

    /// Content pipeline settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Stylesheet pipeline settings
    #[serde(default)]
    pub style: StyleConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named on the command line, apply CLI overrides and validate.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            log!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Absolute path of the compiled stylesheet.
    pub fn style_output(&self) -> PathBuf {
        self.build.output.join(&self.style.output)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);
        self.production = cli.production;

        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.update_path_with_root(&root);

        if let Commands::Watch {
            interface, port, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        if let Some(cli) = self.cli {
            Self::update_option(&mut self.build.output, cli.output.as_ref());
            self.config_path = Self::normalize_path(&root.join(&cli.config));
        }

        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.templates = Self::normalize_path(&root.join(&self.build.templates));
        self.build.partials = Self::normalize_path(&root.join(&self.build.partials));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.style.source = Self::normalize_path(&root.join(&self.style.source));
        self.style.load_paths = self
            .style
            .load_paths
            .iter()
            .map(|p| Self::normalize_path(&root.join(p)))
            .collect();
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        let builds_content = self
            .cli
            .is_none_or(|cli| !matches!(cli.command, Commands::Styles | Commands::Uncss));
        if builds_content && self.build.feed.enable && self.site.url.is_none() {
            bail!(ConfigError::Validation(
                "[site.url] is required for feed generation (or set [build.feed] enable = false)"
                    .into()
            ));
        }

        for (name, collection) in &self.build.collections {
            Self::check_glob(&format!("[build.collections.{name}].pattern"), &collection.pattern)?;
        }
        for rule in &self.build.permalinks {
            Self::check_glob("[[build.permalinks]].branch", &rule.branch)?;
            if rule.pattern.trim_matches('/').is_empty() {
                bail!(ConfigError::Validation(format!(
                    "[[build.permalinks]] pattern for `{}` is empty",
                    rule.branch
                )));
            }
        }

        Ok(())
    }

    fn check_glob(field: &str, pattern: &str) -> Result<()> {
        if let Err(err) = glob::Pattern::new(pattern) {
            bail!(ConfigError::Validation(format!(
                "{field} `{pattern}` is not a valid glob: {err}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [site]
            title = "My Blog"
            author = "Test Author"
            url = "https://example.com"
        "#,
        )
        .unwrap();

        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.author, "Test Author");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[site\ntitle = \"x\"").is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SiteConfig::from_path(Path::new("/nonexistent/blogsmith.toml")).unwrap_err();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_style_output_joins_build_dir() {
        let mut config = SiteConfig::default();
        config.build.output = PathBuf::from("/site/build");
        assert_eq!(config.style_output(), PathBuf::from("/site/build/css/main.css"));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = SiteConfig::from_str("[site]\nurl = \"ftp://example.com\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[site.url]"));
    }

    #[test]
    fn test_validate_feed_requires_url() {
        let config = SiteConfig::from_str("").unwrap();
        assert!(config.validate().is_err());

        let config = SiteConfig::from_str("[build.feed]\nenable = false").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = SiteConfig::from_str(
            r#"
            [site]
            url = "http://example.com"

            [[build.permalinks]]
            branch = "articles/[**"
            pattern = ":title"
        "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extra_fields() {
        let config = SiteConfig::from_str(
            r#"
            [extra]
            analytics_id = "UA-12345"
            show_comments = true
        "#,
        )
        .unwrap();

        assert_eq!(
            config.extra.get("analytics_id").and_then(|v| v.as_str()),
            Some("UA-12345")
        );
        assert_eq!(
            config.extra.get("show_comments").and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        assert!(SiteConfig::from_str("[deploy]\nprovider = \"github\"").is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert!(!config.production);
        assert_eq!(config.config_path, PathBuf::new());
        assert!(config.build.minify);
        assert_eq!(config.serve.port, 8082);
    }
}
