//! `[style]` section configuration.
//!
//! Settings of the stylesheet pipeline and the unused-CSS pass.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[style]` section in blogsmith.toml.
///
/// # Example
/// ```toml
/// [style]
/// source = "styles"
/// entry = "main.scss"
/// load_paths = ["vendor/bootstrap-sass-official/assets/stylesheets"]
/// output = "css/main.css"
///
/// [style.uncss]
/// ignore = [".open", ".collapse.in"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    /// Sass source directory (watched in watch mode).
    #[serde(default = "defaults::style::source")]
    #[educe(Default = defaults::style::source())]
    pub source: PathBuf,

    /// Entry stylesheet, relative to `source`.
    #[serde(default = "defaults::style::entry")]
    #[educe(Default = defaults::style::entry())]
    pub entry: PathBuf,

    /// Extra directories searched by `@import`.
    #[serde(default = "defaults::style::load_paths")]
    #[educe(Default = defaults::style::load_paths())]
    pub load_paths: Vec<PathBuf>,

    /// Output path relative to the build directory.
    #[serde(default = "defaults::style::output")]
    #[educe(Default = defaults::style::output())]
    pub output: PathBuf,

    /// Add vendor-prefixed copies of declarations that need them.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub autoprefix: bool,

    /// Merge identical media queries and move them after plain rules.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub combine_media_queries: bool,

    /// Unused-CSS pass settings.
    #[serde(default)]
    pub uncss: UncssConfig,
}

/// `[style.uncss]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UncssConfig {
    /// Selectors kept even when no page uses them (JS-toggled state classes).
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_style_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.style.source, PathBuf::from("styles"));
        assert_eq!(config.style.entry, PathBuf::from("main.scss"));
        assert_eq!(config.style.output, PathBuf::from("css/main.css"));
        assert_eq!(config.style.load_paths.len(), 1);
        assert!(config.style.autoprefix);
        assert!(config.style.combine_media_queries);
        assert!(config.style.uncss.ignore.is_empty());
    }

    #[test]
    fn test_uncss_ignore() {
        let config: SiteConfig = toml::from_str(
            r##"
            [style.uncss]
            ignore = [".open", "#modal"]
        "##,
        )
        .unwrap();

        assert_eq!(config.style.uncss.ignore, vec![".open", "#modal"]);
    }
}
