//! `[site]` section configuration.
//!
//! Global metadata exposed to every template as `site` and used by the feed.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in blogsmith.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "Ben Briggs"
/// url = "http://beneb.info"
/// author = "Ben Briggs"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteInfo {
    /// Site title displayed in headers and the feed channel.
    #[serde(default)]
    pub title: String,

    /// Author name for the feed and templates.
    #[serde(default = "defaults::site::author")]
    #[educe(Default = defaults::site::author())]
    pub author: String,

    /// Site description for the feed channel.
    #[serde(default)]
    pub description: String,

    /// Base URL for absolute links in the feed.
    /// Required when `[build.feed].enable = true`.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,

    /// Language code for the feed channel.
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_site_info_full() {
        let config = r#"
            [site]
            title = "Ben Briggs"
            url = "http://beneb.info"
            author = "Ben Briggs"
            description = "Writing about the web"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Ben Briggs");
        assert_eq!(config.site.url.as_deref(), Some("http://beneb.info"));
        assert_eq!(config.site.author, "Ben Briggs");
        assert_eq!(config.site.description, "Writing about the web");
    }

    #[test]
    fn test_site_info_defaults() {
        let config: SiteConfig = toml::from_str("[site]\ntitle = \"Test\"").unwrap();

        assert_eq!(config.site.author, "<YOUR_NAME>");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.url, None);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
            [site]
            title = "Test"
            unknown_field = "should_fail"
        "#,
        );
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }
}
