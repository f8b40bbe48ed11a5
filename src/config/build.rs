//! `[build]` section configuration.
//!
//! Contains the content pipeline settings: directories, collections,
//! permalink rules, tags, feed, widow fix and word counting.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in blogsmith.toml - content pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"
/// output = "build"
/// minify = true
///
/// [build.collections.articles]
/// pattern = "articles/**/*"
/// sort_by = "date"
/// reverse = true
///
/// [[build.permalinks]]
/// branch = "articles/**/*"
/// pattern = ":date/:title"
/// date_format = "%Y/%m"
/// relative = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory (markdown and static files).
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Template directory.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Partial template directory, registered under each file's base name.
    #[serde(default = "defaults::build::partials")]
    #[educe(Default = defaults::build::partials())]
    pub partials: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Minify HTML output.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Named collections keyed by name.
    #[serde(default = "defaults::build::collections")]
    #[educe(Default = defaults::build::collections())]
    pub collections: BTreeMap<String, CollectionConfig>,

    /// Permalink rules, applied in order.
    #[serde(default = "defaults::build::permalinks")]
    #[educe(Default = defaults::build::permalinks())]
    pub permalinks: Vec<PermalinkRule>,

    /// Tag index settings.
    #[serde(default)]
    pub tags: TagsConfig,

    /// Feed generation settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Widow fix settings.
    #[serde(default)]
    pub widow: WidowConfig,

    /// Word count settings.
    #[serde(default)]
    pub wordcount: WordCountConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.collections.<name>]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Glob matched against the source path, e.g. `articles/**/*`
    pub pattern: String,

    /// Metadata key to sort members by
    #[serde(default)]
    pub sort_by: Option<String>,

    /// Reverse the order after sorting
    #[serde(default)]
    pub reverse: bool,
}

/// `[[build.permalinks]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermalinkRule {
    /// Glob matched against the current output path
    pub branch: String,

    /// Path pattern such as `:date/:title`
    pub pattern: String,

    /// chrono format string used for `:date`
    #[serde(default = "defaults::build::permalinks::date_format")]
    pub date_format: String,

    /// Copy non-HTML siblings into the permalink directory
    #[serde(default)]
    pub relative: bool,
}

/// `[build.tags]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    /// Front-matter key holding the tag list
    #[serde(default = "defaults::build::tags::handle")]
    #[educe(Default = defaults::build::tags::handle())]
    pub handle: String,

    /// Output directory of the tag listing pages
    #[serde(default = "defaults::build::tags::path")]
    #[educe(Default = defaults::build::tags::path())]
    pub path: String,

    /// Template used for tag listing pages
    #[serde(default = "defaults::build::tags::template")]
    #[educe(Default = defaults::build::tags::template())]
    pub template: String,

    /// Key used to order the documents of a tag
    #[serde(default = "defaults::build::tags::sort_by")]
    #[educe(Default = defaults::build::tags::sort_by())]
    pub sort_by: Option<String>,

    /// Reverse the order after sorting
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub reverse: bool,
}

/// `[build.feed]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Enable feed generation. Requires `[site].url`.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Collection the feed is built from
    #[serde(default = "defaults::build::feed::collection")]
    #[educe(Default = defaults::build::feed::collection())]
    pub collection: String,

    /// Output path relative to the build directory
    #[serde(default = "defaults::build::feed::path")]
    #[educe(Default = defaults::build::feed::path())]
    pub path: PathBuf,

    /// Maximum number of items
    #[serde(default = "defaults::build::feed::limit")]
    #[educe(Default = defaults::build::feed::limit())]
    pub limit: usize,
}

/// `[build.widow]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WidowConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Tag names whose flowed text gets the fix
    #[serde(default = "defaults::build::widow::selectors")]
    #[educe(Default = defaults::build::widow::selectors())]
    pub selectors: Vec<String>,
}

/// `[build.wordcount]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WordCountConfig {
    #[serde(default = "defaults::build::wordcount::words_per_minute")]
    #[educe(Default = defaults::build::wordcount::words_per_minute())]
    pub words_per_minute: usize,
}

// ============================================================================
// Tests
// ============================================================================
