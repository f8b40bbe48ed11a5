//! Content pipeline.
//!
//! A build is an ordered list of [`Stage`]s run over one [`Site`]. Each stage
//! declares the [`Artifact`]s it needs and the ones it leaves behind, and
//! [`Pipeline::new`] refuses an order in which a stage would run before
//! something it depends on.
//!
//! Default order:
//!
//! ```text
//! drafts → collections → markdown → wordcount → tags → permalinks
//!        → feed → excerpts → templates → minify → widow
//! ```

mod collections;
mod drafts;
mod excerpts;
mod feed;
mod markdown;
mod minify;
mod permalinks;
mod tags;
mod templates;
mod widow;
mod wordcount;

use crate::{config::SiteConfig, content::Site, helpers::HelperTable};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use glob::{MatchOptions, Pattern};
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Fatal content-build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{first}` and `{second}` both resolve to `{output}`")]
    Collision {
        output: String,
        first: String,
        second: String,
    },

    #[error("stage `{stage}` cannot run here: {reason}")]
    StageOrder { stage: Stage, reason: String },

    #[error("feed generation requires [site].url")]
    MissingSiteUrl,
}

// ============================================================================
// Stages
// ============================================================================

/// Something a stage leaves behind for later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Drafts are settled (dropped or deliberately kept)
    Published,
    Collections,
    /// Markdown bodies rendered to HTML
    Html,
    WordCount,
    Tags,
    Permalinks,
    Feed,
    Excerpts,
    /// Layout templates applied
    Rendered,
    Minified,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Published => "published documents",
            Self::Collections => "collections",
            Self::Html => "rendered markdown",
            Self::WordCount => "word counts",
            Self::Tags => "the tag index",
            Self::Permalinks => "permalinks",
            Self::Feed => "the feed",
            Self::Excerpts => "excerpts",
            Self::Rendered => "applied templates",
            Self::Minified => "minified html",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Drafts,
    Collections,
    Markdown,
    WordCount,
    Tags,
    Permalinks,
    Feed,
    Excerpts,
    Templates,
    Minify,
    Widow,
}

impl Stage {
    pub const DEFAULT_ORDER: [Stage; 11] = [
        Self::Drafts,
        Self::Collections,
        Self::Markdown,
        Self::WordCount,
        Self::Tags,
        Self::Permalinks,
        Self::Feed,
        Self::Excerpts,
        Self::Templates,
        Self::Minify,
        Self::Widow,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Drafts => "drafts",
            Self::Collections => "collections",
            Self::Markdown => "markdown",
            Self::WordCount => "wordcount",
            Self::Tags => "tags",
            Self::Permalinks => "permalinks",
            Self::Feed => "feed",
            Self::Excerpts => "excerpts",
            Self::Templates => "templates",
            Self::Minify => "minify",
            Self::Widow => "widow",
        }
    }

    pub const fn requires(self) -> &'static [Artifact] {
        use Artifact::*;
        match self {
            Self::Drafts | Self::Markdown => &[],
            Self::Collections | Self::Tags => &[Published],
            Self::WordCount | Self::Excerpts => &[Html],
            Self::Permalinks => &[Html, Tags],
            Self::Feed => &[Collections, Permalinks],
            Self::Templates => &[Html, Permalinks],
            Self::Minify | Self::Widow => &[Rendered],
        }
    }

    pub const fn provides(self) -> &'static [Artifact] {
        use Artifact::*;
        match self {
            Self::Drafts => &[Published],
            Self::Collections => &[Collections],
            Self::Markdown => &[Html],
            Self::WordCount => &[WordCount],
            Self::Tags => &[Tags],
            Self::Permalinks => &[Permalinks],
            Self::Feed => &[Feed],
            Self::Excerpts => &[Excerpts],
            Self::Templates => &[Rendered],
            Self::Minify => &[Minified],
            Self::Widow => &[],
        }
    }

    fn run(self, site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
        match self {
            Self::Drafts => drafts::run(site, ctx),
            Self::Collections => collections::run(site, ctx),
            Self::Markdown => markdown::run(site),
            Self::WordCount => wordcount::run(site, ctx),
            Self::Tags => tags::run(site, ctx),
            Self::Permalinks => permalinks::run(site, ctx),
            Self::Feed => feed::run(site, ctx),
            Self::Excerpts => excerpts::run(site),
            Self::Templates => templates::run(site, ctx),
            Self::Minify => minify::run(site, ctx),
            Self::Widow => widow::run(site, ctx),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Everything a stage may read besides the site itself.
pub struct BuildContext<'a> {
    pub config: &'a SiteConfig,
    pub helpers: HelperTable,
    /// Clock reading taken once per build
    pub now: NaiveDateTime,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self::at(config, Local::now().naive_local())
    }

    pub fn at(config: &'a SiteConfig, now: NaiveDateTime) -> Self {
        Self {
            config,
            helpers: HelperTable::standard(now),
            now,
        }
    }

    #[inline]
    pub fn production(&self) -> bool {
        self.config.production
    }
}

/// A validated stage order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stages: Stage::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl Pipeline {
    /// Accept `stages` if every requirement is provided by an earlier stage
    /// and no stage repeats.
    pub fn new(stages: Vec<Stage>) -> Result<Self, BuildError> {
        let mut provided: Vec<Artifact> = Vec::new();
        for (i, &stage) in stages.iter().enumerate() {
            if stages[..i].contains(&stage) {
                return Err(BuildError::StageOrder {
                    stage,
                    reason: "it appears more than once".into(),
                });
            }
            if let Some(missing) = stage.requires().iter().find(|a| !provided.contains(a)) {
                return Err(BuildError::StageOrder {
                    stage,
                    reason: format!("it needs {missing}, which no earlier stage provides"),
                });
            }
            provided.extend_from_slice(stage.provides());
        }
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order. Output collisions are checked once permalinks
    /// are assigned and again at the end.
    pub fn run(&self, site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
        for &stage in &self.stages {
            stage
                .run(site, ctx)
                .with_context(|| format!("stage `{stage}` failed"))?;
            if stage == Stage::Permalinks {
                check_collisions(site)?;
            }
        }
        check_collisions(site)?;
        Ok(())
    }
}

/// Fail when two documents share an output path.
pub fn check_collisions(site: &Site) -> Result<(), BuildError> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    for (i, doc) in site.documents.iter().enumerate() {
        let output = doc.output_str();
        if let Some(&first) = seen.get(&output) {
            return Err(BuildError::Collision {
                output,
                first: site.documents[first].source_str(),
                second: doc.source_str(),
            });
        }
        seen.insert(output, i);
    }
    Ok(())
}

// ============================================================================
// Shared helpers
// ============================================================================

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

pub(crate) fn compile_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).with_context(|| format!("invalid glob `{pattern}`"))
}

#[inline]
pub(crate) fn glob_matches(pattern: &Pattern, path: &str) -> bool {
    pattern.matches_with(path, GLOB_OPTIONS)
}
