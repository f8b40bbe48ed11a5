//! Content data model: documents, collections and the tag index.

mod frontmatter;
mod meta;

pub use frontmatter::Metadata;
pub use meta::{MetaValue, cmp_optional};

use crate::log;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Extensions rendered by the Markdown stage.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

// ============================================================================
// Document
// ============================================================================

/// Index of a document inside [`Site::documents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(pub usize);

/// A file travelling through the content pipeline.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Path relative to the source directory. Never rewritten.
    pub source: PathBuf,
    /// Path relative to the output directory.
    pub output: PathBuf,
    pub contents: Vec<u8>,
    pub meta: Metadata,

    pub word_count: Option<usize>,
    pub reading_time: Option<String>,
    pub excerpt: Option<String>,
    /// URL path (no leading slash) once a permalink rule applied.
    pub path: Option<String>,
    pub tags: Vec<String>,
    /// Names of the collections this document belongs to, in config order.
    pub collections: Vec<String>,
    pub previous: Option<DocId>,
    pub next: Option<DocId>,
    /// Set on synthesized tag listing pages.
    pub listing_tag: Option<String>,
    /// Set on files copied next to a relocated page.
    pub copy_of: Option<DocId>,
}

impl Document {
    /// A document without front-matter.
    pub fn new(source: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        let source = source.into();
        Self {
            output: source.clone(),
            source,
            contents,
            ..Self::default()
        }
    }

    /// Build a document from raw file bytes, parsing front-matter when the
    /// file is UTF-8 text.
    pub fn from_bytes(source: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        let source = source.into();
        let Ok(text) = std::str::from_utf8(&bytes) else {
            return Ok(Self::new(source, bytes));
        };
        let (meta, body) = frontmatter::parse(text)
            .with_context(|| format!("failed to read front-matter of {}", source.display()))?;
        let contents = body.as_bytes().to_vec();
        let mut doc = Self::new(source, contents);
        doc.meta = meta;
        Ok(doc)
    }

    pub fn is_draft(&self) -> bool {
        self.meta.get("draft").and_then(MetaValue::as_bool) == Some(true)
    }

    pub fn is_markdown(&self) -> bool {
        has_extension(&self.output, MARKDOWN_EXTENSIONS)
    }

    pub fn is_html(&self) -> bool {
        has_extension(&self.output, &["html", "htm"])
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.get("title").and_then(MetaValue::as_str)
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        self.meta.get("date").and_then(MetaValue::as_date)
    }

    /// Contents as text, when they are UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// Source path with `/` separators, for glob matching and messages.
    pub fn source_str(&self) -> String {
        slash_path(&self.source)
    }

    /// Output path with `/` separators.
    pub fn output_str(&self) -> String {
        slash_path(&self.output)
    }

    /// URL path without the leading slash.
    ///
    /// Uses the permalink when one was assigned, otherwise the output path
    /// with a trailing `index.html` dropped.
    pub fn url_path(&self) -> String {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let output = self.output_str();
        match output.strip_suffix("index.html") {
            Some(dir) => dir.trim_end_matches('/').to_owned(),
            None => output,
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Site
// ============================================================================

/// One entry of the tag index.
#[derive(Debug, Clone, Default)]
pub struct TagEntry {
    pub slug: String,
    /// Tagged documents in tag sort order.
    pub documents: Vec<DocId>,
    /// Synthesized listing page.
    pub page: Option<DocId>,
}

/// Everything the content stages operate on.
#[derive(Debug, Default)]
pub struct Site {
    pub documents: Vec<Document>,
    pub collections: BTreeMap<String, Vec<DocId>>,
    pub tags: BTreeMap<String, TagEntry>,
}

impl Site {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// Read every file under `source` (dotfiles skipped) in path order.
    pub fn load(source: &Path) -> Result<Self> {
        let mut documents = Vec::new();

        let entries = WalkDir::new(source)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in entries {
            let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(source).unwrap_or(path).to_path_buf();
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            documents.push(Document::from_bytes(relative, bytes)?);
        }

        log!("content"; "loaded {} files from {}", documents.len(), source.display());
        Ok(Self::new(documents))
    }

    #[inline]
    pub fn get(&self, id: DocId) -> &Document {
        &self.documents[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DocId) -> &mut Document {
        &mut self.documents[id.0]
    }

    /// Append a document and return its id.
    pub fn push(&mut self, doc: Document) -> DocId {
        self.documents.push(doc);
        DocId(self.documents.len() - 1)
    }

    pub fn ids(&self) -> impl Iterator<Item = DocId> + use<> {
        (0..self.documents.len()).map(DocId)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
