//! Word count and reading time for HTML documents.

use super::BuildContext;
use crate::{content::Site, utils::html::Fragment};
use anyhow::Result;

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let wpm = ctx.config.build.wordcount.words_per_minute.max(1);
    for doc in site.documents.iter_mut().filter(|d| d.is_html()) {
        let Some(text) = doc.text() else { continue };
        let words = count_words(text);
        doc.word_count = Some(words);
        doc.reading_time = Some(reading_time(words, wpm));
    }
    Ok(())
}

/// Words of the tag-stripped HTML.
pub fn count_words(html: &str) -> usize {
    Fragment::parse(html).full_text().split_whitespace().count()
}

/// `"<n> min read"`, rounded up, at least one minute.
pub fn reading_time(words: usize, words_per_minute: usize) -> String {
    let minutes = words.div_ceil(words_per_minute).max(1);
    format!("{minutes} min read")
}
