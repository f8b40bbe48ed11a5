//! Widow fix: bind the last two words of flowed text with `&nbsp;`.

use super::BuildContext;
use crate::{
    content::Site,
    utils::html::{Element, Fragment, Node, apply_edits, is_raw_text},
};
use anyhow::Result;
use std::ops::Range;

const NBSP: &str = "&nbsp;";

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let widow = &ctx.config.build.widow;
    if !widow.enable {
        return Ok(());
    }
    for doc in site.documents.iter_mut().filter(|d| d.is_html()) {
        let Some(text) = doc.text() else { continue };
        let fixed = fix_widows(text, &widow.selectors);
        doc.set_text(fixed);
    }
    Ok(())
}

/// Replace the last whitespace run before the final word of every element
/// named in `selectors`.
pub fn fix_widows(html: &str, selectors: &[String]) -> String {
    let fragment = Fragment::parse(html);
    let mut edits = Vec::new();
    fragment.for_each_element(|el| {
        if selectors.iter().any(|s| s.eq_ignore_ascii_case(&el.name))
            && let Some(range) = last_gap(&fragment, el)
        {
            edits.push((range, NBSP.to_owned()));
        }
    });
    if edits.is_empty() {
        return html.to_owned();
    }
    apply_edits(html, edits)
}

/// Byte range of the whitespace run between the last two words of `el`.
fn last_gap(fragment: &Fragment<'_>, el: &Element) -> Option<Range<usize>> {
    let mut spans = Vec::new();
    text_spans(&el.children, &mut spans);

    let mut seen_word = false;
    let mut run: Option<Range<usize>> = None;
    let mut gap = None;
    for span in spans {
        for (i, c) in fragment.slice(&span).char_indices() {
            let at = span.start + i;
            if c.is_whitespace() {
                let end = at + c.len_utf8();
                run = match run {
                    Some(r) if r.end == at => Some(r.start..end),
                    _ => Some(at..end),
                };
            } else {
                if let Some(r) = run.take()
                    && seen_word
                {
                    gap = Some(r);
                }
                seen_word = true;
            }
        }
    }
    gap
}

fn text_spans(nodes: &[Node], out: &mut Vec<Range<usize>>) {
    for node in nodes {
        match node {
            Node::Text(range) => out.push(range.clone()),
            Node::Element(el) if !is_raw_text(&el.name) && el.name != "pre" => {
                text_spans(&el.children, out)
            }
            _ => {}
        }
    }
}
