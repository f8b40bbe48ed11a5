//! Attribution footers inside blockquotes.
//!
//! ```text
//! <p>Quote</p>            <p>Quote</p>
//! <p>-- Author</p>   →    <footer> Author</footer>
//! ```

use crate::utils::html::{Fragment, Node};

const MARKER: &str = "--";

/// Wrap an already rendered blockquote body, turning every top-level
/// paragraph whose text starts with `--` into a `<footer>`.
pub fn render(inner_html: &str) -> String {
    format!("<blockquote>\n{}</blockquote>\n", transform(inner_html))
}

/// Rewrite the body only. Nodes that are not attribution paragraphs are
/// copied byte for byte.
pub fn transform(inner_html: &str) -> String {
    let fragment = Fragment::parse(inner_html);
    fragment.rebuild_top_level(|node| match node {
        Node::Element(el) if el.name == "p" && fragment.text(el).starts_with(MARKER) => {
            let inner = fragment.inner_html(el).replacen(MARKER, "", 1);
            Some(format!("<footer>{inner}</footer>"))
        }
        _ => None,
    })
}
