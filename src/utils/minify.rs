//! HTML minification.
//!
//! Thin wrapper over `minify_html`, keeping closing tags and the `html`/`head`
//! openers so the widow pass and the unused-CSS scanner still see a complete
//! tree.

use std::borrow::Cow;

/// Minify an HTML document. Returns the input unchanged when `enabled` is false.
pub fn minify_html(html: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if !enabled {
        return Cow::Borrowed(html);
    }
    Cow::Owned(minify_html::minify(html, &html_cfg()))
}

fn html_cfg() -> minify_html::Cfg {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    cfg
}
