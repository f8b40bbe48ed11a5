//! Markdown rendering.
//!
//! pulldown-cmark does the parsing; blockquotes are intercepted on the event
//! stream, rendered on their own and passed through [`blockquote`] before
//! being spliced back as raw HTML. Nested quotes are finished first because
//! an inner quote closes before its parent.

pub mod blockquote;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

fn options() -> Options {
    // No smart punctuation: attribution markers must stay `--`.
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Render a Markdown body to HTML.
pub fn render_markdown(source: &str) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut open_quotes: Vec<Vec<Event<'_>>> = Vec::new();

    for event in Parser::new_ext(source, options()) {
        match event {
            Event::Start(Tag::BlockQuote(_)) => open_quotes.push(Vec::new()),
            Event::End(TagEnd::BlockQuote(_)) => {
                let body = open_quotes.pop().unwrap_or_default();
                let mut inner = String::new();
                html::push_html(&mut inner, body.into_iter());
                let quote = Event::Html(blockquote::render(&inner).into());
                open_quotes.last_mut().unwrap_or(&mut events).push(quote);
            }
            other => open_quotes.last_mut().unwrap_or(&mut events).push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}
