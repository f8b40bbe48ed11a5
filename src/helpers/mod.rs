//! Template helpers.
//!
//! Pure functions producing HTML fragments or formatted dates. [`HelperTable`]
//! exposes them to the template engine.

mod table;

pub use table::HelperTable;

use crate::utils::date::ordinal;
use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Leading URL scheme, as in `http:`, `mailto:` or `git+ssh:`.
static RE_ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+\-.]*:").expect("valid regex"));

// ============================================================================
// Links
// ============================================================================

pub fn is_absolute_url(href: &str) -> bool {
    RE_ABSOLUTE_URL.is_match(href)
}

/// Build an anchor.
///
/// Relative hrefs get a leading `/`. When `title` is `None`, relative links
/// get a `Permanent link to '<text>'` title and absolute links none; an empty
/// title omits the attribute.
pub fn create_anchor(href: &str, text: &str, title: Option<&str>) -> String {
    let absolute = is_absolute_url(href);
    let title = match title {
        Some(t) => t.to_owned(),
        None if !absolute => format!("Permanent link to '{text}'"),
        None => String::new(),
    };
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{title}""#)
    };
    let href = if absolute {
        href.to_owned()
    } else {
        format!("/{href}")
    };
    format!(r#"<a href="{href}"{title_attr}>{text}</a>"#)
}

/// `link_to("about")` → `<a href="/about" title="Permanent link to 'About'">About</a>`
pub fn link_to(href: &str, title: Option<&str>) -> String {
    let text = match title {
        Some(t) => t.to_owned(),
        None => capitalize(href),
    };
    create_anchor(href, &text, None)
}

pub fn link_to_permalink(href: &str, title: &str) -> String {
    create_anchor(href, "#", Some(&format!("Permanent link to '{title}'")))
}

pub fn link_to_topic(topic: &str) -> String {
    format!(
        r#"<a href="/topics/{topic}" class="label label-default" title="Browse entries tagged with '{topic}'">{topic}</a>"#
    )
}

/// `class="active"` when `href` is a non-empty prefix of `url`.
pub fn is_current_section(href: &str, url: &str) -> &'static str {
    if !href.is_empty() && url.starts_with(href) {
        r#"class="active""#
    } else {
        ""
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Dates
// ============================================================================

/// `Wednesday, January 1st 2020, at 01:00`
pub fn format_date(dt: NaiveDateTime) -> String {
    format!("{}, at {}", format_date_only(dt), dt.format("%H:%M"))
}

/// `Wednesday, January 1st 2020`
pub fn format_date_only(dt: NaiveDateTime) -> String {
    format!(
        "{}, {} {} {}",
        dt.format("%A"),
        dt.format("%B"),
        ordinal(dt.day()),
        dt.year()
    )
}

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Select `then` when both dates fall on the same calendar day.
pub fn if_day_same<T>(a: NaiveDateTime, b: NaiveDateTime, then: T, otherwise: T) -> T {
    if is_same_day(a, b) { then } else { otherwise }
}

pub fn copyright_year(now: NaiveDateTime) -> String {
    format!("{:04}", now.year())
}
