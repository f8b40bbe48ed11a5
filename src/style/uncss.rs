//! Unused selector removal.
//!
//! Selectors are matched against the tag names, classes and ids that appear
//! in the built pages. Pseudo-classes, pseudo-elements and attribute
//! selectors are not evaluated: a selector survives when every tag, class
//! and id it names occurs somewhere in the site.

use crate::utils::html::Fragment;
use lightningcss::{
    printer::PrinterOptions,
    rules::{CssRule, CssRuleList},
    selector::{Component, Selector},
    stylesheet::{ParserOptions, StyleSheet},
    traits::ToCss,
};
use rustc_hash::FxHashSet;

/// Tag names, classes and ids present in a set of pages.
#[derive(Debug, Default)]
pub struct UsedNames {
    tags: FxHashSet<String>,
    classes: FxHashSet<String>,
    ids: FxHashSet<String>,
}

impl UsedNames {
    pub fn add_html(&mut self, html: &str) {
        Fragment::parse(html).for_each_element(|el| {
            self.tags.insert(el.name.clone());
            self.classes.extend(el.classes.iter().cloned());
            if let Some(id) = &el.id {
                self.ids.insert(id.clone());
            }
        });
    }

    /// Mark a simple `.class` or `#id` ignore entry as used.
    /// Returns false for anything more complex.
    fn add_simple(&mut self, selector: &str) -> bool {
        let is_ident = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        };
        if let Some(class) = selector.strip_prefix('.')
            && is_ident(class)
        {
            self.classes.insert(class.to_owned());
            return true;
        }
        if let Some(id) = selector.strip_prefix('#')
            && is_ident(id)
        {
            self.ids.insert(id.to_owned());
            return true;
        }
        false
    }

    /// Whether every tag, class and id named by `selector` is present.
    pub fn matches(&self, selector: &Selector<'_>) -> bool {
        selector
            .iter_raw_match_order()
            .all(|component| match component {
                Component::LocalName(name) => self.tags.contains(&*name.lower_name.0),
                Component::Class(class) => self.classes.contains(&*class.0),
                Component::ID(id) => self.ids.contains(&*id.0),
                _ => true,
            })
    }
}

/// Selectors that are kept regardless of usage.
#[derive(Debug, Default)]
pub struct Ignore {
    exact: FxHashSet<String>,
}

impl Ignore {
    /// Split `entries` into simple names (added to `used`) and exact selectors.
    pub fn new(entries: &[String], used: &mut UsedNames) -> Self {
        let mut exact = FxHashSet::default();
        for entry in entries {
            let entry = entry.trim();
            if !used.add_simple(entry) {
                exact.insert(normalize(entry));
            }
        }
        Self { exact }
    }

    fn contains(&self, selector: &Selector<'_>) -> bool {
        !self.exact.is_empty()
            && selector
                .to_css_string(PrinterOptions::default())
                .is_ok_and(|text| self.exact.contains(&text))
    }
}

/// Print an ignore entry the way selectors of the stylesheet are printed.
fn normalize(entry: &str) -> String {
    let source = format!("{entry}{{}}");
    StyleSheet::parse(&source, ParserOptions::default())
        .ok()
        .and_then(|sheet| match sheet.rules.0.first() {
            Some(CssRule::Style(rule)) => rule
                .selectors
                .to_css_string(PrinterOptions::default())
                .ok(),
            _ => None,
        })
        .unwrap_or_else(|| entry.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Drop unused selectors, then style rules and `@media` rules left empty.
/// Other at-rules are kept as they are. Returns the number of selectors removed.
pub fn remove_unused(rules: &mut CssRuleList<'_>, used: &UsedNames, ignore: &Ignore) -> usize {
    let mut removed = 0;
    rules.0.retain_mut(|rule| match rule {
        CssRule::Style(style) => {
            let before = style.selectors.0.len();
            style
                .selectors
                .0
                .retain(|selector| ignore.contains(selector) || used.matches(selector));
            removed += before - style.selectors.0.len();
            !style.selectors.0.is_empty()
        }
        CssRule::Media(media) => {
            removed += remove_unused(&mut media.rules, used, ignore);
            !media.rules.0.is_empty()
        }
        _ => true,
    });
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(html: &str) -> UsedNames {
        let mut used = UsedNames::default();
        used.add_html(html);
        used
    }

    fn matches(used: &UsedNames, selector: &str) -> bool {
        let css = format!("{selector}{{color:red}}");
        let sheet = StyleSheet::parse(&css, ParserOptions::default()).unwrap();
        let Some(CssRule::Style(rule)) = sheet.rules.0.first() else {
            panic!("{selector} did not parse as a style rule");
        };
        used.matches(&rule.selectors.0[0])
    }

    fn run(css: &str, html: &str, ignore: &[&str]) -> String {
        let mut used = used(html);
        let ignore: Vec<String> = ignore.iter().map(|s| s.to_string()).collect();
        let ignore = Ignore::new(&ignore, &mut used);
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        remove_unused(&mut sheet.rules, &used, &ignore);
        let options = PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        };
        sheet.to_css(options).unwrap().code
    }

    #[test]
    fn test_matches() {
        let used = used(r#"<div class="nav open" id="top"><a href="/">x</a></div>"#);
        assert!(matches(&used, "div.nav"));
        assert!(matches(&used, "#top > a:hover"));
        assert!(matches(&used, ".nav.open a[href^=\"/\"]"));
        assert!(matches(&used, "a::before"));
        assert!(matches(&used, "*"));
        assert!(matches(&used, ":root"));
        assert!(matches(&used, "div:not(.missing)"));
        assert!(!matches(&used, "span"));
        assert!(!matches(&used, ".nav .missing"));
        assert!(!matches(&used, "#bottom"));
    }

    #[test]
    fn test_tag_case_insensitive() {
        assert!(matches(&used("<p>x</p>"), "P"));
    }

    #[test]
    fn test_names_after_bare_ampersand() {
        let used = used("<h1>R&D</h1><nav class=navbar><a href=/ id=brand>Tom & Jerry</a></nav>");
        assert!(matches(&used, "h1"));
        assert!(matches(&used, "nav.navbar"));
        assert!(matches(&used, "a#brand"));
    }

    #[test]
    fn test_removes_unused_selectors_and_rules() {
        let css = "p,.unused{color:red}.gone{margin:1px}@media print{.gone{margin:2px}}@media screen{p{margin:3px}}";
        assert_eq!(
            run(css, "<p>hi</p>", &[]),
            "p{color:red}@media screen{p{margin:3px}}"
        );
    }

    #[test]
    fn test_other_at_rules_kept() {
        let css = "@font-face{font-family:X}@keyframes spin{from{opacity:0}to{opacity:1}}.gone{margin:0}";
        let out = run(css, "<p></p>", &[]);
        assert!(out.starts_with("@font-face{"));
        assert!(out.contains("@keyframes spin{"));
        assert!(!out.contains(".gone"));
    }

    #[test]
    fn test_ignore_entries() {
        let css = ".open{color:red}.collapse.in{display:block}.nav .open{margin:0}.list>li{padding:0}.other{padding:0}";
        assert_eq!(
            run(
                css,
                "<div class=\"nav\"></div>",
                &[".open", ".collapse.in", ".list  >  li"]
            ),
            ".open{color:red}.collapse.in{display:block}.nav .open{margin:0}.list>li{padding:0}"
        );
    }
}
