//! Media query combining.
//!
//! Top-level `@media` rules with the same query are merged into one, and the
//! merged rules are moved after all other top-level rules in first-seen order.

use lightningcss::{
    printer::PrinterOptions,
    rules::{CssRule, CssRuleList, media::MediaRule},
    traits::ToCss,
};

pub fn combine_media_queries<'i>(rules: &mut CssRuleList<'i>) {
    let mut rest = Vec::with_capacity(rules.0.len());
    let mut queries: Vec<(String, MediaRule<'i>)> = Vec::new();

    for rule in std::mem::take(&mut rules.0) {
        match rule {
            CssRule::Media(media) => {
                let Ok(key) = media.query.to_css_string(PrinterOptions::default()) else {
                    rest.push(CssRule::Media(media));
                    continue;
                };
                match queries.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, merged)) => merged.rules.0.extend(media.rules.0),
                    None => queries.push((key, media)),
                }
            }
            other => rest.push(other),
        }
    }

    rest.extend(queries.into_iter().map(|(_, media)| CssRule::Media(media)));
    rules.0 = rest;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightningcss::stylesheet::{ParserOptions, StyleSheet};

    fn combine(css: &str) -> String {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        combine_media_queries(&mut sheet.rules);
        let options = PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        };
        sheet.to_css(options).unwrap().code
    }

    #[test]
    fn test_merges_and_moves_to_end() {
        let css = combine(
            "@media print{.a{margin:1px}}.b{margin:2px}@media screen{.c{margin:3px}}\
             @media print{.d{margin:4px}}.e{margin:5px}",
        );
        assert_eq!(
            css,
            ".b{margin:2px}.e{margin:5px}@media print{.a{margin:1px}.d{margin:4px}}@media screen{.c{margin:3px}}"
        );
    }

    #[test]
    fn test_query_spacing_is_not_significant() {
        let css = combine(
            "@media (max-width:767px){.a{margin:0}}@media (max-width: 767px){.b{padding:0}}",
        );
        assert_eq!(css.matches("@media").count(), 1);
        assert!(css.contains(".a{margin:0}.b{padding:0}"));
    }

    #[test]
    fn test_without_media_is_unchanged() {
        let css = ".a{margin:0}.b{padding:0}";
        assert_eq!(combine(css), css);
    }
}
