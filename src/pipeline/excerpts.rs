//! Excerpts: the first paragraph of each HTML page.

use crate::{content::Site, utils::html::Fragment};
use anyhow::Result;

pub fn run(site: &mut Site) -> Result<()> {
    for doc in site.documents.iter_mut().filter(|d| d.is_html()) {
        if let Some(value) = doc.meta.get("excerpt") {
            doc.excerpt = Some(value.to_plain_string());
            continue;
        }
        doc.excerpt = doc.text().and_then(first_paragraph);
    }
    Ok(())
}

/// Outer HTML of the first `<p>`, trimmed.
pub fn first_paragraph(html: &str) -> Option<String> {
    let fragment = Fragment::parse(html);
    let p = fragment.find_first("p")?;
    Some(fragment.outer_html(p).trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_first_paragraph() {
        let html = "<h1>Title</h1>\n<p>First <em>one</em>.</p>\n<p>Second.</p>";
        assert_eq!(first_paragraph(html).as_deref(), Some("<p>First <em>one</em>.</p>"));
        assert_eq!(first_paragraph("<h1>No paragraphs</h1>"), None);
    }

    #[test]
    fn test_front_matter_excerpt_wins() {
        let mut site = site(vec![
            doc("a.html", "---\nexcerpt: Custom summary\n---\n<p>Body</p>"),
            doc("b.html", "<p>Body</p><p>More</p>"),
            doc("c.css", "p { }"),
        ]);

        run(&mut site).unwrap();

        assert_eq!(site.documents[0].excerpt.as_deref(), Some("Custom summary"));
        assert_eq!(site.documents[1].excerpt.as_deref(), Some("<p>Body</p>"));
        assert_eq!(site.documents[2].excerpt, None);
    }
}
