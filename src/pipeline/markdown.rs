//! Markdown stage: render `.md`/`.markdown` bodies and rename them to `.html`.

use crate::{content::Site, log, render::render_markdown};
use anyhow::{Result, anyhow};

pub fn run(site: &mut Site) -> Result<()> {
    let mut rendered = 0;
    for doc in site.documents.iter_mut().filter(|d| d.is_markdown()) {
        let text = doc
            .text()
            .ok_or_else(|| anyhow!("{} is not valid UTF-8", doc.source.display()))?;
        let html = render_markdown(text);
        doc.set_text(html);
        doc.output.set_extension("html");
        rendered += 1;
    }
    log!("markdown"; "rendered {rendered} documents");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::content::Document;
    use std::path::PathBuf;

    #[test]
    fn test_markdown_rendered_and_renamed() {
        let mut site = site(vec![
            doc("articles/hello.md", "---\ntitle: Hi\n---\n*hi*\n"),
            doc("pages/raw.html", "<p>raw *kept*</p>"),
        ]);

        run(&mut site).unwrap();

        assert_eq!(site.documents[0].output, PathBuf::from("articles/hello.html"));
        assert_eq!(site.documents[0].text(), Some("<p><em>hi</em></p>\n"));
        assert_eq!(site.documents[1].text(), Some("<p>raw *kept*</p>"));
    }

    #[test]
    fn test_markdown_rejects_binary() {
        let mut site = site(vec![Document::new("broken.md", vec![0xff, 0xfe])]);
        assert!(run(&mut site).is_err());
    }
}
