//! HTML minification stage.

use super::BuildContext;
use crate::{content::Site, utils::minify::minify_html};
use anyhow::Result;

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    if !ctx.config.build.minify {
        return Ok(());
    }
    for doc in site.documents.iter_mut().filter(|d| d.is_html()) {
        doc.contents = minify_html(&doc.contents, true).into_owned();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_only_html_minified() {
        let config = config();
        let mut site = site(vec![
            doc("a.html", "<div>\n    <p>Hello</p>\n</div>\n"),
            doc("b.txt", "keep   \n   spacing"),
        ]);

        run(&mut site, &BuildContext::new(&config)).unwrap();

        assert!(!site.documents[0].text().unwrap().contains("\n    "));
        assert_eq!(site.documents[1].text(), Some("keep   \n   spacing"));
    }

    #[test]
    fn test_disabled() {
        let mut config = config();
        config.build.minify = false;
        let mut site = site(vec![doc("a.html", "<div>\n    <p>Hello</p>\n</div>\n")]);

        run(&mut site, &BuildContext::new(&config)).unwrap();

        assert_eq!(site.documents[0].text(), Some("<div>\n    <p>Hello</p>\n</div>\n"));
    }
}
