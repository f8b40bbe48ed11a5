//! Content build orchestration.
//!
//! ```text
//! build_content()
//!     │
//!     ├── Site::load()        read src/ (front-matter parsed)
//!     ├── Pipeline::run()     drafts → ... → widow
//!     └── write_site()        every document to build/<output>
//! ```

use crate::{
    config::SiteConfig,
    content::Site,
    log,
    pipeline::{BuildContext, Pipeline},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path, time::Instant};

/// Load the source tree, run the default pipeline and write the results.
pub fn build_content(config: &SiteConfig) -> Result<()> {
    let started = Instant::now();

    let mut site = Site::load(&config.build.source)?;
    let ctx = BuildContext::new(config);
    Pipeline::default().run(&mut site, &ctx)?;

    let written = write_site(&site, &config.build.output)?;
    log!("build"; "{written} files written in {:.2?}", started.elapsed());
    Ok(())
}

/// Write every document to `output/<document output path>`.
fn write_site(site: &Site, output: &Path) -> Result<usize> {
    site.documents.par_iter().try_for_each(|doc| {
        let path = output.join(&doc.output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, &doc.contents)
            .with_context(|| format!("failed to write {}", path.display()))
    })?;
    Ok(site.documents.len())
}

/// Remove the output directory.
pub fn clean_output(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to clear output directory: {}", output.display()))?;
        log!("clean"; "removed {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn setup() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write(
            root,
            "src/articles/first-post/index.md",
            "---\ntitle: First Post\ndate: 2015-04-12\ntags: [css, design]\ntemplate: article.html\n---\n\
             Some words in a paragraph.\n\n> quoted text\n>\n> -- Somebody\n",
        );
        write(root, "src/articles/first-post/diagram.png", "PNG");
        write(
            root,
            "src/articles/draft.md",
            "---\ntitle: Unfinished\ndate: 2015-05-01\ndraft: true\ntemplate: article.html\n---\nLater.\n",
        );
        write(
            root,
            "src/pages/about.md",
            "---\ntitle: About\ntemplate: article.html\n---\nAbout me.\n",
        );
        write(root, "src/robots.txt", "User-agent: *\n");
        write(
            root,
            "templates/article.html",
            "{% include \"head.html\" %}<article><h1>{{ title }}</h1>{{ contents | safe }}</article>",
        );
        write(root, "templates/partials/head.html", "<title>{{ site.title }}</title>");
        write(
            root,
            "templates/tags.html",
            "<h1>{{ tag }}</h1>{% for post in posts %}<p>{{ post.title }}</p>{% endfor %}",
        );

        let mut config = SiteConfig::default();
        config.site.title = "Test Blog".into();
        config.site.url = Some("http://example.com".into());
        config.set_root(root);
        config.build.source = root.join("src");
        config.build.templates = root.join("templates");
        config.build.partials = root.join("templates/partials");
        config.build.output = root.join("build");
        (dir, config)
    }

    #[test]
    fn test_build_content_writes_site() {
        let (dir, mut config) = setup();
        config.production = true;
        build_content(&config).unwrap();

        let build = dir.path().join("build");
        let article = fs::read_to_string(build.join("2015/04/first-post/index.html")).unwrap();
        assert!(article.contains("<title>Test Blog</title>"));
        assert!(article.contains("<h1>First&nbsp;Post</h1>"));
        assert!(article.contains("Somebody</footer>"));

        assert!(build.join("2015/04/first-post/diagram.png").is_file());
        assert!(build.join("about/index.html").is_file());
        assert!(build.join("topics/css/index.html").is_file());
        assert!(build.join("topics/design/index.html").is_file());
        assert!(build.join("robots.txt").is_file());

        let feed = fs::read_to_string(build.join("rss.xml")).unwrap();
        assert!(feed.contains("http://example.com/2015/04/first-post"));
        assert!(!feed.contains("Unfinished"));
    }

    #[test]
    fn test_drafts_kept_outside_production() {
        let (dir, config) = setup();
        build_content(&config).unwrap();
        assert!(dir.path().join("build/2015/05/unfinished/index.html").is_file());
    }

    #[test]
    fn test_missing_template_fails_build() {
        let (dir, config) = setup();
        fs::remove_file(dir.path().join("templates/article.html")).unwrap();
        assert!(build_content(&config).is_err());
    }

    #[test]
    fn test_clean_output() {
        let (dir, config) = setup();
        write(dir.path(), "build/stale.html", "old");

        clean_output(&config.build.output).unwrap();
        assert!(!config.build.output.exists());
        clean_output(&config.build.output).unwrap();
    }
}
