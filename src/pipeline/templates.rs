//! Layout templates.
//!
//! Every document with a `template` key is rendered through Tera. Templates
//! come from the templates directory (named by their relative path) and the
//! partials directory (also named by their file name, so `{% include
//! "header.html" %}` works from anywhere).
//!
//! All pages render against one snapshot of the site taken before the first
//! render, so listing pages see bodies, not other pages' layouts.
//!
//! # Context
//!
//! | Key           | Value                                             |
//! |---------------|---------------------------------------------------|
//! | `site`        | `[site]` section                                  |
//! | `is_dev`      | not a production build                            |
//! | `extra`       | `[extra]` section                                 |
//! | `collections` | name → page summaries in collection order         |
//! | `tags`        | tag → `{ slug, url, posts }`                      |
//! | `tag_index`   | same as `tags`, never shadowed by a page's tags   |
//! | page fields   | front-matter plus `contents`, `path`, `url`,      |
//! |               | `excerpt`, `word_count`, `reading_time`, `tags`,  |
//! |               | `collection`, `previous`, `next`                  |
//! | tag pages     | `tag`, `posts`                                    |

use super::BuildContext;
use crate::{
    content::{DocId, Document, Site, slash_path},
    log,
};
use anyhow::{Context as _, Result};
use serde_json::{Map, Value, json};
use std::{fs, path::Path};
use tera::{Context, Tera};
use walkdir::WalkDir;

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let targets: Vec<(DocId, String)> = site
        .ids()
        .filter_map(|id| {
            let name = site.get(id).meta.get("template")?.as_str()?;
            Some((id, name.to_owned()))
        })
        .collect();
    if targets.is_empty() {
        return Ok(());
    }

    let tera = load_templates(ctx)?;
    let summaries: Vec<Map<String, Value>> = site.documents.iter().map(summary).collect();
    let global = global_context(site, ctx, &summaries)?;

    let rendered = targets
        .iter()
        .map(|(id, name)| {
            let context = page_context(site, *id, &global, &summaries)?;
            tera.render(name, &context).with_context(|| {
                format!(
                    "failed to render {} with template `{name}`",
                    site.get(*id).source.display()
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for ((id, _), html) in targets.iter().zip(rendered) {
        site.get_mut(*id).set_text(html);
    }
    log!("templates"; "rendered {} documents", targets.len());
    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

/// Build a Tera instance from the template and partial directories, with the
/// helper table installed.
pub fn load_templates(ctx: &BuildContext<'_>) -> Result<Tera> {
    let build = &ctx.config.build;
    let mut sources = read_dir_templates(&build.templates, slash_path)?;
    sources.extend(read_dir_templates(&build.partials, |relative| {
        relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    })?);

    let mut tera = Tera::default();
    ctx.helpers.install(&mut tera);
    tera.add_raw_templates(sources)
        .context("failed to load templates")?;
    Ok(tera)
}

fn read_dir_templates(
    dir: &Path,
    name_of: impl Fn(&Path) -> String,
) -> Result<Vec<(String, String)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();
    let entries = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in entries {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?;
        sources.push((name_of(relative), content));
    }
    Ok(sources)
}

// ============================================================================
// Context
// ============================================================================

/// Template view of one document, without neighbours.
fn summary(doc: &Document) -> Map<String, Value> {
    let mut map: Map<String, Value> = doc
        .meta
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();

    let path = doc.url_path();
    map.insert("contents".into(), json!(doc.text().unwrap_or_default()));
    map.insert("url".into(), json!(format!("/{path}")));
    map.insert("path".into(), json!(path));
    if !doc.tags.is_empty() {
        map.insert("tags".into(), json!(doc.tags));
    }
    map.insert("collection".into(), json!(doc.collections));
    if let Some(excerpt) = &doc.excerpt {
        map.insert("excerpt".into(), json!(excerpt));
    }
    if let Some(words) = doc.word_count {
        map.insert("word_count".into(), json!(words));
    }
    if let Some(time) = &doc.reading_time {
        map.insert("reading_time".into(), json!(time));
    }
    map
}

fn global_context(
    site: &Site,
    ctx: &BuildContext<'_>,
    summaries: &[Map<String, Value>],
) -> Result<Map<String, Value>> {
    let pick = |ids: &[DocId]| -> Value {
        Value::Array(
            ids.iter()
                .map(|id| Value::Object(summaries[id.0].clone()))
                .collect(),
        )
    };

    let collections: Map<String, Value> = site
        .collections
        .iter()
        .map(|(name, ids)| (name.clone(), pick(ids)))
        .collect();

    let tags: Map<String, Value> = site
        .tags
        .iter()
        .map(|(tag, entry)| {
            let url = entry
                .page
                .map(|page| format!("/{}", site.get(page).url_path()))
                .unwrap_or_default();
            let value = json!({
                "slug": entry.slug,
                "url": url,
                "posts": pick(&entry.documents),
            });
            (tag.clone(), value)
        })
        .collect();

    let mut global = Map::new();
    global.insert("site".into(), serde_json::to_value(&ctx.config.site)?);
    global.insert("extra".into(), serde_json::to_value(&ctx.config.extra)?);
    global.insert("is_dev".into(), json!(!ctx.production()));
    global.insert("collections".into(), Value::Object(collections));
    global.insert("tag_index".into(), Value::Object(tags.clone()));
    global.insert("tags".into(), Value::Object(tags));
    Ok(global)
}

fn page_context(
    site: &Site,
    id: DocId,
    global: &Map<String, Value>,
    summaries: &[Map<String, Value>],
) -> Result<Context> {
    let doc = site.get(id);
    let neighbour = |other: Option<DocId>| {
        other.map_or(Value::Null, |o| Value::Object(summaries[o.0].clone()))
    };

    let mut map = global.clone();
    map.extend(summaries[id.0].clone());
    map.insert("previous".into(), neighbour(doc.previous));
    map.insert("next".into(), neighbour(doc.next));

    if let Some(tag) = &doc.listing_tag {
        let posts = global
            .get("tag_index")
            .and_then(|tags| tags.get(tag))
            .and_then(|entry| entry.get("posts"))
            .cloned()
            .unwrap_or_else(|| json!([]));
        map.insert("tag".into(), json!(tag));
        map.insert("posts".into(), posts);
    }

    Ok(Context::from_value(Value::Object(map))?)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::content::TagEntry;
    use tempfile::TempDir;

    fn template_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(
            root.join("layout.html"),
            "{% include \"header.html\" %}<main>{% block body %}{% endblock %}</main>",
        )
        .unwrap();
        fs::write(root.join("partials/header.html"), "<header>{{ site.title }}</header>").unwrap();
        fs::write(
            root.join("post.html"),
            "{% extends \"layout.html\" %}{% block body %}<h1>{{ title }}</h1>{{ contents | safe }}\
             {{ link_to(href=path, title=title) }}{% if next %}|next:{{ next.title }}{% endif %}{% endblock %}",
        )
        .unwrap();
        dir
    }

    fn configured(dir: &TempDir) -> crate::config::SiteConfig {
        let mut config = config();
        config.build.templates = dir.path().to_path_buf();
        config.build.partials = dir.path().join("partials");
        config
    }

    #[test]
    fn test_layout_with_partial_and_helpers() {
        let dir = template_dir();
        let config = configured(&dir);
        let mut a = doc("a.html", "---\ntitle: A & B\ntemplate: post.html\n---\n<p>Body</p>");
        a.path = Some("2015/04/a-b".into());
        a.next = Some(DocId(1));
        let b = doc("b.html", "---\ntitle: Next one\n---\n<p>Other</p>");
        let mut site = site(vec![a, b]);

        run(&mut site, &BuildContext::new(&config)).unwrap();

        assert_eq!(
            site.documents[0].text().unwrap(),
            "<header>Test Blog</header><main><h1>A &amp; B</h1><p>Body</p>\
             <a href=\"/2015/04/a-b\" title=\"Permanent link to 'A & B'\">A & B</a>|next:Next one</main>"
        );
        assert_eq!(site.documents[1].text(), Some("<p>Other</p>"));
    }

    #[test]
    fn test_tag_page_context() {
        let dir = template_dir();
        fs::write(
            dir.path().join("tags.html"),
            "{{ tag }}:{% for post in posts %}{{ post.title }},{% endfor %}{{ tags[tag].url | safe }}",
        )
        .unwrap();
        let config = configured(&dir);

        let post = doc("a.html", "---\ntitle: Post\n---\n");
        let mut page = crate::content::Document::new("topics/css/index.html", Vec::new());
        page.meta.insert(
            "template".into(),
            crate::content::MetaValue::Str("tags.html".into()),
        );
        page.listing_tag = Some("css".into());
        let mut site = site(vec![post, page]);
        site.tags.insert(
            "css".into(),
            TagEntry {
                slug: "css".into(),
                documents: vec![DocId(0)],
                page: Some(DocId(1)),
            },
        );

        run(&mut site, &BuildContext::new(&config)).unwrap();

        assert_eq!(site.documents[1].text(), Some("css:Post,/topics/css"));
    }

    #[test]
    fn test_collections_and_is_dev() {
        let dir = template_dir();
        fs::write(
            dir.path().join("index.html"),
            "{% if is_dev %}dev{% endif %}{% for a in collections.articles %}[{{ a.title }}]{% endfor %}",
        )
        .unwrap();
        let mut config = configured(&dir);
        config.production = true;

        let index = doc("index.html", "---\ntemplate: index.html\n---\n");
        let post = doc("articles/x.html", "---\ntitle: X\n---\n");
        let mut site = site(vec![index, post]);
        site.collections.insert("articles".into(), vec![DocId(1)]);

        run(&mut site, &BuildContext::new(&config)).unwrap();

        assert_eq!(site.documents[0].text(), Some("[X]"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let dir = template_dir();
        let config = configured(&dir);
        let mut site = site(vec![doc("a.html", "---\ntemplate: nope.html\n---\n")]);

        let err = run(&mut site, &BuildContext::new(&config)).unwrap_err();
        assert!(format!("{err:#}").contains("a.html"));
    }
}
