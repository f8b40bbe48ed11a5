//! Permalinks: move HTML pages to `<pattern>/index.html`.
//!
//! Rules apply in order, each to the HTML documents whose current output path
//! matches its branch glob. Pattern keys:
//!
//! | Key           | Value                                           |
//! |---------------|-------------------------------------------------|
//! | `:date`       | `date` formatted with the rule's `date_format`  |
//! | `:collection` | first collection the page belongs to, slugified |
//! | `:<key>`      | front-matter value, slugified                   |
//!
//! When a key has no value the page keeps its current location: `dir/name`,
//! or `dir` for an `index` page.

use super::{BuildContext, compile_glob, glob_matches};
use crate::{
    config::PermalinkRule,
    content::{DocId, Document, Site, slash_path},
    log,
    utils::slug::slugify,
};
use anyhow::Result;
use regex::{Captures, Regex};
use std::{
    fmt::Write,
    path::{Path, PathBuf},
    sync::LazyLock,
};

static RE_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":(\w+)").expect("valid regex"));

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let mut moved = 0;
    for rule in &ctx.config.build.permalinks {
        let branch = compile_glob(&rule.branch)?;
        let targets: Vec<DocId> = site
            .ids()
            .filter(|&id| {
                let doc = site.get(id);
                doc.is_html() && doc.copy_of.is_none() && glob_matches(&branch, &doc.output_str())
            })
            .collect();

        for id in targets {
            let path = permalink(site.get(id), rule);
            let doc = site.get_mut(id);
            doc.output = Path::new(&path).join("index.html");
            doc.path = Some(path.clone());
            moved += 1;

            if rule.relative {
                copy_siblings(site, id, &path);
            }
        }
    }
    log!("permalinks"; "{moved} documents relocated");
    Ok(())
}

/// Resolve the URL path (no leading or trailing slash) of `doc` under `rule`.
pub fn permalink(doc: &Document, rule: &PermalinkRule) -> String {
    let mut missing = false;
    let replaced = RE_KEY.replace_all(&rule.pattern, |caps: &Captures<'_>| {
        match key_value(doc, &caps[1], rule) {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing = true;
                String::new()
            }
        }
    });

    if missing {
        return fallback(&doc.output);
    }
    normalize(&replaced)
}

fn key_value(doc: &Document, key: &str, rule: &PermalinkRule) -> Option<String> {
    match key {
        "date" => {
            let date = doc.date()?;
            let mut out = String::new();
            // chrono reports malformed format strings through fmt::Error
            write!(out, "{}", date.format(&rule.date_format)).ok()?;
            Some(out)
        }
        "collection" => doc.collections.first().map(|c| slugify(c)),
        _ => doc.meta.get(key).map(|v| slugify(&v.to_plain_string())),
    }
}

/// Current location without extension: `dir/name`, or `dir` for `index`.
fn fallback(output: &Path) -> String {
    let dir = output.parent().map(slash_path).unwrap_or_default();
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "index" {
        normalize(&dir)
    } else {
        normalize(&format!("{dir}/{stem}"))
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Copy every non-HTML file from the page's source directory next to it.
fn copy_siblings(site: &mut Site, id: DocId, path: &str) {
    let source_dir = site.get(id).source.parent().map(Path::to_path_buf);
    let target_dir = PathBuf::from(path);

    let siblings: Vec<DocId> = site
        .ids()
        .filter(|&other| {
            let doc = site.get(other);
            other != id
                && doc.copy_of.is_none()
                && !doc.is_html()
                && doc.source.parent().map(Path::to_path_buf) == source_dir
        })
        .collect();

    for sibling in siblings {
        let original = site.get(sibling);
        let Some(name) = original.output.file_name() else {
            continue;
        };
        let output = target_dir.join(name);
        if output == original.output {
            continue;
        }
        let mut copy = original.clone();
        copy.output = output;
        copy.copy_of = Some(sibling);
        site.push(copy);
    }
}
