//! Tag index and tag listing pages.
//!
//! Tags come from the configured front-matter key, either a list or a
//! comma-separated string. Every tag gets a listing page at
//! `<tags.path>/<slug>/index.html` rendered with the tag template.

use super::BuildContext;
use crate::{
    config::SiteConfig,
    content::{DocId, Document, MetaValue, Site, TagEntry, cmp_optional},
    log,
    utils::slug::slugify,
};
use anyhow::Result;
use std::collections::BTreeMap;

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let tags_cfg = &ctx.config.build.tags;

    let mut index: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
    for id in site.ids() {
        let tags = read_tags(site.get(id).meta.get(&tags_cfg.handle));
        for tag in &tags {
            index.entry(tag.clone()).or_default().push(id);
        }
        site.get_mut(id).tags = tags;
    }

    site.tags.clear();
    for (tag, mut documents) in index {
        if let Some(key) = tags_cfg.sort_by.as_deref() {
            documents.sort_by(|&a, &b| {
                cmp_optional(site.get(a).meta.get(key), site.get(b).meta.get(key))
            });
        }
        if tags_cfg.reverse {
            documents.reverse();
        }

        let slug = slugify(&tag);
        let page = site.push(listing_page(&tag, &slug, ctx.config));
        site.tags.insert(
            tag,
            TagEntry {
                slug,
                documents,
                page: Some(page),
            },
        );
    }

    log!("tags"; "{} tags", site.tags.len());
    Ok(())
}

/// Normalize a tag handle value: trimmed, non-empty, first occurrence kept.
pub fn read_tags(value: Option<&MetaValue>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(MetaValue::List(items)) => items.clone(),
        Some(MetaValue::Str(s)) => s.split(',').map(str::to_owned).collect(),
        _ => return Vec::new(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

fn listing_page(tag: &str, slug: &str, config: &SiteConfig) -> Document {
    let tags_cfg = &config.build.tags;
    let output = format!("{}/{slug}/index.html", tags_cfg.path.trim_matches('/'));

    let mut page = Document::new(output, Vec::new());
    page.meta.insert(
        "template".into(),
        MetaValue::Str(tags_cfg.template.clone()),
    );
    page.listing_tag = Some(tag.to_owned());
    page
}
