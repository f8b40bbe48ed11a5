//! Collections: named, ordered groups of pages.
//!
//! Membership comes from the collection's glob (matched on the source path)
//! or from a `collection` front-matter key naming it. Only pages (Markdown or
//! HTML) join collections; assets under the same directory do not.

use super::{BuildContext, compile_glob, glob_matches};
use crate::{
    config::CollectionConfig,
    content::{DocId, MetaValue, Site, cmp_optional},
    log,
};
use anyhow::Result;
use std::collections::BTreeMap;

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let mut configs: BTreeMap<String, Option<&CollectionConfig>> = ctx
        .config
        .build
        .collections
        .iter()
        .map(|(name, cfg)| (name.clone(), Some(cfg)))
        .collect();
    for doc in &site.documents {
        for name in front_matter_collections(doc.meta.get("collection")) {
            configs.entry(name).or_insert(None);
        }
    }

    site.collections.clear();
    for (name, cfg) in configs {
        let pattern = cfg.map(|c| compile_glob(&c.pattern)).transpose()?;

        let mut members: Vec<DocId> = site
            .ids()
            .filter(|&id| {
                let doc = site.get(id);
                if !(doc.is_markdown() || doc.is_html()) {
                    return false;
                }
                let by_glob = pattern
                    .as_ref()
                    .is_some_and(|p| glob_matches(p, &doc.source_str()));
                by_glob || front_matter_collections(doc.meta.get("collection")).contains(&name)
            })
            .collect();

        if let Some(key) = cfg.and_then(|c| c.sort_by.as_deref()) {
            members.sort_by(|&a, &b| cmp_optional(site.get(a).meta.get(key), site.get(b).meta.get(key)));
        }
        if cfg.is_some_and(|c| c.reverse) {
            members.reverse();
        }

        for (i, &id) in members.iter().enumerate() {
            let previous = i.checked_sub(1).map(|p| members[p]);
            let next = members.get(i + 1).copied();
            let doc = site.get_mut(id);
            doc.collections.push(name.clone());
            doc.previous = previous;
            doc.next = next;
        }

        log!("collections"; "{name}: {} documents", members.len());
        site.collections.insert(name, members);
    }
    Ok(())
}

fn front_matter_collections(value: Option<&MetaValue>) -> Vec<String> {
    match value {
        Some(MetaValue::Str(name)) => vec![name.trim().to_owned()],
        Some(MetaValue::List(names)) => names.iter().map(|n| n.trim().to_owned()).collect(),
        _ => Vec::new(),
    }
}
