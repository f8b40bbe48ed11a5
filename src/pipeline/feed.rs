//! RSS 2.0 feed of one collection.

use super::{BuildContext, BuildError};
use crate::{
    content::{Document, Site},
    log,
    utils::date::to_rfc2822,
};
use anyhow::{Result, anyhow};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};

pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let feed = &ctx.config.build.feed;
    if !feed.enable {
        return Ok(());
    }
    let info = &ctx.config.site;
    let url = info.url.as_deref().ok_or(BuildError::MissingSiteUrl)?;
    let base = url.trim_end_matches('/');

    let Some(members) = site.collections.get(&feed.collection) else {
        log!("feed"; "collection `{}` does not exist, feed skipped", feed.collection);
        return Ok(());
    };

    let items: Vec<rss::Item> = members
        .iter()
        .take(feed.limit)
        .map(|&id| feed_item(site.get(id), base))
        .collect();
    let count = items.len();

    let description = if info.description.is_empty() {
        info.title.clone()
    } else {
        info.description.clone()
    };
    let channel = ChannelBuilder::default()
        .title(info.title.clone())
        .link(url.to_owned())
        .description(description)
        .language(Some(info.language.clone()))
        .generator(Some("blogsmith".to_owned()))
        .last_build_date(Some(to_rfc2822(ctx.now)))
        .items(items)
        .build();
    channel
        .validate()
        .map_err(|e| anyhow!("rss validation failed: {e}"))?;

    site.push(Document::new(&feed.path, channel.to_string().into_bytes()));
    log!("feed"; "{} ({count} items)", feed.path.display());
    Ok(())
}

fn feed_item(doc: &Document, base: &str) -> rss::Item {
    let link = format!("{base}/{}", doc.url_path());
    let description = doc
        .excerpt
        .clone()
        .or_else(|| doc.text().map(str::to_owned));
    let categories = doc
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(doc.title().map(str::to_owned))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(description)
        .pub_date(doc.date().map(to_rfc2822))
        .categories(categories)
        .build()
}
