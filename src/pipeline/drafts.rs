//! Draft handling.

use super::BuildContext;
use crate::{content::Site, log};
use anyhow::Result;

/// Drop `draft: true` documents in production; keep everything otherwise.
pub fn run(site: &mut Site, ctx: &BuildContext<'_>) -> Result<()> {
    let drafts = site.documents.iter().filter(|d| d.is_draft()).count();
    if drafts == 0 {
        return Ok(());
    }

    if ctx.production() {
        site.documents.retain(|d| !d.is_draft());
        log!("drafts"; "dropped {drafts} drafts");
    } else {
        log!("drafts"; "keeping {drafts} drafts (development build)");
    }
    Ok(())
}
