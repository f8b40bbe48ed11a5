//! File system watcher.
//!
//! Every relevant event triggers a rebuild right away; there is no debounce
//! and no cancellation, so the last rebuild to finish wins.
//!
//! ```text
//! styles/**          ──► style pipeline
//! src/**, templates/ ──► content pipeline
//! ```

use crate::{build::build_content, config::SiteConfig, log, style};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::Path;

// =============================================================================
// Path Utilities
// =============================================================================

/// What a changed file rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Content,
    Styles,
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

fn categorize(path: &Path, config: &SiteConfig) -> Option<Trigger> {
    if is_temp_file(path) || path.starts_with(&config.build.output) {
        return None;
    }
    if path.starts_with(&config.style.source) {
        let is_style = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext, "scss" | "sass" | "css"));
        return is_style.then_some(Trigger::Styles);
    }
    let build = &config.build;
    [&build.source, &build.templates, &build.partials]
        .into_iter()
        .any(|dir| path.starts_with(dir))
        .then_some(Trigger::Content)
}

/// Distinct triggers of an event, in path order.
fn triggers(event: &Event, config: &SiteConfig) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    for trigger in event.paths.iter().filter_map(|p| categorize(p, config)) {
        if !triggers.contains(&trigger) {
            triggers.push(trigger);
        }
    }
    triggers
}

/// `/proj/src/articles/a.md` → `src/articles/a.md`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// =============================================================================
// Event Handler
// =============================================================================

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

fn handle_event(event: &Event, config: &'static SiteConfig) {
    let trigger_path = event
        .paths
        .first()
        .map(|p| rel_path(p, config.get_root()))
        .unwrap_or_default();

    for trigger in triggers(event, config) {
        match trigger {
            Trigger::Content => {
                log!("watch"; "{trigger_path} changed, rebuilding content");
                if let Err(err) = build_content(config) {
                    log!("error"; "content build failed: {err:#}");
                }
            }
            Trigger::Styles => {
                log!("watch"; "{trigger_path} changed, rebuilding styles");
                style::run_styles(config);
            }
        }
    }
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let mut watched = Vec::new();

    for dir in [&config.style.source, &config.build.source, &config.build.templates] {
        if !dir.exists() {
            continue;
        }
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        watched.push(format!("{}/", rel_path(dir, root)));
    }
    // Partials usually live under templates/ and are already covered
    let partials = &config.build.partials;
    if partials.exists() && !partials.starts_with(&config.build.templates) {
        watcher
            .watch(partials, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", partials.display()))?;
        watched.push(format!("{}/", rel_path(partials, root)));
    }

    log!("watch"; "watching {}", watched.join(", "));
    Ok(())
}

// =============================================================================
// Public API
// =============================================================================

/// Watch sources and rebuild on every change. Blocks until the channel closes.
pub fn watch_for_changes_blocking(config: &'static SiteConfig) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    for result in rx {
        match result {
            Ok(event) if is_relevant(&event) => handle_event(&event, config),
            Ok(_) => {}
            Err(e) => log!("watch"; "error: {e}"),
        }
    }

    Ok(())
}
