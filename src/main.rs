//! blogsmith - build tool for a Markdown blog.

mod build;
mod cli;
mod config;
mod content;
mod helpers;
mod logger;
mod pipeline;
mod render;
mod serve;
mod style;
mod utils;
mod watch;

use anyhow::Result;
use build::{build_content, clean_output};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(SiteConfig::load(cli)?));

    match &cli.command {
        Commands::Compile => {
            build_all(config)?;
            style::run_uncss(config);
            Ok(())
        }
        Commands::Content => {
            if config.production {
                clean_output(&config.build.output)?;
            }
            build_content(config)
        }
        Commands::Styles => {
            style::run_styles(config);
            Ok(())
        }
        Commands::Uncss => {
            style::run_uncss(config);
            Ok(())
        }
        Commands::Watch { no_serve, .. } => {
            build_all(config)?;
            if *no_serve {
                return watch_for_changes_blocking(config);
            }
            std::thread::spawn(move || {
                if let Err(err) = watch_for_changes_blocking(config) {
                    log!("watch"; "{err}");
                }
            });
            serve_site(config)
        }
    }
}

/// Build content and styles side by side.
///
/// Output cleanup happens first in production. A style failure is logged
/// and does not fail the build.
fn build_all(config: &'static SiteConfig) -> Result<()> {
    if config.production {
        clean_output(&config.build.output)?;
    }

    let (content_result, ()) = rayon::join(
        || build_content(config),
        || style::run_styles(config),
    );
    content_result
}
