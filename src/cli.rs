//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blogsmith static blog builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Production build: drop drafts and clean the output directory first
    #[arg(long, global = true)]
    pub production: bool,

    /// Project root directory
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Config file name (default: blogsmith.toml)
    #[arg(short = 'C', long, default_value = "blogsmith.toml", global = true)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build content and styles, then prune unused CSS
    Compile,

    /// Rebuild the content tree only (markdown, templates, feed)
    Content,

    /// Rebuild the stylesheet only
    Styles,

    /// Remove CSS rules not used by any built page (slow)
    Uncss,

    /// Watch sources, rebuild on change and serve the output directory
    Watch {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// Only watch, do not start the preview server
        #[arg(long)]
        no_serve: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_compile(&self) -> bool {
        matches!(self.command, Commands::Compile)
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
}
