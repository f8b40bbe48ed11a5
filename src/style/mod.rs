//! Stylesheet pipeline.
//!
//! ```text
//! styles:  styles/main.scss ──grass──► combine @media ──► lightningcss (autoprefix, condense) ──► build/css/main.css
//! uncss:   build/css/main.css + build/**/*.html ──► drop unused selectors ──► build/css/main.css
//! ```
//!
//! Failures here never abort a content build: [`run_styles`] and
//! [`run_uncss`] log them under the `error` prefix and leave the previous
//! output untouched.

mod mq;
mod uncss;

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, anyhow};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
    targets::{Browsers, Features, Targets},
};
use rayon::prelude::*;
use std::{fs, path::Path};
use uncss::{Ignore, UsedNames};
use walkdir::WalkDir;

/// Browsers the autoprefixer writes for, as `major << 16 | minor << 8`.
const LEGACY_BROWSERS: Browsers = Browsers {
    android: Some((4 << 16) | (4 << 8)),
    chrome: Some(30 << 16),
    edge: None,
    firefox: Some(30 << 16),
    ie: Some(9 << 16),
    ios_saf: Some(7 << 16),
    opera: None,
    safari: Some(7 << 16),
    samsung: None,
};

// ============================================================================
// Styles
// ============================================================================

/// Compile, post-process and write the stylesheet.
pub fn build_styles(config: &SiteConfig) -> Result<()> {
    let compiled = compile_sass(config)?;
    let css = post_process(&compiled, config)?;

    let output = config.style_output();
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output, &css).with_context(|| format!("failed to write {}", output.display()))?;

    log!("styles"; "{} ({})", rel(&output, config), human_size(css.len()));
    Ok(())
}

/// [`build_styles`], with errors logged instead of returned.
pub fn run_styles(config: &SiteConfig) {
    if let Err(err) = build_styles(config) {
        log!("error"; "styles: {err:#}");
    }
}

fn compile_sass(config: &SiteConfig) -> Result<String> {
    let style = &config.style;
    let entry = style.source.join(&style.entry);

    let mut load_paths = vec![style.source.clone()];
    load_paths.extend(style.load_paths.iter().cloned());

    let options = grass::Options::default()
        .load_paths(load_paths.as_slice())
        .style(grass::OutputStyle::Compressed)
        .allows_charset(false);

    grass::from_path(&entry, &options).map_err(|err| anyhow!("{}\n{err}", entry.display()))
}

fn post_process(compiled: &str, config: &SiteConfig) -> Result<String> {
    let targets = targets(config.style.autoprefix);
    let mut sheet = parse_css(compiled)?;
    if config.style.combine_media_queries {
        mq::combine_media_queries(&mut sheet.rules);
    }
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|err| anyhow!("{err}"))?;
    print_css(&sheet, targets)
}

/// Prefixes only when `autoprefix` is set. Media queries always keep the
/// `min-`/`max-` form.
fn targets(autoprefix: bool) -> Targets {
    Targets {
        browsers: autoprefix.then_some(LEGACY_BROWSERS),
        include: Features::MediaQueries,
        ..Targets::default()
    }
}

fn parse_css(css: &str) -> Result<StyleSheet<'_>> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    StyleSheet::parse(css, options).map_err(|err| anyhow!("{err}"))
}

fn print_css(sheet: &StyleSheet<'_>, targets: Targets) -> Result<String> {
    let options = PrinterOptions {
        minify: true,
        targets,
        ..PrinterOptions::default()
    };
    sheet
        .to_css(options)
        .map(|out| out.code)
        .map_err(|err| anyhow!("{err}"))
}

// ============================================================================
// Unused CSS
// ============================================================================

/// Remove selectors that no built page uses from the compiled stylesheet.
pub fn prune_unused(config: &SiteConfig) -> Result<()> {
    let css_path = config.style_output();
    let css = fs::read_to_string(&css_path)
        .with_context(|| format!("failed to read {}", css_path.display()))?;

    let output = &config.build.output;
    let mut pages = Vec::new();
    for entry in WalkDir::new(output) {
        let entry = entry.with_context(|| format!("failed to walk {}", output.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == "html" || ext == "htm")
        {
            pages.push(entry.into_path());
        }
    }

    if pages.is_empty() {
        log!("uncss"; "no pages in {}, stylesheet left as is", output.display());
        return Ok(());
    }

    let htmls = pages
        .par_iter()
        .map(|path| {
            fs::read(path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut used = UsedNames::default();
    for html in &htmls {
        used.add_html(html);
    }
    let ignore = Ignore::new(&config.style.uncss.ignore, &mut used);

    let mut sheet = parse_css(&css)?;
    let removed = uncss::remove_unused(&mut sheet.rules, &used, &ignore);
    let pruned = print_css(&sheet, targets(false))?;
    fs::write(&css_path, &pruned)
        .with_context(|| format!("failed to write {}", css_path.display()))?;

    log!(
        "uncss";
        "{} pages, {removed} selectors removed, {} -> {}",
        pages.len(),
        human_size(css.len()),
        human_size(pruned.len())
    );
    Ok(())
}

/// [`prune_unused`], with errors logged instead of returned.
pub fn run_uncss(config: &SiteConfig) {
    if let Err(err) = prune_unused(config) {
        log!("error"; "uncss: {err:#}");
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn rel(path: &Path, config: &SiteConfig) -> String {
    path.strip_prefix(config.get_root())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("styles")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();

        let mut config = SiteConfig::default();
        config.set_root(root);
        config.build.output = root.join("build");
        config.style.source = root.join("styles");
        config.style.load_paths = vec![root.join("vendor")];
        (dir, config)
    }

    #[test]
    fn test_build_styles_pipeline() {
        let (dir, config) = setup();
        fs::write(
            dir.path().join("vendor/_mixins.scss"),
            "@mixin hide { display: none; }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("styles/main.scss"),
            r#"/*! kept */
@import "mixins";
$brand: #337ab7;
/* dropped */
.nav { a { color: $brand; transform: none; } }
@media (max-width: 767px) { .nav { @include hide; } }
.footer { margin: 0; }
@media (max-width: 767px) { .footer { padding: 0; } }
"#,
        )
        .unwrap();

        build_styles(&config).unwrap();
        let css = fs::read_to_string(config.style_output()).unwrap();

        assert!(css.starts_with("/*! kept */"));
        assert!(!css.contains("dropped"));
        assert!(!css.contains('\n'));

        let nav = &css[css.find(".nav a{").unwrap()..];
        let nav = &nav[..nav.find('}').unwrap()];
        assert!(nav.contains("color:#337ab7"));
        assert!(nav.contains("-webkit-transform:none"));
        assert!(nav.contains("-ms-transform:none"));
        assert!(nav.contains(";transform:none"));

        assert!(css.contains(".footer{margin:0}"));
        assert_eq!(css.matches("@media").count(), 1);
        assert!(css.ends_with("@media (max-width:767px){.nav{display:none}.footer{padding:0}}"));
    }

    #[test]
    fn test_options_disable_post_processing() {
        let (dir, mut config) = setup();
        config.style.autoprefix = false;
        config.style.combine_media_queries = false;
        fs::write(
            dir.path().join("styles/main.scss"),
            "@media print { .a { margin: 1px; } }\n.b { transform: none; }\n",
        )
        .unwrap();

        build_styles(&config).unwrap();
        let css = fs::read_to_string(config.style_output()).unwrap();
        assert_eq!(css, "@media print{.a{margin:1px}}.b{transform:none}");
    }

    #[test]
    fn test_media_queries_keep_min_max_form() {
        let (dir, mut config) = setup();
        config.style.autoprefix = false;
        fs::write(
            dir.path().join("styles/main.scss"),
            "@media (min-width: 768px) and (max-width: 991px) { .a { margin: 0; } }\n",
        )
        .unwrap();

        build_styles(&config).unwrap();
        let css = fs::read_to_string(config.style_output()).unwrap();
        assert!(css.contains("min-width:768px"));
        assert!(css.contains("max-width:991px"));
        assert!(!css.contains("<="));
    }

    #[test]
    fn test_sass_error_writes_nothing() {
        let (dir, config) = setup();
        fs::write(dir.path().join("styles/main.scss"), ".a { color: $undefined; }").unwrap();

        assert!(build_styles(&config).is_err());
        assert!(!config.style_output().exists());
        run_styles(&config);
    }

    #[test]
    fn test_prune_unused() {
        let (dir, mut config) = setup();
        config.style.uncss.ignore = vec![".open".into()];
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("css")).unwrap();
        fs::create_dir_all(build.join("about")).unwrap();
        fs::write(build.join("index.html"), r#"<div class="nav"><p>R&D</p></div>"#).unwrap();
        fs::write(build.join("about/index.html"), r#"<footer id="foot"></footer>"#).unwrap();
        fs::write(
            build.join("css/main.css"),
            ".nav p{margin:1px}.hero{margin:2px}#foot,.missing{margin:3px}.open{margin:4px}@media print{.hero{margin:5px}}",
        )
        .unwrap();

        prune_unused(&config).unwrap();
        assert_eq!(
            fs::read_to_string(build.join("css/main.css")).unwrap(),
            ".nav p{margin:1px}#foot{margin:3px}.open{margin:4px}"
        );
    }

    #[test]
    fn test_prune_walk_error_is_reported() {
        let (dir, mut config) = setup();
        config.build.output = dir.path().join("missing");
        config.style.output = dir.path().join("main.css");
        fs::write(config.style_output(), ".a{margin:0}").unwrap();

        let err = prune_unused(&config).unwrap_err();
        assert!(err.to_string().contains("failed to walk"));
        assert_eq!(fs::read_to_string(config.style_output()).unwrap(), ".a{margin:0}");
    }

    #[test]
    fn test_prune_without_pages_keeps_stylesheet() {
        let (dir, config) = setup();
        let css_dir = dir.path().join("build/css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("main.css"), ".a{x:1}").unwrap();

        prune_unused(&config).unwrap();
        assert_eq!(fs::read_to_string(css_dir.join("main.css")).unwrap(), ".a{x:1}");
    }

    #[test]
    fn test_prune_missing_stylesheet_is_error() {
        let (_dir, config) = setup();
        assert!(prune_unused(&config).is_err());
    }
}
