//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization. The build
//! defaults describe the blog layout the tool was written for: articles under
//! `src/articles`, standalone pages under `src/pages`, topic pages under
//! `src/topics`, Bootstrap sass vendored under `vendor/`.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use super::super::build::{CollectionConfig, PermalinkRule};
    use std::{collections::BTreeMap, path::PathBuf};

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn templates() -> PathBuf {
        "templates".into()
    }

    pub fn partials() -> PathBuf {
        "templates/partials".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn collections() -> BTreeMap<String, CollectionConfig> {
        BTreeMap::from([
            (
                "articles".to_owned(),
                CollectionConfig {
                    pattern: "articles/**/*".into(),
                    sort_by: Some("date".into()),
                    reverse: true,
                },
            ),
            (
                "pages".to_owned(),
                CollectionConfig {
                    pattern: "pages/**/*".into(),
                    sort_by: None,
                    reverse: false,
                },
            ),
            (
                "topics".to_owned(),
                CollectionConfig {
                    pattern: "topics/**/*".into(),
                    sort_by: None,
                    reverse: false,
                },
            ),
        ])
    }

    pub fn permalinks() -> Vec<PermalinkRule> {
        vec![
            PermalinkRule {
                branch: "articles/**/*".into(),
                pattern: ":date/:title".into(),
                date_format: "%Y/%m".into(),
                relative: true,
            },
            PermalinkRule {
                branch: "topics/**/*".into(),
                pattern: ":collection/:title".into(),
                date_format: permalinks::date_format(),
                relative: true,
            },
            PermalinkRule {
                branch: "pages/**/*".into(),
                pattern: ":title".into(),
                date_format: permalinks::date_format(),
                relative: false,
            },
        ]
    }

    pub mod permalinks {
        pub fn date_format() -> String {
            "%Y/%m/%d".into()
        }
    }

    pub mod tags {
        pub fn handle() -> String {
            "tags".into()
        }

        pub fn path() -> String {
            "topics".into()
        }

        pub fn template() -> String {
            "tags.html".into()
        }

        pub fn sort_by() -> Option<String> {
            Some("date".into())
        }
    }

    pub mod feed {
        use std::path::PathBuf;

        pub fn collection() -> String {
            "articles".into()
        }

        pub fn path() -> PathBuf {
            "rss.xml".into()
        }

        pub fn limit() -> usize {
            20
        }
    }

    pub mod widow {
        pub fn selectors() -> Vec<String> {
            ["h1", "h2", "h3", "h4", "h5", "h6", "p", "li"]
                .into_iter()
                .map(String::from)
                .collect()
        }
    }

    pub mod wordcount {
        pub fn words_per_minute() -> usize {
            275
        }
    }
}

// ============================================================================
// [style] Section Defaults
// ============================================================================

pub mod style {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "styles".into()
    }

    pub fn entry() -> PathBuf {
        "main.scss".into()
    }

    pub fn load_paths() -> Vec<PathBuf> {
        vec!["vendor/bootstrap-sass-official/assets/stylesheets".into()]
    }

    pub fn output() -> PathBuf {
        "css/main.css".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8082
    }
}
