//! YAML front-matter extraction.
//!
//! A document has front-matter when its first line is `---`; the block ends
//! at the next line that is `---` or `...`.

use super::meta::MetaValue;
use anyhow::{Context, Result, bail};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

pub type Metadata = BTreeMap<String, MetaValue>;

/// Split `text` into (yaml, body). `None` when there is no front-matter.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse front-matter. Returns empty metadata and the whole text when absent.
pub fn parse(text: &str) -> Result<(Metadata, &str)> {
    let Some((yaml, body)) = split(text) else {
        return Ok((Metadata::new(), text));
    };
    if yaml.trim().is_empty() {
        return Ok((Metadata::new(), body));
    }

    let value: YamlValue = serde_yaml::from_str(yaml).context("invalid front-matter")?;
    let YamlValue::Mapping(mapping) = value else {
        bail!("front-matter must be a mapping of keys to values");
    };

    let meta = mapping
        .iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?.to_owned();
            MetaValue::from_yaml(value).map(|v| (key, v))
        })
        .collect();
    Ok((meta, body))
}
