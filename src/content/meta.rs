//! Front-matter values.

use crate::utils::date::{from_epoch_millis, parse_date};
use chrono::NaiveDateTime;
use serde_json::{Value as JsonValue, json};
use serde_yaml::Value as YamlValue;
use std::cmp::Ordering;

/// Serialized form of [`MetaValue::Date`] inside templates.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single front-matter value.
///
/// Strings that parse as a date become [`MetaValue::Date`], so sorting by
/// `date` orders chronologically whether or not the value was quoted.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDateTime),
    List(Vec<String>),
}

impl MetaValue {
    /// Convert a YAML value. Nulls and nested mappings have no counterpart.
    pub fn from_yaml(value: &YamlValue) -> Option<Self> {
        match value {
            YamlValue::Bool(b) => Some(Self::Bool(*b)),
            YamlValue::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            YamlValue::String(s) => Some(
                parse_date(s)
                    .map(Self::Date)
                    .unwrap_or_else(|| Self::Str(s.clone())),
            ),
            YamlValue::Sequence(items) => {
                Some(Self::List(items.iter().filter_map(scalar_string).collect()))
            }
            YamlValue::Tagged(tagged) => Self::from_yaml(&tagged.value),
            YamlValue::Null | YamlValue::Mapping(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Date view: a date, a date string, or epoch milliseconds.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(dt) => Some(*dt),
            Self::Str(s) => parse_date(s),
            Self::Int(ms) => from_epoch_millis(*ms),
            _ => None,
        }
    }

    /// Plain-text rendering, used for permalink keys and tag lists.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::Date(dt) => dt.format(DATE_FORMAT).to_string(),
            Self::List(items) => items.join(", "),
        }
    }

    /// Value exposed to templates.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b) => json!(b),
            Self::Int(i) => json!(i),
            Self::Float(f) => json!(f),
            Self::Str(s) => json!(s),
            Self::Date(dt) => json!(dt.format(DATE_FORMAT).to_string()),
            Self::List(items) => json!(items),
        }
    }

    /// Total order used when sorting collections and tag listings.
    ///
    /// Values of the same kind compare naturally; numbers compare across
    /// `Int`/`Float`; mismatched kinds order by kind.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Date(_) => 2,
            Self::Str(_) => 3,
            Self::List(_) => 4,
        }
    }
}

/// Sort key comparison where a missing key sorts first.
pub fn cmp_optional(a: Option<&MetaValue>, b: Option<&MetaValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.sort_cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn scalar_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
