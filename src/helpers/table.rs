//! Helper table installed into the template engine for one build.

use super::{
    copyright_year, format_date, format_date_only, if_day_same, is_current_section, is_same_day,
    link_to, link_to_permalink, link_to_topic,
};
use crate::utils::date::{from_epoch_millis, parse_date};
use chrono::NaiveDateTime;
use std::{collections::BTreeMap, collections::HashMap, sync::Arc};
use tera::{Tera, Value};

type Args = HashMap<String, Value>;
type FunctionFn = dyn Fn(&Args) -> tera::Result<Value> + Send + Sync;
type FilterFn = dyn Fn(&Value, &Args) -> tera::Result<Value> + Send + Sync;
type TestFn = dyn Fn(Option<&Value>, &[Value]) -> tera::Result<bool> + Send + Sync;

/// Named template helpers.
///
/// | Kind     | Names                                                           |
/// |----------|-----------------------------------------------------------------|
/// | function | `link_to`, `link_to_permalink`, `link_to_topic`,                |
/// |          | `is_current_section`, `if_day_same`, `copyright_year`           |
/// | filter   | `format_date`, `format_date_only`                               |
/// | test     | `same_day`                                                      |
///
/// Function and filter output is marked safe, so the anchors they build are
/// not escaped.
#[derive(Clone, Default)]
pub struct HelperTable {
    functions: BTreeMap<&'static str, Arc<FunctionFn>>,
    filters: BTreeMap<&'static str, Arc<FilterFn>>,
    tests: BTreeMap<&'static str, Arc<TestFn>>,
}

impl HelperTable {
    /// The blog's helper set. `now` fixes what `copyright_year` reports.
    pub fn standard(now: NaiveDateTime) -> Self {
        let mut table = Self::default();

        table.function("link_to", |args| {
            let href = str_arg(args, "link_to", "href")?;
            let title = opt_str_arg(args, "title");
            Ok(Value::String(link_to(href, title)))
        });
        table.function("link_to_permalink", |args| {
            let href = str_arg(args, "link_to_permalink", "href")?;
            let title = str_arg(args, "link_to_permalink", "title")?;
            Ok(Value::String(link_to_permalink(href, title)))
        });
        table.function("link_to_topic", |args| {
            let topic = str_arg(args, "link_to_topic", "topic")?;
            Ok(Value::String(link_to_topic(topic)))
        });
        table.function("is_current_section", |args| {
            let href = opt_str_arg(args, "href").unwrap_or_default();
            let url = opt_str_arg(args, "url").unwrap_or_default();
            Ok(Value::String(is_current_section(href, url).to_owned()))
        });
        table.function("if_day_same", |args| {
            let a = date_arg(args, "if_day_same", "a")?;
            let b = date_arg(args, "if_day_same", "b")?;
            let then = args.get("then").cloned().unwrap_or_default();
            let otherwise = args.get("otherwise").cloned().unwrap_or_default();
            Ok(if_day_same(a, b, then, otherwise))
        });
        table.function("copyright_year", move |_| {
            Ok(Value::String(copyright_year(now)))
        });

        table.filter("format_date", |value, _| {
            Ok(Value::String(format_date(date_value(value, "format_date")?)))
        });
        table.filter("format_date_only", |value, _| {
            Ok(Value::String(format_date_only(date_value(value, "format_date_only")?)))
        });

        table.test("same_day", |value, args| {
            let a = value
                .ok_or_else(|| tera::Error::msg("`same_day` needs a date to test"))?;
            let b = args
                .first()
                .ok_or_else(|| tera::Error::msg("`same_day` needs a date to compare with"))?;
            Ok(is_same_day(date_value(a, "same_day")?, date_value(b, "same_day")?))
        });

        table
    }

    pub fn function<F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(&Args) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name, Arc::new(f));
        self
    }

    pub fn filter<F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(&Value, &Args) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name, Arc::new(f));
        self
    }

    pub fn test<F>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(Option<&Value>, &[Value]) -> tera::Result<bool> + Send + Sync + 'static,
    {
        self.tests.insert(name, Arc::new(f));
        self
    }

    /// Register every helper with `tera`.
    pub fn install(&self, tera: &mut Tera) {
        for (name, f) in &self.functions {
            tera.register_function(name, SafeFunction(Arc::clone(f)));
        }
        for (name, f) in &self.filters {
            tera.register_filter(name, SafeFilter(Arc::clone(f)));
        }
        for (name, f) in &self.tests {
            tera.register_tester(name, SharedTest(Arc::clone(f)));
        }
    }

    /// All registered names, functions first.
    pub fn names(&self) -> Vec<&'static str> {
        self.functions
            .keys()
            .chain(self.filters.keys())
            .chain(self.tests.keys())
            .copied()
            .collect()
    }
}

// ============================================================================
// Tera adapters
// ============================================================================

struct SafeFunction(Arc<FunctionFn>);

impl tera::Function for SafeFunction {
    fn call(&self, args: &Args) -> tera::Result<Value> {
        (self.0)(args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct SafeFilter(Arc<FilterFn>);

impl tera::Filter for SafeFilter {
    fn filter(&self, value: &Value, args: &Args) -> tera::Result<Value> {
        (self.0)(value, args)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct SharedTest(Arc<TestFn>);

impl tera::Test for SharedTest {
    fn test(&self, value: Option<&Value>, args: &[Value]) -> tera::Result<bool> {
        (self.0)(value, args)
    }
}

// ============================================================================
// Argument access
// ============================================================================

fn str_arg<'a>(args: &'a Args, helper: &str, key: &str) -> tera::Result<&'a str> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        tera::Error::msg(format!("`{helper}` requires a string argument `{key}`"))
    })
}

fn opt_str_arg<'a>(args: &'a Args, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn date_arg(args: &Args, helper: &str, key: &str) -> tera::Result<NaiveDateTime> {
    let value = args
        .get(key)
        .ok_or_else(|| tera::Error::msg(format!("`{helper}` requires a date argument `{key}`")))?;
    date_value(value, helper)
}

/// Dates reach templates as strings; epoch milliseconds are accepted too.
fn date_value(value: &Value, helper: &str) -> tera::Result<NaiveDateTime> {
    let parsed = match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n.as_i64().and_then(from_epoch_millis),
        _ => None,
    };
    parsed.ok_or_else(|| tera::Error::msg(format!("`{helper}`: `{value}` is not a date")))
}
