//! Source text generation for the creation times module.

use crate::resolver::Timestamp;
use chrono::SecondsFormat;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Output flavor of the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFormat {
    /// `export const creationTimes = { "<path>": new Date("<iso>"), ... };`
    Js,
    /// `{ "<path>": "<rfc3339>", ... }`
    Json,
}

/// Render `times` as module source text, keys in sorted order.
pub fn render(times: &BTreeMap<String, Timestamp>, format: ModuleFormat) -> String {
    match format {
        ModuleFormat::Js => render_js(times),
        ModuleFormat::Json => render_json(times),
    }
}

fn render_js(times: &BTreeMap<String, Timestamp>) -> String {
    if times.is_empty() {
        return "export const creationTimes = {};\n".into();
    }

    let entries = times
        .iter()
        .map(|(path, time)| format!("  {}: new Date({}),", quote(path), quote(&iso(time))))
        .collect::<Vec<_>>()
        .join("\n");

    format!("export const creationTimes = {{\n{entries}\n}};\n")
}

fn render_json(times: &BTreeMap<String, Timestamp>) -> String {
    let map: Map<String, Value> = times
        .iter()
        .map(|(path, time)| (path.clone(), Value::String(iso(time))))
        .collect();
    Value::Object(map).to_string()
}

#[inline]
fn iso(time: &Timestamp) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Quote a string as a JSON (and therefore JS) string literal.
#[inline]
fn quote(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}
