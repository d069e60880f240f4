//! Console output for pages and sites.

use serde::Serialize;
use serde_json::Value;

/// Leaf values longer than this are cut in the listing (not in `--json`).
const MAX_VALUE_CHARS: usize = 200;

/// Serialize `item` and render it as pretty JSON or as a nested listing.
pub fn render<T: Serialize>(item: &T, json: bool) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(item)?;
    if json {
        serde_json::to_string_pretty(&value)
    } else {
        let mut out = String::new();
        write_properties(&value, "", &mut out);
        Ok(out)
    }
}

/// `key: value` per line; objects and arrays open an indented block.
/// Array elements are keyed by index.
fn write_properties(value: &Value, prefix: &str, out: &mut String) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                write_entry(key, v, prefix, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                write_entry(&i.to_string(), v, prefix, out);
            }
        }
        leaf => out.push_str(&format!("{}{}\n", prefix, leaf_text(leaf))),
    }
}

fn write_entry(key: &str, value: &Value, prefix: &str, out: &mut String) {
    match value {
        Value::Object(_) | Value::Array(_) => {
            out.push_str(&format!("{}{}:\n", prefix, key));
            write_properties(value, &format!("{}  ", prefix), out);
        }
        leaf => out.push_str(&format!("{}{}: {}\n", prefix, key, leaf_text(leaf))),
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(s) => truncate(s, MAX_VALUE_CHARS),
        other => other.to_string(),
    }
}

/// Truncate to `max_len` characters, ending with an ellipsis when cut.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
