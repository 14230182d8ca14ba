//! Change summaries for audit entries

use serde_json::Value;

const MAX_STRING_LEN: usize = 40;

/// Describe what changed between two serialized entities.
///
/// Nested objects are walked and reported with dotted paths
/// (`policy.rounding_mode: "round" -> "floor"`). Returns `None` when nothing
/// changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect(before, after, "", &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect(before: &Value, after: &Value, path: &str, out: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, old_val) in old {
                let field = join_path(path, key);
                match new.get(key) {
                    Some(new_val) => collect(old_val, new_val, &field, out),
                    None => out.push(format!("{}: {} -> (removed)", field, render(old_val))),
                }
            }
            for (key, new_val) in new {
                if !old.contains_key(key) {
                    out.push(format!(
                        "{}: (added) -> {}",
                        join_path(path, key),
                        render(new_val)
                    ));
                }
            }
        }
        _ if before != after => {
            let label = if path.is_empty() { "value" } else { path };
            out.push(format!("{}: {} -> {}", label, render(before), render(after)));
        }
        _ => {}
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
