//! Schema-tolerant discovery of queue-count objects in a JSON document.
//!
//! The walk is depth-first: object members in document order, array
//! elements by ascending index. Every object that passes
//! [`is_counts_object`] is reported, and the walk continues into its children
//! either way, so nested count objects are found too.
//!
//! `serde_json::Value` is an owned tree and the parser caps nesting depth, so
//! the recursion always terminates without a cycle guard.

use crate::counts::is_counts_object;
use serde_json::{
    Map,
    Value,
};

/// Path label used for the document root.
pub const ROOT_LABEL: &str = "root";

/// Own fields that name a counts object, in priority order.
const NAME_FIELDS: [&str; 3] = ["queue", "name", "job"];

/// A counts object found in the document, together with the name it was
/// found under. Borrowed from the document and discarded after aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueueObservation<'a> {
    /// The object's own `queue`/`name`/`job` value, or its JSON path.
    pub path: String,
    pub counts: &'a Map<String, Value>,
}

/// Walks `value` and collects every counts object it contains.
pub fn extract_queues<'a>(value: &'a Value, label: &str) -> Vec<RawQueueObservation<'a>> {
    let mut found = Vec::new();
    walk(value, label, &mut found);
    trace!(count = found.len(), "extracted counts objects");
    found
}

fn walk<'a>(value: &'a Value, path: &str, found: &mut Vec<RawQueueObservation<'a>>) {
    match value {
        Value::Object(object) => {
            if is_counts_object(object) {
                let name = derived_name(object).unwrap_or_else(|| path.to_string());
                trace!(%name, %path, "found counts object");
                found.push(RawQueueObservation { path: name, counts: object });
            }
            for (key, child) in object {
                walk(child, &format!("{path}.{key}"), found);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &format!("{path}[{index}]"), found);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Empty strings and zero are treated as absent so the next field, or the
/// path, is used instead. Nested values never name a queue.
fn derived_name(object: &Map<String, Value>) -> Option<String> {
    NAME_FIELDS.iter().find_map(|field| match object.get(*field)? {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    })
}
