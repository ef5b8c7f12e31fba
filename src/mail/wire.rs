//! Deterministic rendering of wire payloads for dry-run previews.

// self
use crate::_prelude::*;

/// Mailbox label used in previews when no sender resolves.
pub const SELF_MAILBOX: &str = "me";

/// Recursively rebuilds every object with lexicographically ordered keys.
pub fn sort_keys(value: Value) -> Value {
	match value {
		Value::Object(map) => {
			let sorted = map.into_iter().map(|(key, value)| (key, sort_keys(value))).collect::<BTreeMap<_, _>>();

			Value::Object(sorted.into_iter().collect())
		},
		Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
		other => other,
	}
}

/// Renders the dry-run preview: the resolved sender (or [`SELF_MAILBOX`]) followed by the payload
/// pretty-printed with sorted keys.
pub fn render_preview(sender: Option<&str>, payload: Value) -> String {
	format!("[DRY RUN] Payload ready for {}:\n{:#}", sender.unwrap_or(SELF_MAILBOX), sort_keys(payload))
}
