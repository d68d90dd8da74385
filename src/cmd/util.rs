use std::fs;
use std::path::Path;

use respack::pack::{Dict, SavedKind, Value};
use serde::Serialize;

use crate::cmd::{CmdError, CmdResult};

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to serialize json output: {err}"),
	}
}

/// Convert a pack value into a JSON tree.
///
/// Blobs have no JSON form and are rendered as `<kind[len]>` strings.
pub(crate) fn value_json(value: &Value) -> serde_json::Value {
	match value {
		Value::Null => serde_json::Value::Null,
		Value::Bool(flag) => serde_json::Value::Bool(*flag),
		Value::Int(number) => serde_json::Value::from(*number),
		Value::Double(number) => serde_json::Number::from_f64(*number).map_or(serde_json::Value::Null, serde_json::Value::Number),
		Value::String(text) => serde_json::Value::String(text.to_string()),
		Value::List(items) => serde_json::Value::Array(items.iter().map(value_json).collect()),
		Value::Dict(_) => value.as_dict().map_or(serde_json::Value::Null, dict_json),
		Value::Saved(saved) if saved.kind() == SavedKind::Dict => value.dict_value().and_then(|dict| dict.as_dict().map(dict_json)).unwrap_or_else(|| serde_json::Value::String(value.to_string())),
		Value::Ref(name) => serde_json::Value::String(format!("ref:{name}")),
		Value::Bytes(_) | Value::Struct(_) | Value::Saved(_) => serde_json::Value::String(value.to_string()),
	}
}

/// Convert a dict into a JSON object with sorted keys.
pub(crate) fn dict_json(dict: &Dict) -> serde_json::Value {
	let mut object = serde_json::Map::new();
	for name in dict.child_names(true) {
		if let Some(value) = dict.get_ref(&name) {
			object.insert(name.to_string(), value_json(value));
		}
	}
	serde_json::Value::Object(object)
}

/// Write `contents`, creating parent directories.
pub(crate) fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> CmdResult<()> {
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|source| CmdError::Init {
			path: parent.to_path_buf(),
			source,
		})?;
	}

	fs::write(path, contents).map_err(|source| CmdError::Write {
		path: path.to_path_buf(),
		source,
	})
}

/// Render `path` for human and JSON output.
pub(crate) fn display_path(path: &Path) -> String {
	path.display().to_string()
}

#[cfg(test)]
mod tests {
	use respack::pack::{Dict, SavedData, Value};

	use super::{dict_json, value_json};

	#[test]
	fn values_map_onto_json() {
		let mut inner = Dict::new();
		inner.set("k", 1);

		let mut dict = Dict::new();
		dict.set("b", vec![1_u8, 2, 3]);
		dict.set("a", Value::list([Value::Double(0.5), Value::reference("x"), Value::Null]));
		dict.set("c", SavedData::from_dict(&inner, true).expect("dict compresses"));

		let json = dict_json(&dict);
		assert_eq!(json["a"][0], 0.5);
		assert_eq!(json["a"][1], "ref:x");
		assert!(json["a"][2].is_null());
		assert_eq!(json["b"], "<bytes[3]>");
		assert_eq!(json["c"]["k"], 1);
		assert!(value_json(&Value::Double(f64::INFINITY)).is_null());
	}
}
