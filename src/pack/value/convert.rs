use std::sync::Arc;

use crate::pack::{Dict, PackWriter, SavedData, SavedKind, Value, ValueKind};

type ConvertFn = fn(&Value) -> Option<Value>;

/// Registered one-directional conversions, looked up by `(from, to)`.
const CONVERSIONS: &[(ValueKind, ValueKind, ConvertFn)] = &[
	(ValueKind::Null, ValueKind::String, null_to_string),
	(ValueKind::Bool, ValueKind::String, bool_to_string),
	(ValueKind::Bool, ValueKind::Int, bool_to_int),
	(ValueKind::Int, ValueKind::String, int_to_string),
	(ValueKind::Int, ValueKind::Double, int_to_double),
	(ValueKind::Int, ValueKind::Bool, int_to_bool),
	(ValueKind::Double, ValueKind::String, double_to_string),
	(ValueKind::Double, ValueKind::Int, double_to_int),
	(ValueKind::String, ValueKind::Int, string_to_int),
	(ValueKind::String, ValueKind::Double, string_to_double),
	(ValueKind::String, ValueKind::Bool, string_to_bool),
	(ValueKind::Ref, ValueKind::String, ref_to_string),
	(ValueKind::Struct, ValueKind::Bytes, struct_to_bytes),
	(ValueKind::Dict, ValueKind::Bytes, dict_to_bytes),
	(ValueKind::Dict, ValueKind::Saved, dict_to_saved),
	(ValueKind::Bytes, ValueKind::Dict, bytes_to_dict),
	(ValueKind::Bytes, ValueKind::Saved, bytes_to_saved),
	(ValueKind::Saved, ValueKind::Bytes, saved_to_bytes),
	(ValueKind::Saved, ValueKind::Dict, saved_to_dict),
];

pub(super) fn convert(value: &Value, target: ValueKind) -> Option<Value> {
	let from = value.kind();
	let (_, _, func) = CONVERSIONS.iter().find(|(source, dest, _)| *source == from && *dest == target)?;
	func(value)
}

fn null_to_string(_: &Value) -> Option<Value> {
	Some(Value::from("null"))
}

fn bool_to_string(value: &Value) -> Option<Value> {
	match value {
		Value::Bool(flag) => Some(Value::from(if *flag { "true" } else { "false" })),
		_ => None,
	}
}

fn bool_to_int(value: &Value) -> Option<Value> {
	match value {
		Value::Bool(flag) => Some(Value::Int(i32::from(*flag))),
		_ => None,
	}
}

fn int_to_string(value: &Value) -> Option<Value> {
	match value {
		Value::Int(number) => Some(Value::from(number.to_string())),
		_ => None,
	}
}

fn int_to_double(value: &Value) -> Option<Value> {
	match value {
		Value::Int(number) => Some(Value::Double(f64::from(*number))),
		_ => None,
	}
}

fn int_to_bool(value: &Value) -> Option<Value> {
	match value {
		Value::Int(number) => Some(Value::Bool(*number != 0)),
		_ => None,
	}
}

fn double_to_string(value: &Value) -> Option<Value> {
	match value {
		Value::Double(number) => Some(Value::from(super::format_number(*number))),
		_ => None,
	}
}

fn double_to_int(value: &Value) -> Option<Value> {
	match value {
		Value::Double(number) if number.fract() == 0.0 && *number >= f64::from(i32::MIN) && *number <= f64::from(i32::MAX) => {
			Some(Value::Int(*number as i32))
		}
		_ => None,
	}
}

fn string_to_int(value: &Value) -> Option<Value> {
	value.as_str()?.trim().parse::<i32>().ok().map(Value::Int)
}

fn string_to_double(value: &Value) -> Option<Value> {
	value.as_str()?.trim().parse::<f64>().ok().map(Value::Double)
}

fn string_to_bool(value: &Value) -> Option<Value> {
	match value.as_str()? {
		"true" => Some(Value::Bool(true)),
		"false" => Some(Value::Bool(false)),
		_ => None,
	}
}

fn ref_to_string(value: &Value) -> Option<Value> {
	value.as_ref_name().map(|name| Value::from(format!("ref:{name}")))
}

fn struct_to_bytes(value: &Value) -> Option<Value> {
	match value {
		Value::Struct(bytes) => Some(Value::Bytes(bytes.clone())),
		_ => None,
	}
}

fn dict_to_bytes(value: &Value) -> Option<Value> {
	let Value::Dict(slot) = value else {
		return None;
	};

	if let Some(raw) = slot.raw_bytes() {
		return Some(Value::Bytes(Arc::from(raw)));
	}

	let mut writer = PackWriter::new();
	slot.get()?.save(&mut writer, None);
	Some(Value::from(writer.into_bytes()))
}

fn dict_to_saved(value: &Value) -> Option<Value> {
	SavedData::from_dict(value.as_dict()?, false).ok().map(Value::from)
}

fn bytes_to_dict(value: &Value) -> Option<Value> {
	Dict::load(value.as_bytes()?).ok().map(Value::from)
}

fn bytes_to_saved(value: &Value) -> Option<Value> {
	SavedData::from_bytes(value.as_bytes()?, false).ok().map(Value::from)
}

fn saved_to_bytes(value: &Value) -> Option<Value> {
	match value {
		Value::Saved(saved) if saved.kind() == SavedKind::Bytes => saved.load_bytes().ok().map(Value::from),
		_ => None,
	}
}

fn saved_to_dict(value: &Value) -> Option<Value> {
	match value {
		Value::Saved(saved) if saved.kind() == SavedKind::Dict => saved.load_dict().ok().map(Value::from),
		_ => None,
	}
}
