use std::fmt::{self, Write};

use crate::pack::{Value, ValueKind};

const INDENT: &str = "    ";

/// Shortest round-trip text for a double, switching to scientific notation for
/// very large and very small magnitudes.
pub(crate) fn format_number(value: f64) -> String {
	if value.is_nan() {
		return "nan".to_owned();
	}
	if value.is_infinite() {
		return if value > 0.0 { "inf".to_owned() } else { "-inf".to_owned() };
	}

	let magnitude = value.abs();
	if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
		return format!("{value:e}");
	}

	let text = format!("{value}");
	if text.contains('.') { text } else { format!("{text}.0") }
}

impl Value {
	/// Write a one-line rendering: the string conversion when one exists,
	/// otherwise `<kind[len]>`.
	pub fn print(&self, out: &mut impl Write) -> fmt::Result {
		match self {
			Value::String(text) => write_escaped(out, text),
			Value::List(items) => write!(out, "<list[{}]>", items.len()),
			Value::Dict(slot) => match slot.get() {
				Some(dict) => write!(out, "<dict[{}]>", dict.len()),
				None => out.write_str("<dict[?]>"),
			},
			Value::Bytes(bytes) => write!(out, "<bytes[{}]>", bytes.len()),
			Value::Struct(bytes) => write!(out, "<struct[{}]>", bytes.len()),
			Value::Saved(saved) => write!(out, "<saved:{} {} {}>", saved.kind().as_str(), saved.compression().as_str(), saved.original_len()),
			_ => match self.try_convert(ValueKind::String) {
				Some(Value::String(text)) => out.write_str(&text),
				_ => write!(out, "<{}>", self.kind()),
			},
		}
	}

	/// Write `name = value` and, for lists and dicts, every child indented by
	/// `level + 1`. Dict children are visited in sorted name order.
	pub fn print_tree(&self, name: &str, level: usize, out: &mut impl Write) -> fmt::Result {
		for _ in 0..level {
			out.write_str(INDENT)?;
		}
		write!(out, "{name} = ")?;
		self.print(out)?;
		out.write_char('\n')?;

		match self {
			Value::List(items) => {
				for (index, item) in items.iter().enumerate() {
					item.print_tree(&format!("[{index}]"), level + 1, out)?;
				}
			}
			Value::Dict(slot) => {
				if let Some(dict) = slot.get() {
					dict.print_children(level + 1, out)?;
				}
			}
			_ => {}
		}

		Ok(())
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.print(f)
	}
}

fn write_escaped(out: &mut impl Write, text: &str) -> fmt::Result {
	for ch in text.chars() {
		match ch {
			'\n' => out.write_str("\\n")?,
			'\r' => out.write_str("\\r")?,
			'\t' => out.write_str("\\t")?,
			c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
			c => out.write_char(c)?,
		}
	}
	Ok(())
}
