//! JSON text to [`Dict`] and back.
//!
//! The accepted grammar is JSON plus `//` and `/* */` comments and trailing
//! commas. The root must be an object.

use std::fmt::Write;

use crate::pack::{Dict, PackError, Result, SavedKind, Value, format_number};

mod token;

use token::{Token, TokenKind, Tokenizer};

const MAX_DEPTH: usize = 256;
const EXCERPT_CHARS: usize = 32;
const INDENT: usize = 2;

/// Parse JSON text whose root is an object.
pub fn json_parse(text: &str) -> Result<Dict> {
	let mut parser = Parser {
		tokens: Tokenizer::new(text),
		text,
		depth: 0,
	};

	let first = parser.tokens.next_token();
	if first.kind != TokenKind::OpenCurly {
		return Err(parser.error(first));
	}

	let dict = parser.object()?;
	let rest = parser.tokens.next_token();
	if rest.kind != TokenKind::End {
		return Err(parser.error(rest));
	}

	Ok(dict)
}

/// Render `dict` as indented JSON with sorted keys.
///
/// Refs are written as `"ref:name"` strings. Byte blobs, struct bytes and
/// non-finite doubles have no JSON form and are written as `null`.
pub fn json_write(dict: &Dict) -> String {
	let mut out = String::new();
	write_object(dict, 0, &mut out);
	out.push('\n');
	out
}

struct Parser<'a> {
	tokens: Tokenizer<'a>,
	text: &'a str,
	depth: usize,
}

impl Parser<'_> {
	fn error(&self, token: Token) -> PackError {
		let offset = token.start.min(self.text.len());
		let excerpt = self.text.get(offset..).unwrap_or_default().chars().take(EXCERPT_CHARS).collect();
		PackError::JsonParse { offset, excerpt }
	}

	fn enter(&mut self, token: Token) -> Result<()> {
		self.depth += 1;
		if self.depth > MAX_DEPTH {
			return Err(self.error(token));
		}
		Ok(())
	}

	/// Parse object members after the opening brace.
	fn object(&mut self) -> Result<Dict> {
		let mut dict = Dict::new();
		let mut token = self.tokens.next_token();

		while token.kind != TokenKind::CloseCurly {
			if token.kind != TokenKind::String {
				return Err(self.error(token));
			}
			let key = self.string(token)?;

			let colon = self.tokens.next_token();
			if colon.kind != TokenKind::Colon {
				return Err(self.error(colon));
			}

			let first = self.tokens.next_token();
			let value = self.value(first)?;
			dict.set(&key, value);

			token = self.tokens.next_token();
			match token.kind {
				TokenKind::Comma => token = self.tokens.next_token(),
				TokenKind::CloseCurly => {}
				_ => return Err(self.error(token)),
			}
		}

		Ok(dict)
	}

	/// Parse array items after the opening bracket.
	fn array(&mut self) -> Result<Vec<Value>> {
		let mut items = Vec::new();
		let mut token = self.tokens.next_token();

		while token.kind != TokenKind::CloseBracket {
			items.push(self.value(token)?);

			token = self.tokens.next_token();
			match token.kind {
				TokenKind::Comma => token = self.tokens.next_token(),
				TokenKind::CloseBracket => {}
				_ => return Err(self.error(token)),
			}
		}

		Ok(items)
	}

	fn value(&mut self, token: Token) -> Result<Value> {
		match token.kind {
			TokenKind::True => Ok(Value::Bool(true)),
			TokenKind::False => Ok(Value::Bool(false)),
			TokenKind::Null => Ok(Value::Null),
			TokenKind::String => Ok(Value::from(self.string(token)?)),
			TokenKind::Number => self.number(token),
			TokenKind::OpenCurly => {
				self.enter(token)?;
				let dict = self.object()?;
				self.depth -= 1;
				Ok(Value::from(dict))
			}
			TokenKind::OpenBracket => {
				self.enter(token)?;
				let items = self.array()?;
				self.depth -= 1;
				Ok(Value::from(items))
			}
			_ => Err(self.error(token)),
		}
	}

	fn string(&self, token: Token) -> Result<String> {
		let raw = self.tokens.text(token);
		token::unescape(&raw[1..raw.len() - 1]).ok_or_else(|| self.error(token))
	}

	/// Integral numbers inside the `i32` range become ints, everything else doubles.
	fn number(&self, token: Token) -> Result<Value> {
		let number: f64 = self.tokens.text(token).parse().map_err(|_| self.error(token))?;
		if number.fract() == 0.0 && number >= f64::from(i32::MIN) && number <= f64::from(i32::MAX) {
			Ok(Value::Int(number as i32))
		} else {
			Ok(Value::Double(number))
		}
	}
}

fn write_object(dict: &Dict, level: usize, out: &mut String) {
	let names = dict.child_names(true);
	if names.is_empty() {
		out.push_str("{}");
		return;
	}

	out.push_str("{\n");
	for (index, name) in names.iter().enumerate() {
		push_indent(level + 1, out);
		write_string(name, out);
		out.push_str(": ");
		if let Some(value) = dict.get_ref(name) {
			write_value(value, level + 1, out);
		}
		if index + 1 < names.len() {
			out.push(',');
		}
		out.push('\n');
	}
	push_indent(level, out);
	out.push('}');
}

fn write_value(value: &Value, level: usize, out: &mut String) {
	match value {
		Value::Null | Value::Bytes(_) | Value::Struct(_) => out.push_str("null"),
		Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
		Value::Int(number) => {
			let _ = write!(out, "{number}");
		}
		Value::Double(number) if number.is_finite() => out.push_str(&format_number(*number)),
		Value::Double(_) => out.push_str("null"),
		Value::String(text) => write_string(text, out),
		Value::Ref(name) => write_string(&format!("ref:{name}"), out),
		Value::List(items) => {
			if items.is_empty() {
				out.push_str("[]");
				return;
			}

			out.push_str("[\n");
			for (index, item) in items.iter().enumerate() {
				push_indent(level + 1, out);
				write_value(item, level + 1, out);
				if index + 1 < items.len() {
					out.push(',');
				}
				out.push('\n');
			}
			push_indent(level, out);
			out.push(']');
		}
		Value::Dict(slot) => match slot.get() {
			Some(dict) => write_object(dict, level, out),
			None => out.push_str("null"),
		},
		Value::Saved(saved) if saved.kind() == SavedKind::Dict => match saved.load_dict() {
			Ok(dict) => write_object(&dict, level, out),
			Err(_) => out.push_str("null"),
		},
		Value::Saved(_) => out.push_str("null"),
	}
}

fn write_string(text: &str, out: &mut String) {
	out.push('"');
	for ch in text.chars() {
		match ch {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\u{8}' => out.push_str("\\b"),
			'\u{c}' => out.push_str("\\f"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c if c < ' ' => {
				let _ = write!(out, "\\u{:04x}", c as u32);
			}
			c => out.push(c),
		}
	}
	out.push('"');
}

fn push_indent(level: usize, out: &mut String) {
	for _ in 0..level * INDENT {
		out.push(' ');
	}
}

#[cfg(test)]
mod tests;
