//! Rust source emitters for embedding a pack in a program.

use std::fmt::Write;

use crate::pack::{Dict, Location, RES_ID_SYMBOLS, RES_NAMESPACE, Value};

const BYTES_PER_LINE: usize = 16;

/// Emit a module holding the pack bytes, a `data()` accessor and the location
/// of every top-level entry.
pub fn write_header_source(dict: &Dict, bytes: &[u8], locations: &[Location]) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "// Generated by respack. Do not edit.");
	let _ = writeln!(out, "pub mod {} {{", module_name(dict));

	let _ = writeln!(out, "\tpub static BYTES: [u8; {}] = [", bytes.len());
	for line in bytes.chunks(BYTES_PER_LINE) {
		out.push_str("\t\t");
		for (index, byte) in line.iter().enumerate() {
			if index > 0 {
				out.push(' ');
			}
			let _ = write!(out, "0x{byte:02x},");
		}
		out.push('\n');
	}
	out.push_str("\t];\n\n");

	out.push_str("\tpub fn data() -> &'static [u8] {\n\t\t&BYTES\n\t}\n\n");

	let _ = writeln!(out, "\tpub static LOCATIONS: [(&str, usize, usize); {}] = [", locations.len());
	for location in locations {
		let _ = writeln!(out, "\t\t({:?}, {}, {}),", location.name, location.offset, location.size);
	}
	out.push_str("\t];\n}\n");
	out
}

/// Emit one `pub const SYMBOL: &str = "name";` per `res:id_symbols` entry.
pub fn write_symbol_source(dict: &Dict) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "// Generated by respack. Do not edit.");
	let _ = writeln!(out, "pub mod {} {{", module_name(dict));

	if let Some(symbols) = dict.get_ref(RES_ID_SYMBOLS).and_then(Value::as_dict) {
		for symbol in symbols.child_names(true) {
			if let Some(name) = symbols.get_as::<String>(&symbol) {
				let _ = writeln!(out, "\tpub const {symbol}: &str = {name:?};");
			}
		}
	}

	out.push_str("}\n");
	out
}

/// `res:namespace` as a Rust module identifier.
fn module_name(dict: &Dict) -> String {
	let namespace: String = dict.get_or(RES_NAMESPACE, "assets".to_owned());
	let mut name: String = namespace
		.chars()
		.map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
		.collect();

	if name.is_empty() || name.starts_with(|ch: char| ch.is_ascii_digit()) {
		name.insert(0, '_');
	}
	name
}

#[cfg(test)]
mod tests {
	use crate::pack::{Dict, Value, encode_pack, write_header_source, write_symbol_source};

	fn compiled() -> Dict {
		let mut symbols = Dict::new();
		symbols.set("HELLO_WORLD", "hello world");
		symbols.set("_2D_SPRITE", "2d sprite");

		let mut dict = Dict::new();
		dict.set("hello world", Value::Int(1));
		dict.set("res:namespace", "Game.Assets");
		dict.set("res:id_symbols", symbols);
		dict
	}

	#[test]
	fn symbol_source_lists_sorted_constants() {
		let source = write_symbol_source(&compiled());
		assert!(source.contains("pub mod game_assets {"));
		let first = source.find("pub const HELLO_WORLD: &str = \"hello world\";").expect("hello constant");
		let second = source.find("pub const _2D_SPRITE: &str = \"2d sprite\";").expect("sprite constant");
		assert!(first < second);
	}

	#[test]
	fn header_source_embeds_every_byte_and_location() {
		let dict = compiled();
		let (bytes, locations) = encode_pack(&dict);
		let source = write_header_source(&dict, &bytes, &locations);

		assert!(source.contains(&format!("pub static BYTES: [u8; {}] = [", bytes.len())));
		assert_eq!(source.matches("0x").count(), bytes.len());
		assert!(source.contains("pub fn data() -> &'static [u8]"));
		assert!(source.contains("(\"hello world\", "));
		assert_eq!(locations.len(), 3);
	}
}
