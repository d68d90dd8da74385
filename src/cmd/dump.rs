use std::path::PathBuf;

use respack::pack::encode_pack;

use crate::cmd::util::{dict_json, display_path, emit_json};
use crate::cmd::{CmdResult, load_pack};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print a pack's entries and its full sorted tree.
pub fn run(args: Args) -> CmdResult<()> {
	let Args { path, json } = args;

	let (pack, dict) = load_pack(&path)?;
	let (_, locations) = encode_pack(&dict);

	if json {
		emit_json(&DumpJson {
			path: display_path(&path),
			bytes: pack.bytes().len(),
			entries: locations
				.iter()
				.map(|location| EntryJson {
					name: location.name.clone(),
					kind: dict.get_ref(&location.name).map(|value| value.kind().as_str()).unwrap_or("null"),
					offset: location.offset,
					size: location.size,
				})
				.collect(),
			dict: dict_json(&dict),
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("bytes: {}", pack.bytes().len());
	println!("entries: {}", locations.len());
	for location in &locations {
		println!("  {} @{} +{}", location.name, location.offset, location.size);
	}
	println!("tree:");
	print!("{dict}");

	Ok(())
}

#[derive(serde::Serialize)]
struct EntryJson {
	name: String,
	kind: &'static str,
	offset: usize,
	size: usize,
}

#[derive(serde::Serialize)]
struct DumpJson {
	path: String,
	bytes: usize,
	entries: Vec<EntryJson>,
	dict: serde_json::Value,
}
