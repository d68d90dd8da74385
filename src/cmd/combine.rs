use std::path::PathBuf;

use respack::pack::{RES_FILES, combine_packs, encode_pack, write_header_source, write_symbol_source};

use crate::cmd::util::{display_path, emit_json, write_output};
use crate::cmd::{CmdError, CmdResult, load_pack};

#[derive(clap::Args)]
pub struct Args {
	/// Packs to merge; later packs win on name collisions.
	#[arg(long = "in", required = true, num_args = 1..)]
	pub inputs: Vec<PathBuf>,
	#[arg(long)]
	pub out: PathBuf,
	#[arg(long)]
	pub header: Option<PathBuf>,
	#[arg(long = "symbol-header")]
	pub symbol_header: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Merge prebuilt packs into one.
pub fn run(args: Args) -> CmdResult<()> {
	let Args {
		inputs,
		out,
		header,
		symbol_header,
		json,
	} = args;

	for path in &inputs {
		load_pack(path)?;
	}

	let dict = combine_packs(&inputs).map_err(|source| CmdError::Unreadable {
		path: out.clone(),
		source,
	})?;

	let (bytes, locations) = encode_pack(&dict);
	write_output(&out, &bytes)?;
	if let Some(path) = &header {
		write_output(path, write_header_source(&dict, &bytes, &locations))?;
	}
	if let Some(path) = &symbol_header {
		write_output(path, write_symbol_source(&dict))?;
	}

	let entries = dict.iter().filter(|(name, _)| !name.starts_with("res:")).count();
	if json {
		emit_json(&CombineJson {
			inputs: inputs.iter().map(|path| display_path(path)).collect(),
			output: display_path(&out),
			entries,
			files: dict.get_or_default(RES_FILES),
		});
	} else {
		println!("output: {}", out.display());
		println!("inputs: {}", inputs.len());
		println!("entries: {entries}");
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct CombineJson {
	inputs: Vec<String>,
	output: String,
	entries: usize,
	files: Vec<String>,
}
