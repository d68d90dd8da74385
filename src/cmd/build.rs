use std::path::{Path, PathBuf};
use std::time::Instant;

use respack::pack::{
	CacheMode, CompileOptions, Dict, RES_FILES, RES_OUTPUT_FILES, Value, encode_pack, is_resource_cache_updated, load_resources_from_file,
	write_header_source, write_symbol_source,
};

use crate::cmd::util::{display_path, emit_json, write_output};
use crate::cmd::{CmdError, CmdResult, load_pack};

#[derive(clap::Args)]
pub struct Args {
	/// Resource description (JSON).
	#[arg(long = "in")]
	pub input: PathBuf,
	/// Output pack; defaults to the input with a `.pack` extension.
	#[arg(long)]
	pub out: Option<PathBuf>,
	/// Directory for side outputs recorded by factories.
	#[arg(long)]
	pub pdb: Option<PathBuf>,
	/// Rust source embedding the pack bytes.
	#[arg(long)]
	pub header: Option<PathBuf>,
	/// Rust source with one constant per resource symbol.
	#[arg(long = "symbol-header")]
	pub symbol_header: Option<PathBuf>,
	#[arg(long)]
	pub debug: bool,
	/// Rebuild even when the output is up to date.
	#[arg(long)]
	pub force: bool,
	#[arg(long)]
	pub verbose: bool,
	#[arg(long)]
	pub json: bool,
}

/// Compile a resource description into a pack and its optional side outputs.
pub fn run(args: Args) -> CmdResult<()> {
	let Args {
		input,
		out,
		pdb,
		header,
		symbol_header,
		debug,
		force,
		verbose,
		json,
	} = args;

	if !input.is_file() {
		return Err(CmdError::MissingInput { path: input });
	}

	let out = out.unwrap_or_else(|| input.with_extension("pack"));
	let started = Instant::now();

	let extras_exist = [&header, &symbol_header].into_iter().flatten().all(|path| path.exists());
	if !force && extras_exist && is_resource_cache_updated(&input, &out) {
		let (_, dict) = load_pack(&out)?;
		report(&input, &out, &dict, true, started, verbose, json);
		return Ok(());
	}

	let options = CompileOptions {
		debug,
		..CompileOptions::default()
	};
	let result = load_resources_from_file(&input, &options, &CacheMode::None);
	if !result.status {
		for error in &result.errors {
			eprintln!("{error}");
		}
		return Err(CmdError::Compile {
			path: input,
			count: result.errors.len(),
		});
	}

	let dict = result.dict;
	let (bytes, locations) = encode_pack(&dict);
	write_output(&out, &bytes)?;

	if let Some(dir) = &pdb {
		write_side_outputs(dir, &dict)?;
	}
	if let Some(path) = &header {
		write_output(path, write_header_source(&dict, &bytes, &locations))?;
	}
	if let Some(path) = &symbol_header {
		write_output(path, write_symbol_source(&dict))?;
	}

	report(&input, &out, &dict, false, started, verbose, json);
	Ok(())
}

/// Write every `res:output_files` entry into `dir`.
fn write_side_outputs(dir: &Path, dict: &Dict) -> CmdResult<()> {
	std::fs::create_dir_all(dir).map_err(|source| CmdError::Init {
		path: dir.to_path_buf(),
		source,
	})?;

	let Some(outputs) = dict.get_ref(RES_OUTPUT_FILES).and_then(Value::as_dict) else {
		return Ok(());
	};

	for (name, value) in outputs.iter() {
		if let Some(data) = value.as_bytes() {
			write_output(&dir.join(name.as_ref()), data)?;
		}
	}
	Ok(())
}

fn report(input: &Path, out: &Path, dict: &Dict, up_to_date: bool, started: Instant, verbose: bool, json: bool) {
	let entries = dict.iter().filter(|(name, _)| !name.starts_with("res:")).count();
	let files: Vec<String> = dict.get_or_default(RES_FILES);

	if json {
		emit_json(&BuildJson {
			input: display_path(input),
			output: display_path(out),
			status: if up_to_date { "up_to_date" } else { "built" },
			entries,
			files,
		});
		return;
	}

	if verbose {
		println!("input: {}", input.display());
		println!("output: {}", out.display());
		println!("status: {}", if up_to_date { "skipped (up to date)" } else { "built" });
		println!("entries: {entries}");
		println!("files: {}", files.len());
		println!("elapsed_ms: {}", started.elapsed().as_millis());
	}
}

#[derive(serde::Serialize)]
struct BuildJson {
	input: String,
	output: String,
	status: &'static str,
	entries: usize,
	files: Vec<String>,
}
