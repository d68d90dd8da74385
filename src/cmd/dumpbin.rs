use std::path::PathBuf;

use respack::pack::{DumpOptions, FactoryRegistry, extract_binaries};

use crate::cmd::util::{dict_json, display_path, emit_json};
use crate::cmd::{CmdError, CmdResult, load_pack};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Scratch directory for extracted files; defaults to a temp directory
	/// named after the pack.
	#[arg(long)]
	pub dir: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Extract every typed resource of a pack to files and print the rewritten tree.
pub fn run(args: Args) -> CmdResult<()> {
	let Args { path, dir, json } = args;

	let (_, dict) = load_pack(&path)?;
	let dir = dir.unwrap_or_else(|| {
		let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_else(|| "pack".to_owned());
		std::env::temp_dir().join("respack.dumpbin").join(stem)
	});
	std::fs::create_dir_all(&dir).map_err(|source| CmdError::Init { path: dir.clone(), source })?;

	let factories = FactoryRegistry::global();
	let visited = extract_binaries(
		&dict,
		DumpOptions {
			dir: &dir,
			factories: &factories,
		},
	);

	for error in &visited.errors {
		eprintln!("{error}");
	}
	let Some(extracted) = visited.dict.filter(|_| visited.errors.is_empty()) else {
		return Err(CmdError::Visit {
			path,
			count: visited.errors.len(),
		});
	};

	if json {
		emit_json(&DumpbinJson {
			path: display_path(&path),
			dir: display_path(&dir),
			dict: dict_json(&extracted),
		});
	} else {
		println!("path: {}", path.display());
		println!("dir: {}", dir.display());
		println!("tree:");
		print!("{extracted}");
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct DumpbinJson {
	path: String,
	dir: String,
	dict: serde_json::Value,
}
