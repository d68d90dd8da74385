use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pack::{Dict, Location, PackWriter, RES_FILES, RES_ID_SYMBOLS, Result, Value};

/// A pack read fully into memory.
///
/// Nested dicts of [`PackFile::dict`] stay raw ranges of the shared buffer
/// until they are accessed.
#[derive(Debug, Clone)]
pub struct PackFile {
	/// Path the pack was read from.
	pub path: PathBuf,
	bytes: Arc<[u8]>,
}

impl PackFile {
	/// Read the whole file; the file is not held open afterwards.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		Ok(Self {
			path: path.to_path_buf(),
			bytes: Arc::from(bytes),
		})
	}

	/// Raw pack bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Parse the top-level dict.
	pub fn dict(&self) -> Result<Dict> {
		Dict::load_shared(&self.bytes)
	}
}

/// Read and parse a pack file.
pub fn read_pack(path: impl AsRef<Path>) -> Result<Dict> {
	PackFile::open(path)?.dict()
}

/// Serialize `dict` and report the location of every top-level entry.
pub fn encode_pack(dict: &Dict) -> (Vec<u8>, Vec<Location>) {
	let mut writer = PackWriter::new();
	let mut locations = Vec::new();
	dict.save(&mut writer, Some(&mut locations));
	(writer.into_bytes(), locations)
}

/// Write `dict` as a pack, creating parent directories.
pub fn write_pack(path: impl AsRef<Path>, dict: &Dict) -> Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, dict.to_bytes())?;
	Ok(())
}

/// Merge several packs into one dict.
///
/// Later packs win on name collisions; `res:files` lists are unioned and
/// `res:id_symbols` maps merged.
pub fn combine_packs<P: AsRef<Path>>(paths: &[P]) -> Result<Dict> {
	let mut combined = Dict::new();
	let mut files: Vec<String> = Vec::new();
	let mut id_symbols = Dict::new();

	for path in paths {
		let mut dict = read_pack(path)?;
		dict.load_child_dicts()?;

		for file in dict.get_or_default::<Vec<String>>(RES_FILES) {
			if !files.contains(&file) {
				files.push(file);
			}
		}
		if let Some(symbols) = dict.get_ref(RES_ID_SYMBOLS).and_then(Value::as_dict) {
			id_symbols.merge(symbols, false);
		}

		combined.merge(&dict, false);
	}

	files.sort();
	combined.set(RES_FILES, files);
	combined.set(RES_ID_SYMBOLS, id_symbols);
	Ok(combined)
}
