use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State shared by every compile pass and handed to factories.
#[derive(Debug)]
pub struct LoadContext {
	base_path: PathBuf,
	debug: bool,
	errors: Vec<String>,
	output_files: Vec<(String, Arc<[u8]>)>,
	files: BTreeSet<PathBuf>,
	files_by_name: BTreeMap<String, BTreeSet<PathBuf>>,
	id_symbols: BTreeMap<String, String>,
}

impl LoadContext {
	/// Create a context resolving relative paths against `base_path`.
	pub fn new(base_path: &Path, debug: bool) -> Self {
		Self {
			base_path: base_path.to_path_buf(),
			debug,
			errors: Vec::new(),
			output_files: Vec::new(),
			files: BTreeSet::new(),
			files_by_name: BTreeMap::new(),
			id_symbols: BTreeMap::new(),
		}
	}

	/// Directory relative `file:` paths and imports resolve against.
	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	/// True when compiling with debug metadata.
	pub fn debug(&self) -> bool {
		self.debug
	}

	/// Errors recorded so far.
	pub fn errors(&self) -> &[String] {
		&self.errors
	}

	/// Record a compile error. Empty messages are ignored.
	pub fn add_error(&mut self, message: impl Into<String>) {
		let message = message.into();
		if !message.is_empty() {
			self.errors.push(message);
		}
	}

	/// Record a side output (for example a debug symbol file) produced by a factory.
	pub fn add_output_file(&mut self, name: &str, data: &[u8]) {
		if !name.is_empty() && !data.is_empty() {
			self.output_files.push((name.to_owned(), Arc::from(data)));
		}
	}

	/// Record a consulted file, attributed to `resource_name` when given.
	pub fn add_file(&mut self, resource_name: Option<&str>, path: &Path) {
		let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
		if let Some(name) = resource_name.filter(|name| !name.is_empty()) {
			self.files_by_name.entry(name.to_owned()).or_default().insert(path.clone());
		}
		self.files.insert(path);
	}

	/// Every consulted file, sorted.
	pub fn files(&self) -> impl Iterator<Item = &Path> {
		self.files.iter().map(PathBuf::as_path)
	}

	/// Files consulted while compiling one top-level entry.
	pub fn files_for(&self, resource_name: &str) -> impl Iterator<Item = &Path> {
		self.files_by_name.get(resource_name).into_iter().flatten().map(PathBuf::as_path)
	}

	/// Side outputs recorded by factories.
	pub fn output_files(&self) -> &[(String, Arc<[u8]>)] {
		&self.output_files
	}

	pub(super) fn set_id_symbol(&mut self, symbol: String, name: &str) {
		self.id_symbols.entry(symbol).or_insert_with(|| name.to_owned());
	}

	pub(super) fn id_symbols(&self) -> &BTreeMap<String, String> {
		&self.id_symbols
	}

	pub(super) fn take_errors(&mut self) -> Vec<String> {
		std::mem::take(&mut self.errors)
	}
}

/// Derive a constant-style symbol from an entry name: alphanumerics are
/// uppercased, other runs collapse to one `_`, a leading digit gets a `_` prefix.
pub fn make_symbol_from_name(name: &str) -> String {
	let mut id = String::with_capacity(name.len());
	let mut pending_underscore = false;

	for ch in name.chars() {
		if ch.is_ascii_alphanumeric() || ch == '_' {
			if id.is_empty() && ch.is_ascii_digit() {
				pending_underscore = true;
			}
			if pending_underscore && ch != '_' {
				id.push('_');
			}
			pending_underscore = false;
			id.push(ch.to_ascii_uppercase());
		} else {
			pending_underscore = true;
		}
	}

	id
}
