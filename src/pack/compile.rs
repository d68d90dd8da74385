//! Resource description compiler.
//!
//! Turns a JSON resource description into the dict that is written to a pack.
//! Most passes run over the whole tree as a [`DictVisitor`]; compilation
//! stops after the first pass that reports errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pack::{Dict, FactoryRegistry, Value, load_cached_resources, visit_dict, write_pack};

mod context;
mod passes;

pub use context::{LoadContext, make_symbol_from_name};
use passes::{ExpandFilePaths, ExpandTemplates, LoadObjects, ResolveRefs, add_siblings, find_reference_cycles, finish_loading_objects, save_objects};
pub(crate) use passes::{RES_PREFIX, RES_TYPE};

/// Sorted canonical paths of every consulted file.
pub const RES_FILES: &str = "res:files";
/// True when compiled with debug metadata.
pub const RES_DEBUG: &str = "res:debug";
/// Namespace used by generated source headers.
pub const RES_NAMESPACE: &str = "res:namespace";
/// Symbol to entry-name map for generated symbol headers.
pub const RES_ID_SYMBOLS: &str = "res:id_symbols";
/// Side outputs recorded by factories in debug builds.
pub const RES_OUTPUT_FILES: &str = "res:output_files";
/// Path of the description file a pack was compiled from.
pub const RES_SOURCE: &str = "res:source";

const DEFAULT_NAMESPACE: &str = "assets";

/// Localized string lookup for `loc:` values.
pub trait Localizer: Send + Sync {
	/// Value for `name`, if localized.
	fn localize(&self, name: &str) -> Option<Value>;
}

impl Localizer for Dict {
	fn localize(&self, name: &str) -> Option<Value> {
		self.get(name)
	}
}

/// Compile configuration.
#[derive(Clone)]
pub struct CompileOptions {
	/// Record per-entry dependencies and factory side outputs.
	pub debug: bool,
	/// Factories used for `res:type` entries.
	pub factories: Arc<FactoryRegistry>,
	/// Lookup for `loc:` values; `loc:` strings are errors without one.
	pub localizer: Option<Arc<dyn Localizer>>,
}

impl Default for CompileOptions {
	fn default() -> Self {
		Self {
			debug: false,
			factories: FactoryRegistry::global(),
			localizer: None,
		}
	}
}

impl fmt::Debug for CompileOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompileOptions")
			.field("debug", &self.debug)
			.field("factories", &self.factories)
			.field("localizer", &self.localizer.is_some())
			.finish()
	}
}

/// Where [`load_resources_from_file`] keeps its compiled cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMode {
	/// Always compile; write nothing.
	None,
	/// Reuse the cache at this path when valid, otherwise compile and rewrite it.
	Use(PathBuf),
	/// Compile unconditionally and rewrite the cache at this path.
	Rebuild(PathBuf),
}

/// Outcome of a compile: expected failures land in `errors`, never in a panic.
#[derive(Debug, Clone, Default)]
pub struct LoadResourcesResult {
	/// True when compilation produced a usable dict.
	pub status: bool,
	/// Every error reported, in pass order.
	pub errors: Vec<String>,
	/// Compiled dict; empty when `status` is false.
	pub dict: Dict,
}

impl LoadResourcesResult {
	fn failed(errors: Vec<String>) -> Self {
		Self {
			status: false,
			errors,
			dict: Dict::new(),
		}
	}
}

/// Parse and compile JSON description text.
pub fn load_resources_from_json(text: &str, base_path: &Path, options: &CompileOptions) -> LoadResourcesResult {
	match crate::pack::json_parse(text) {
		Ok(dict) => load_resources_from_dict(&dict, base_path, options),
		Err(err) => LoadResourcesResult::failed(vec![err.to_string()]),
	}
}

/// Compile an already parsed description.
pub fn load_resources_from_dict(dict: &Dict, base_path: &Path, options: &CompileOptions) -> LoadResourcesResult {
	let mut context = LoadContext::new(base_path, options.debug);

	let expanded = {
		let mut pass = ExpandTemplates::new(&mut context, options.localizer.as_deref(), dict);
		visit_dict(&mut pass, dict)
	};
	let Some(dict) = finish_pass(expanded.dict, expanded.errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	let expanded = visit_dict(&mut ExpandFilePaths { context: &mut context }, &dict);
	let Some(dict) = finish_pass(expanded.dict, expanded.errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	let mut refs = ResolveRefs {
		root: &dict,
		graph: Default::default(),
	};
	let resolved = visit_dict(&mut refs, &dict);
	let mut errors = resolved.errors;
	errors.extend(find_reference_cycles(&refs.graph));
	let Some(dict) = finish_pass(resolved.dict, errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	let mut objects = LoadObjects {
		context: &mut context,
		factories: &options.factories,
		roots: Vec::new(),
	};
	let loaded = visit_dict(&mut objects, &dict);
	let roots = objects.roots;
	let Some(dict) = finish_pass(loaded.dict, loaded.errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	let errors = finish_loading_objects(&roots, &mut context);
	let Some(mut dict) = finish_pass(Some(dict), errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	let mut errors = save_objects(&mut dict, &roots);
	errors.extend(add_siblings(&mut dict, &roots, &mut context));
	let Some(mut dict) = finish_pass(Some(dict), errors, &mut context) else {
		return LoadResourcesResult::failed(context.take_errors());
	};

	write_metadata(&mut dict, &context);

	LoadResourcesResult {
		status: true,
		errors: Vec::new(),
		dict,
	}
}

/// Compile a description file, going through the cache selected by `cache`.
///
/// The result records the source in `res:source` and lists the file itself in
/// `res:files`. A failed cache write removes the partial cache file.
pub fn load_resources_from_file(path: &Path, options: &CompileOptions, cache: &CacheMode) -> LoadResourcesResult {
	if let CacheMode::Use(cache_path) = cache
		&& let Some(dict) = load_cached_resources(cache_path)
	{
		return LoadResourcesResult {
			status: true,
			errors: Vec::new(),
			dict,
		};
	}

	let text = match fs::read_to_string(path) {
		Ok(text) => text,
		Err(err) => return LoadResourcesResult::failed(vec![format!("Failed to read file: {}: {err}", path.display())]),
	};

	let source = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
	let base_path = source.parent().map(Path::to_path_buf).unwrap_or_default();
	let mut result = load_resources_from_json(&text, &base_path, options);
	if !result.status {
		return result;
	}

	let source_text = source.to_string_lossy().into_owned();
	result.dict.set(RES_SOURCE, source_text.as_str());

	let mut files: Vec<String> = result.dict.get_or_default(RES_FILES);
	if !files.contains(&source_text) {
		files.push(source_text);
		files.sort();
	}
	result.dict.set(RES_FILES, files);

	if let CacheMode::Use(cache_path) | CacheMode::Rebuild(cache_path) = cache
		&& write_pack(cache_path, &result.dict).is_err()
	{
		let _ = fs::remove_file(cache_path);
	}

	result
}

fn finish_pass(dict: Option<Dict>, errors: Vec<String>, context: &mut LoadContext) -> Option<Dict> {
	let pass_errors = context.take_errors();
	let failed = dict.is_none() || !errors.is_empty() || !pass_errors.is_empty();

	for error in errors.into_iter().chain(pass_errors) {
		context.add_error(error);
	}

	if failed {
		if context.errors().is_empty() {
			context.add_error("Resource description root is not a dict");
		}
		return None;
	}

	dict
}

fn write_metadata(dict: &mut Dict, context: &LoadContext) {
	let files: Vec<String> = context.files().map(|path| path.to_string_lossy().into_owned()).collect();
	dict.set(RES_FILES, files);

	if context.debug() {
		dict.set(RES_DEBUG, true);

		for name in dict.child_names(false) {
			let entry_files: Vec<String> = context.files_for(&name).map(|path| path.to_string_lossy().into_owned()).collect();
			if entry_files.is_empty() {
				continue;
			}

			if let Some(mut entry) = dict.get_ref(&name).and_then(Value::as_dict).cloned() {
				entry.set(RES_FILES, entry_files);
				dict.set_value(name, Value::from(entry));
			}
		}

		let mut output_files = Dict::new();
		for (name, data) in context.output_files() {
			output_files.set_value(Arc::from(name.as_str()), Value::Bytes(data.clone()));
		}
		dict.set(RES_OUTPUT_FILES, output_files);
	}

	if !dict.contains(RES_NAMESPACE) {
		dict.set(RES_NAMESPACE, DEFAULT_NAMESPACE);
	}

	let mut id_symbols = Dict::new();
	for (symbol, name) in context.id_symbols() {
		id_symbols.set(symbol, name.as_str());
	}
	dict.set(RES_ID_SYMBOLS, id_symbols);
}
