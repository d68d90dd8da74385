//! Timestamp-based validation of compiled packs.
//!
//! A cache is valid while every file listed in its `res:files` still exists and
//! is not newer than the cache itself. Only metadata is consulted; file
//! contents are never compared.

use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use twox_hash::XxHash64;

use crate::pack::{Dict, RES_FILES, read_pack};

/// Default cache location for a description file:
/// `<temp>/respack.cache/<stem>.<hash>[.debug].pack`.
pub fn default_cache_path(source: &Path, debug: bool) -> PathBuf {
	let canonical = source.canonicalize().unwrap_or_else(|_| source.to_path_buf());
	let stem = canonical.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();

	let mut hasher = XxHash64::with_seed(0);
	hasher.write(canonical.to_string_lossy().to_lowercase().as_bytes());
	let debug_suffix = if debug { ".debug" } else { "" };

	std::env::temp_dir().join("respack.cache").join(format!("{stem}.{:016x}{debug_suffix}.pack", hasher.finish()))
}

/// Load a cached pack if it and all of its recorded dependencies are current.
///
/// Any failure (missing file, unreadable pack, stale dependency) is a miss.
pub fn load_cached_resources(cache_path: &Path) -> Option<Dict> {
	let cache_time = modified(cache_path)?;
	let dict = read_pack(cache_path).ok()?;

	let files: Vec<String> = dict.get_or_default(RES_FILES);
	for file in &files {
		let file_time = modified(Path::new(file))?;
		if file_time > cache_time {
			return None;
		}
	}

	Some(dict)
}

/// True when `cache_path` is a current compile of `input_path`.
///
/// Besides the dependency check of [`load_cached_resources`], the input must be
/// no newer than the cache and must itself appear in the cache's `res:files`.
pub fn is_resource_cache_updated(input_path: &Path, cache_path: &Path) -> bool {
	let Some(dict) = load_cached_resources(cache_path) else {
		return false;
	};

	let (Some(input_time), Some(cache_time)) = (modified(input_path), modified(cache_path)) else {
		return false;
	};
	if input_time > cache_time {
		return false;
	}

	let Ok(input) = input_path.canonicalize() else {
		return false;
	};

	let files: Vec<String> = dict.get_or_default(RES_FILES);
	files.iter().any(|file| Path::new(file).canonicalize().is_ok_and(|file| file == input))
}

fn modified(path: &Path) -> Option<SystemTime> {
	fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests;
