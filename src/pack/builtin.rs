//! Built-in `file` and `dict` resource types.

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pack::{Dict, LoadContext, ResourceFactory, ResourceObject, Result, SavedData, Value, json_write};

/// Extensions whose content is already compressed.
const PRECOMPRESSED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".mp3"];

/// Raw file contents embedded in a pack.
#[derive(Debug)]
pub struct FileResource {
	data: Arc<[u8]>,
	extension: String,
	compress: bool,
}

impl FileResource {
	/// Embedded bytes.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Original file extension including the dot, or empty.
	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// True when the cached form stores the data zstd-compressed.
	pub fn compress(&self) -> bool {
		self.compress
	}
}

impl ResourceObject for FileResource {
	fn type_name(&self) -> &str {
		"file"
	}

	fn save_to_cache(&self, dict: &mut Dict) -> bool {
		let data = if self.compress {
			match SavedData::from_bytes(&self.data, true) {
				Ok(saved) => Value::from(saved),
				Err(_) => return false,
			}
		} else {
			Value::Bytes(self.data.clone())
		};

		dict.set("data", data);
		dict.set("extension", self.extension.as_str());
		dict.set("compress", self.compress);
		true
	}

	fn save_to_file(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
		let path = dir.join(format!("{name}{}", self.extension));
		fs::create_dir_all(dir)?;
		fs::write(&path, &self.data)?;
		Ok(Some(path))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Factory for [`FileResource`]; reads the path in the `file` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFactory;

impl ResourceFactory for FileFactory {
	fn load_from_source(&self, dict: &Dict, context: &mut LoadContext) -> Option<Arc<dyn ResourceObject>> {
		let Some(path) = dict.get_as::<String>("file") else {
			context.add_error("File resource has no 'file' value");
			return None;
		};

		let path = PathBuf::from(path);
		let data = match fs::read(&path) {
			Ok(data) => data,
			Err(err) => {
				context.add_error(format!("Failed to read file: {}: {err}", path.display()));
				return None;
			}
		};

		let extension = path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default();
		let default_compress = !PRECOMPRESSED_EXTENSIONS.iter().any(|known| extension.eq_ignore_ascii_case(known));

		Some(Arc::new(FileResource {
			data: Arc::from(data),
			compress: dict.get_or("compress", default_compress),
			extension,
		}))
	}

	fn load_from_cache(&self, dict: &Dict) -> Option<Arc<dyn ResourceObject>> {
		let data = dict.get("data")?.try_convert_to::<Vec<u8>>()?;
		Some(Arc::new(FileResource {
			data: Arc::from(data),
			extension: dict.get_or_default("extension"),
			compress: dict.get_or("compress", false),
		}))
	}
}

/// Generic keyed data whose dependencies are the references it holds.
#[derive(Debug)]
pub struct DictResource {
	fields: Dict,
	refs: Vec<Arc<str>>,
}

impl DictResource {
	fn from_descriptor(dict: &Dict) -> Self {
		let fields: Dict = dict.iter().filter(|(name, _)| !name.starts_with("res:")).map(|(name, value)| (name.as_ref(), value.clone())).collect();
		let mut refs = Vec::new();
		for (_, value) in fields.iter() {
			value.collect_refs(&mut refs);
		}
		Self { fields, refs }
	}

	/// Descriptor fields without reserved `res:` keys.
	pub fn fields(&self) -> &Dict {
		&self.fields
	}
}

impl ResourceObject for DictResource {
	fn type_name(&self) -> &str {
		"dict"
	}

	fn save_to_cache(&self, dict: &mut Dict) -> bool {
		dict.merge(&self.fields, false);
		true
	}

	fn dependencies(&self) -> Vec<Arc<str>> {
		self.refs.clone()
	}

	fn save_to_file(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
		let path = dir.join(format!("{name}.json"));
		fs::create_dir_all(dir)?;
		fs::write(&path, json_write(&self.fields))?;
		Ok(Some(path))
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Factory for [`DictResource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DictFactory;

impl ResourceFactory for DictFactory {
	fn load_from_source(&self, dict: &Dict, _context: &mut LoadContext) -> Option<Arc<dyn ResourceObject>> {
		Some(Arc::new(DictResource::from_descriptor(dict)))
	}

	fn load_from_cache(&self, dict: &Dict) -> Option<Arc<dyn ResourceObject>> {
		Some(Arc::new(DictResource::from_descriptor(dict)))
	}
}

#[cfg(test)]
mod tests;
