//! Type-name keyed factories turning resource descriptors into live objects.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::pack::builtin::{DictFactory, FileFactory};
use crate::pack::{Dict, LoadContext, Result};

/// A constructed resource.
pub trait ResourceObject: Send + Sync + fmt::Debug {
	/// Factory type name this object was built by.
	fn type_name(&self) -> &str;

	/// Write the cached form of this object into `dict`.
	///
	/// Returns false when the object cannot be persisted.
	fn save_to_cache(&self, dict: &mut Dict) -> bool;

	/// Names of other top-level resources this object depends on.
	fn dependencies(&self) -> Vec<Arc<str>> {
		Vec::new()
	}

	/// Finish loading once every object of the compile is built and the
	/// objects this one depends on have finished. Returns false on failure.
	fn load_from_source_complete(&self, context: &mut LoadContext) -> bool {
		let _ = context;
		true
	}

	/// Extra top-level entries to store next to this object, already in their
	/// stored form. Only asked of top-level objects; `name` is their own entry.
	fn siblings(&self, name: &str) -> Dict {
		let _ = name;
		Dict::new()
	}

	/// Materialize the object as a file named after `name` inside `dir`.
	///
	/// Objects without a file form return `Ok(None)`.
	fn save_to_file(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
		let _ = (dir, name);
		Ok(None)
	}

	/// Downcast support.
	fn as_any(&self) -> &dyn Any;
}

/// Builds [`ResourceObject`]s of one type.
pub trait ResourceFactory: Send + Sync {
	/// Build from a source descriptor. May convert formats, read files, and
	/// record errors or side outputs in `context`.
	fn load_from_source(&self, dict: &Dict, context: &mut LoadContext) -> Option<Arc<dyn ResourceObject>>;

	/// Rebuild from the form written by [`ResourceObject::save_to_cache`].
	fn load_from_cache(&self, dict: &Dict) -> Option<Arc<dyn ResourceObject>>;
}

/// Name to factory table.
#[derive(Default)]
pub struct FactoryRegistry {
	factories: HashMap<String, Arc<dyn ResourceFactory>>,
}

impl FactoryRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry holding the built-in `file` and `dict` factories.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register("file", FileFactory);
		registry.register("dict", DictFactory);
		registry
	}

	/// Shared registry holding the built-ins, created on first use.
	pub fn global() -> Arc<FactoryRegistry> {
		static GLOBAL: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();
		GLOBAL.get_or_init(|| Arc::new(Self::with_builtins())).clone()
	}

	/// Register `factory` under `type_name`.
	///
	/// # Panics
	///
	/// Panics when `type_name` is already registered.
	pub fn register(&mut self, type_name: &str, factory: impl ResourceFactory + 'static) {
		let previous = self.factories.insert(type_name.to_owned(), Arc::new(factory));
		assert!(previous.is_none(), "factory already registered for type: {type_name}");
	}

	/// Factory for `type_name`, if registered.
	pub fn get(&self, type_name: &str) -> Option<Arc<dyn ResourceFactory>> {
		self.factories.get(type_name).cloned()
	}

	/// Registered type names, sorted.
	pub fn type_names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl fmt::Debug for FactoryRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FactoryRegistry").field("types", &self.type_names()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::FactoryRegistry;

	#[test]
	fn builtins_are_registered() {
		let registry = FactoryRegistry::with_builtins();
		assert_eq!(registry.type_names(), vec!["dict", "file"]);
		assert!(registry.get("file").is_some());
		assert!(registry.get("texture").is_none());
	}

	#[test]
	#[should_panic(expected = "factory already registered for type: file")]
	fn duplicate_registration_panics() {
		let mut registry = FactoryRegistry::with_builtins();
		registry.register("file", crate::pack::builtin::FileFactory);
	}
}
