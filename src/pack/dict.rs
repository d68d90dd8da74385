//! Insertion-ordered, string-keyed document of [`Value`]s.

use std::fmt::{self, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::pack::{DictPath, FromValue, Value};

mod persist;

pub use persist::{DICT_MAGIC, Location};

/// Fixed-size plain struct stored as raw bytes through [`Dict::set_struct`].
pub trait PackStruct: Sized {
	/// Exact byte size of the encoded struct.
	const SIZE: usize;

	/// Append exactly [`PackStruct::SIZE`] bytes.
	fn write_bytes(&self, out: &mut Vec<u8>);

	/// Rebuild from exactly [`PackStruct::SIZE`] bytes.
	fn read_bytes(bytes: &[u8]) -> Option<Self>;
}

/// Nested key/value document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
	entries: IndexMap<Arc<str>, Value>,
}

impl Dict {
	/// Create an empty dict.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when the dict has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// True when `name` is a direct key.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Insert or replace `name`.
	pub fn set(&mut self, name: &str, value: impl Into<Value>) {
		self.set_value(Arc::from(name), value.into());
	}

	/// Insert or replace `name` with an already shared key.
	pub fn set_value(&mut self, name: Arc<str>, value: Value) {
		self.entries.insert(name, value);
	}

	/// Remove `name`, keeping the order of the remaining keys.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.entries.shift_remove(name)
	}

	/// Look up a direct key, or a deep path when `name` starts with `/`.
	pub fn get(&self, name: &str) -> Option<Value> {
		if name.starts_with('/') {
			return self.get_by_path(name);
		}

		self.entries.get(name).cloned()
	}

	/// Borrow a direct entry without cloning.
	pub fn get_ref(&self, name: &str) -> Option<&Value> {
		self.entries.get(name)
	}

	/// Look up `name` and coerce it to `T` through the conversion table.
	pub fn get_as<T: FromValue>(&self, name: &str) -> Option<T> {
		self.get(name)?.try_convert_to::<T>()
	}

	/// Like [`Dict::get_as`], falling back to `default` when absent or unconvertible.
	pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
		self.get_as(name).unwrap_or(default)
	}

	/// Like [`Dict::get_as`], falling back to `T::default()`.
	pub fn get_or_default<T: FromValue + Default>(&self, name: &str) -> T {
		self.get_as(name).unwrap_or_default()
	}

	/// Resolve a slash-and-bracket path such as `/first[2]/three[1]`.
	///
	/// Malformed paths and missing steps yield `None`.
	pub fn get_by_path(&self, path: &str) -> Option<Value> {
		DictPath::parse(path)?.resolve(self)
	}

	/// Store `value` as raw struct bytes.
	pub fn set_struct<T: PackStruct>(&mut self, name: &str, value: &T) {
		let mut bytes = Vec::with_capacity(T::SIZE);
		value.write_bytes(&mut bytes);
		self.set(name, Value::struct_bytes(&bytes));
	}

	/// Read raw struct bytes back; only the size is checked.
	pub fn get_struct<T: PackStruct>(&self, name: &str) -> Option<T> {
		match self.entries.get(name)? {
			Value::Struct(bytes) if bytes.len() == T::SIZE => T::read_bytes(bytes),
			_ => None,
		}
	}

	/// Entry names, in insertion order or sorted.
	pub fn child_names(&self, sorted: bool) -> Vec<Arc<str>> {
		let mut names: Vec<_> = self.entries.keys().cloned().collect();
		if sorted {
			names.sort();
		}
		names
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
		self.entries.iter()
	}

	/// Copy every entry of `other` into `self`, replacing collisions.
	///
	/// With `merge_child_dicts`, colliding dict entries are merged recursively
	/// instead of replaced.
	pub fn merge(&mut self, other: &Dict, merge_child_dicts: bool) {
		for (name, value) in &other.entries {
			if merge_child_dicts
				&& let (Some(Value::Dict(mine)), Value::Dict(theirs)) = (self.entries.get(name), value)
				&& let (Some(mine), Some(theirs)) = (mine.get(), theirs.get())
			{
				let mut merged = mine.clone();
				merged.merge(theirs, true);
				self.entries.insert(name.clone(), Value::from(merged));
				continue;
			}

			self.entries.insert(name.clone(), value.clone());
		}
	}

	/// Sorted, indented dump of the whole tree.
	pub fn print(&self, out: &mut impl Write) -> fmt::Result {
		self.print_children(0, out)
	}

	pub(crate) fn print_children(&self, level: usize, out: &mut impl Write) -> fmt::Result {
		for name in self.child_names(true) {
			if let Some(value) = self.entries.get(&name) {
				value.print_tree(&name, level, out)?;
			}
		}
		Ok(())
	}

	/// Print the sorted tree to standard error.
	pub fn debug_print(&self) {
		eprint!("{self}");
	}
}

impl fmt::Display for Dict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.print(f)
	}
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for Dict {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		let mut dict = Dict::new();
		for (name, value) in iter {
			dict.set(name.as_ref(), value);
		}
		dict
	}
}

#[cfg(test)]
mod tests;
