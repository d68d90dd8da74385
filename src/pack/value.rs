//! Immutable, reference-counted, type-tagged values.
//!
//! A [`Value`] is a closed sum over the persisted kinds. Composite payloads sit
//! behind `Arc`, so cloning a value never copies its data, and nothing ever
//! mutates a payload after construction.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use crate::pack::{Dict, Result, SavedData};

mod convert;
mod display;
mod persist;

pub(crate) use display::format_number;

/// Kind of payload a [`Value`] carries.
///
/// Tags are persisted; never renumber them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// No payload.
	Null,
	/// Boolean.
	Bool,
	/// 32-bit signed integer.
	Int,
	/// 64-bit float.
	Double,
	/// UTF-8 string.
	String,
	/// Opaque byte blob.
	Bytes,
	/// Ordered list of values.
	List,
	/// Nested document.
	Dict,
	/// Fixed-size struct bytes written through [`Dict::set_struct`].
	Struct,
	/// Reference to another top-level resource by name.
	Ref,
	/// Possibly compressed bytes or dict payload.
	Saved,
}

impl ValueKind {
	/// Every kind, in tag order.
	pub const ALL: [ValueKind; 11] = [
		Self::Null,
		Self::Bool,
		Self::Int,
		Self::Double,
		Self::String,
		Self::Bytes,
		Self::List,
		Self::Dict,
		Self::Struct,
		Self::Ref,
		Self::Saved,
	];

	/// Persisted one-byte tag.
	pub fn tag(self) -> u8 {
		match self {
			Self::Null => 1,
			Self::Bool => 2,
			Self::Int => 3,
			Self::Double => 4,
			Self::String => 5,
			Self::Bytes => 6,
			Self::List => 7,
			Self::Dict => 8,
			Self::Struct => 9,
			Self::Ref => 10,
			Self::Saved => 11,
		}
	}

	/// Decode a persisted tag.
	pub fn from_tag(tag: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.tag() == tag)
	}

	/// Stable lowercase name used in printed output.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Double => "double",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::List => "list",
			Self::Dict => "dict",
			Self::Struct => "struct",
			Self::Ref => "ref",
			Self::Saved => "saved",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One immutable unit of data.
#[derive(Debug, Clone)]
pub enum Value {
	/// No payload.
	Null,
	/// Boolean.
	Bool(bool),
	/// 32-bit signed integer.
	Int(i32),
	/// 64-bit float.
	Double(f64),
	/// UTF-8 string.
	String(Arc<str>),
	/// Opaque byte blob.
	Bytes(Arc<[u8]>),
	/// Ordered list of values.
	List(Arc<[Value]>),
	/// Nested document, loaded or still raw.
	Dict(DictValue),
	/// Fixed-size struct bytes.
	Struct(Arc<[u8]>),
	/// Named reference to another top-level resource.
	Ref(Arc<str>),
	/// Possibly compressed payload.
	Saved(Arc<SavedData>),
}

impl Value {
	/// Kind of this value's payload.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Null => ValueKind::Null,
			Self::Bool(_) => ValueKind::Bool,
			Self::Int(_) => ValueKind::Int,
			Self::Double(_) => ValueKind::Double,
			Self::String(_) => ValueKind::String,
			Self::Bytes(_) => ValueKind::Bytes,
			Self::List(_) => ValueKind::List,
			Self::Dict(_) => ValueKind::Dict,
			Self::Struct(_) => ValueKind::Struct,
			Self::Ref(_) => ValueKind::Ref,
			Self::Saved(_) => ValueKind::Saved,
		}
	}

	/// True when the payload kind is exactly `kind`.
	pub fn is(&self, kind: ValueKind) -> bool {
		self.kind() == kind
	}

	/// Extract a typed payload.
	///
	/// # Panics
	///
	/// Panics when the value's kind is not exactly `T::KIND`; use
	/// [`Value::try_convert_to`] for coercing access.
	pub fn get<T: FromValue>(&self) -> T {
		assert!(self.kind() == T::KIND, "value kind mismatch: expected {}, got {}", T::KIND, self.kind());
		match T::from_value(self) {
			Some(value) => value,
			None => panic!("value of kind {} does not hold a valid {}", self.kind(), std::any::type_name::<T>()),
		}
	}

	/// Convert to `target` through the conversion table.
	///
	/// Same-kind conversion returns a clone; a missing path returns `None`.
	pub fn try_convert(&self, target: ValueKind) -> Option<Value> {
		if self.kind() == target {
			return Some(self.clone());
		}

		convert::convert(self, target)
	}

	/// Convert to `target` and extract it as `T`.
	pub fn try_convert_to<T: FromValue>(&self) -> Option<T> {
		self.try_convert(T::KIND).and_then(|value| T::from_value(&value))
	}

	/// Structural, type-exact equality.
	pub fn equals(&self, other: &Value) -> bool {
		self == other
	}

	/// Borrow a string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow a byte payload.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Bytes(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow list items.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow a nested dict, materializing a raw one on first access.
	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			Self::Dict(value) => value.get(),
			_ => None,
		}
	}

	/// Name carried by a reference value.
	pub fn as_ref_name(&self) -> Option<&str> {
		match self {
			Self::Ref(name) => Some(name),
			_ => None,
		}
	}

	/// Return a dict-kind value for dicts and dict-carrying saved payloads.
	pub fn dict_value(&self) -> Option<Value> {
		match self {
			Self::Dict(_) => Some(self.clone()),
			Self::Saved(saved) if saved.kind() == crate::pack::SavedKind::Dict => self.try_convert(ValueKind::Dict),
			_ => None,
		}
	}

	/// Child by name for dict values.
	pub fn named_child(&self, name: &str) -> Option<Value> {
		self.as_dict().and_then(|dict| dict.get(name))
	}

	/// Child by index for list values.
	pub fn index_child(&self, index: usize) -> Option<Value> {
		self.as_list().and_then(|items| items.get(index)).cloned()
	}

	/// Append every distinct reference name found in this value tree.
	pub fn collect_refs(&self, out: &mut Vec<Arc<str>>) {
		match self {
			Self::Ref(name) => {
				if !out.contains(name) {
					out.push(name.clone());
				}
			}
			Self::List(items) => {
				for item in items.iter() {
					item.collect_refs(out);
				}
			}
			Self::Dict(slot) => {
				for (_, value) in slot.get().into_iter().flat_map(Dict::iter) {
					value.collect_refs(out);
				}
			}
			_ => {}
		}
	}

	/// Build a list value.
	pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
		Self::List(items.into_iter().collect())
	}

	/// Build a reference value.
	pub fn reference(name: &str) -> Self {
		Self::Ref(Arc::from(name))
	}

	/// Build a struct-bytes value.
	pub fn struct_bytes(bytes: &[u8]) -> Self {
		Self::Struct(Arc::from(bytes))
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(left), Self::Bool(right)) => left == right,
			(Self::Int(left), Self::Int(right)) => left == right,
			(Self::Double(left), Self::Double(right)) => left.to_bits() == right.to_bits(),
			(Self::String(left), Self::String(right)) => left == right,
			(Self::Bytes(left), Self::Bytes(right)) => left == right,
			(Self::List(left), Self::List(right)) => left == right,
			(Self::Dict(left), Self::Dict(right)) => left == right,
			(Self::Struct(left), Self::Struct(right)) => left == right,
			(Self::Ref(left), Self::Ref(right)) => left == right,
			(Self::Saved(left), Self::Saved(right)) => left == right,
			_ => false,
		}
	}
}

/// Nested dict slot: either materialized or a raw byte range into a pack buffer.
#[derive(Clone)]
pub struct DictValue {
	slot: Arc<DictSlot>,
}

enum DictSlot {
	Loaded(Dict),
	Raw(RawDict),
}

struct RawDict {
	buffer: Arc<[u8]>,
	range: Range<usize>,
	parsed: OnceLock<Option<Dict>>,
}

impl DictValue {
	/// Wrap a materialized dict.
	pub fn loaded(dict: Dict) -> Self {
		Self {
			slot: Arc::new(DictSlot::Loaded(dict)),
		}
	}

	/// Refer to an unparsed dict block inside `buffer`.
	pub(crate) fn raw(buffer: Arc<[u8]>, range: Range<usize>) -> Self {
		Self {
			slot: Arc::new(DictSlot::Raw(RawDict {
				buffer,
				range,
				parsed: OnceLock::new(),
			})),
		}
	}

	/// True when the slot holds a materialized dict.
	pub fn is_loaded(&self) -> bool {
		matches!(*self.slot, DictSlot::Loaded(_))
	}

	/// Borrow the dict, parsing a raw slot once on first access.
	///
	/// Returns `None` only when raw bytes do not parse.
	pub fn get(&self) -> Option<&Dict> {
		match &*self.slot {
			DictSlot::Loaded(dict) => Some(dict),
			DictSlot::Raw(raw) => raw.parsed.get_or_init(|| Dict::load_range(&raw.buffer, raw.range.clone()).ok()).as_ref(),
		}
	}

	/// Unparsed dict block bytes, when still raw.
	pub fn raw_bytes(&self) -> Option<&[u8]> {
		match &*self.slot {
			DictSlot::Loaded(_) => None,
			DictSlot::Raw(raw) => Some(&raw.buffer[raw.range.clone()]),
		}
	}

	/// Parse a raw slot into a loaded one, reporting parse failures.
	pub fn materialize(&self) -> Result<DictValue> {
		match &*self.slot {
			DictSlot::Loaded(_) => Ok(self.clone()),
			DictSlot::Raw(raw) => match raw.parsed.get() {
				Some(Some(dict)) => Ok(Self::loaded(dict.clone())),
				_ => Ok(Self::loaded(Dict::load_range(&raw.buffer, raw.range.clone())?)),
			},
		}
	}
}

impl PartialEq for DictValue {
	fn eq(&self, other: &Self) -> bool {
		if Arc::ptr_eq(&self.slot, &other.slot) {
			return true;
		}

		if let (Some(left), Some(right)) = (self.raw_bytes(), other.raw_bytes())
			&& left == right
		{
			return true;
		}

		match (self.get(), other.get()) {
			(Some(left), Some(right)) => left == right,
			_ => false,
		}
	}
}

impl fmt::Debug for DictValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &*self.slot {
			DictSlot::Loaded(dict) => dict.fmt(f),
			DictSlot::Raw(raw) => write!(f, "RawDict({} bytes)", raw.range.len()),
		}
	}
}

/// Typed extraction of a value payload.
pub trait FromValue: Sized {
	/// Kind this type is extracted from.
	const KIND: ValueKind;

	/// Extract from a value of kind [`FromValue::KIND`].
	fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
	const KIND: ValueKind = ValueKind::Bool;

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Bool(value) => Some(*value),
			_ => None,
		}
	}
}

impl FromValue for i32 {
	const KIND: ValueKind = ValueKind::Int;

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Int(value) => Some(*value),
			_ => None,
		}
	}
}

impl FromValue for f64 {
	const KIND: ValueKind = ValueKind::Double;

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Double(value) => Some(*value),
			_ => None,
		}
	}
}

impl FromValue for String {
	const KIND: ValueKind = ValueKind::String;

	fn from_value(value: &Value) -> Option<Self> {
		value.as_str().map(str::to_owned)
	}
}

impl FromValue for Arc<str> {
	const KIND: ValueKind = ValueKind::String;

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(value) => Some(value.clone()),
			_ => None,
		}
	}
}

impl FromValue for Vec<u8> {
	const KIND: ValueKind = ValueKind::Bytes;

	fn from_value(value: &Value) -> Option<Self> {
		value.as_bytes().map(<[u8]>::to_vec)
	}
}

impl FromValue for Arc<[u8]> {
	const KIND: ValueKind = ValueKind::Bytes;

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Bytes(bytes) => Some(bytes.clone()),
			_ => None,
		}
	}
}

impl FromValue for Vec<Value> {
	const KIND: ValueKind = ValueKind::List;

	fn from_value(value: &Value) -> Option<Self> {
		value.as_list().map(<[Value]>::to_vec)
	}
}

impl FromValue for Vec<String> {
	const KIND: ValueKind = ValueKind::List;

	fn from_value(value: &Value) -> Option<Self> {
		value.as_list()?.iter().map(|item| item.try_convert_to::<String>()).collect()
	}
}

impl FromValue for Dict {
	const KIND: ValueKind = ValueKind::Dict;

	fn from_value(value: &Value) -> Option<Self> {
		value.as_dict().cloned()
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Double(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(Arc::from(value))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(Arc::from(value))
	}
}

impl From<Arc<str>> for Value {
	fn from(value: Arc<str>) -> Self {
		Self::String(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(Arc::from(value))
	}
}

impl From<&[u8]> for Value {
	fn from(value: &[u8]) -> Self {
		Self::Bytes(Arc::from(value))
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::List(Arc::from(value))
	}
}

impl From<Vec<String>> for Value {
	fn from(value: Vec<String>) -> Self {
		Self::list(value.into_iter().map(Value::from))
	}
}

impl From<Dict> for Value {
	fn from(value: Dict) -> Self {
		Self::Dict(DictValue::loaded(value))
	}
}

impl From<SavedData> for Value {
	fn from(value: SavedData) -> Self {
		Self::Saved(Arc::new(value))
	}
}
