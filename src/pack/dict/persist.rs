use std::ops::Range;
use std::sync::Arc;

use crate::pack::{Cursor, Dict, PackError, PackWriter, Result, Value};

/// Leading magic of every dict block (`RDCT`).
pub const DICT_MAGIC: u32 = 0x5443_4452;

/// Byte range of one top-level entry's typed value inside a saved dict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	/// Entry name.
	pub name: String,
	/// Offset of the value's type tag in the writer output.
	pub offset: usize,
	/// Encoded size including the tag.
	pub size: usize,
}

impl Dict {
	/// Append the dict block, optionally reporting every entry's location.
	pub fn save(&self, writer: &mut PackWriter, mut locations: Option<&mut Vec<Location>>) {
		writer.write_u32_le(DICT_MAGIC);
		writer.write_u32_le(self.len() as u32);

		for (name, value) in self.iter() {
			writer.write_str(name);
			let offset = writer.pos();
			value.save_typed(writer);

			if let Some(locations) = locations.as_deref_mut() {
				locations.push(Location {
					name: name.to_string(),
					offset,
					size: writer.pos() - offset,
				});
			}
		}
	}

	/// Serialize into a fresh byte vector.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut writer = PackWriter::new();
		self.save(&mut writer, None);
		writer.into_bytes()
	}

	/// Parse a dict block spanning all of `bytes`. Nested dicts stay raw.
	pub fn load(bytes: &[u8]) -> Result<Dict> {
		Self::load_shared(&Arc::from(bytes))
	}

	/// Parse a dict block spanning all of a shared buffer.
	pub fn load_shared(buffer: &Arc<[u8]>) -> Result<Dict> {
		Self::load_range(buffer, 0..buffer.len())
	}

	pub(crate) fn load_range(buffer: &Arc<[u8]>, range: Range<usize>) -> Result<Dict> {
		let bytes = buffer.get(..range.end).ok_or(PackError::UnexpectedEof {
			at: range.start,
			need: range.len(),
			rem: buffer.len().saturating_sub(range.start),
		})?;
		let mut cursor = Cursor::at(bytes, range.start);

		let at = cursor.pos();
		let magic = cursor.read_u32_le()?;
		if magic != DICT_MAGIC {
			return Err(PackError::BadDictMagic { at, got: magic });
		}

		let count = cursor.read_u32_le()? as usize;
		let mut dict = Dict::new();
		for _ in 0..count {
			let name = cursor.read_str()?;
			let value = Value::read_typed(&mut cursor, buffer, 0)?;
			dict.set_value(Arc::from(name), value);
		}

		if cursor.remaining() != 0 {
			return Err(PackError::TrailingBytes {
				at: cursor.pos(),
				rem: cursor.remaining(),
			});
		}

		Ok(dict)
	}

	/// Materialize every direct child dict, including dicts held in lists at
	/// any list depth.
	///
	/// Grandchildren stay raw until accessed or until this is called on them.
	pub fn load_child_dicts(&mut self) -> Result<()> {
		for value in self.entries.values_mut() {
			*value = materialize(value)?;
		}
		Ok(())
	}
}

fn materialize(value: &Value) -> Result<Value> {
	match value {
		Value::Dict(slot) if !slot.is_loaded() => Ok(Value::Dict(slot.materialize()?)),
		Value::List(items) if items.iter().any(holds_raw_dict) => {
			let items = items.iter().map(materialize).collect::<Result<Vec<_>>>()?;
			Ok(Value::from(items))
		}
		_ => Ok(value.clone()),
	}
}

fn holds_raw_dict(value: &Value) -> bool {
	match value {
		Value::Dict(slot) => !slot.is_loaded(),
		Value::List(items) => items.iter().any(holds_raw_dict),
		_ => false,
	}
}
