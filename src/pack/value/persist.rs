use std::sync::Arc;

use crate::pack::{Compression, Cursor, DictValue, PackError, PackWriter, Result, SavedData, SavedKind, Value, ValueKind};

/// Maximum list nesting accepted by the typed reader.
const MAX_DEPTH: u32 = 256;

impl Value {
	/// Append this value with its leading kind tag.
	///
	/// The writer does not check nesting. [`Value::load_typed`] accepts at most
	/// 256 nested lists, so deeper values do not read back. The JSON parser
	/// has its own 256-level limit.
	pub fn save_typed(&self, writer: &mut PackWriter) {
		writer.write_u8(self.kind().tag());

		match self {
			Value::Null => {}
			Value::Bool(flag) => writer.write_u8(u8::from(*flag)),
			Value::Int(number) => writer.write_i32_le(*number),
			Value::Double(number) => writer.write_f64_le(*number),
			Value::String(text) => writer.write_str(text),
			Value::Bytes(bytes) => {
				writer.write_u64_le(bytes.len() as u64);
				writer.write_raw(bytes);
			}
			Value::List(items) => {
				writer.write_u32_le(items.len() as u32);
				for item in items.iter() {
					item.save_typed(writer);
				}
			}
			Value::Dict(slot) => save_dict_payload(slot, writer),
			Value::Struct(bytes) => writer.write_bytes_u32(bytes),
			Value::Ref(name) => writer.write_str(name),
			Value::Saved(saved) => {
				writer.write_u8(saved.kind().tag());
				writer.write_u8(saved.compression().tag());
				writer.write_u64_le(saved.original_len());
				writer.write_u64_le(saved.stored().len() as u64);
				writer.write_raw(saved.stored());
			}
		}
	}

	/// Decode one typed value that must span all of `bytes`.
	pub fn load_typed(bytes: &[u8]) -> Result<Value> {
		let buffer: Arc<[u8]> = Arc::from(bytes);
		let mut cursor = Cursor::new(&buffer);
		let value = Self::read_typed(&mut cursor, &buffer, 0)?;

		if cursor.remaining() != 0 {
			return Err(PackError::TrailingBytes {
				at: cursor.pos(),
				rem: cursor.remaining(),
			});
		}

		Ok(value)
	}

	/// Decode one typed value from `cursor`, which reads from `buffer`.
	///
	/// Nested dicts are kept as raw ranges of `buffer`.
	pub(crate) fn read_typed(cursor: &mut Cursor<'_>, buffer: &Arc<[u8]>, depth: u32) -> Result<Value> {
		if depth > MAX_DEPTH {
			return Err(PackError::DepthExceeded {
				max_depth: MAX_DEPTH,
				at: cursor.pos(),
			});
		}

		let at = cursor.pos();
		let tag = cursor.read_u8()?;
		let kind = ValueKind::from_tag(tag).ok_or(PackError::UnknownTypeTag { tag, at })?;

		let value = match kind {
			ValueKind::Null => Value::Null,
			ValueKind::Bool => Value::Bool(cursor.read_u8()? != 0),
			ValueKind::Int => Value::Int(cursor.read_i32_le()?),
			ValueKind::Double => Value::Double(cursor.read_f64_le()?),
			ValueKind::String => Value::from(cursor.read_str()?),
			ValueKind::Bytes => {
				let len = cursor.read_len_u64()?;
				Value::from(cursor.read_exact(len)?)
			}
			ValueKind::List => {
				let count = cursor.read_u32_le()? as usize;
				let mut items = Vec::with_capacity(count.min(cursor.remaining()));
				for _ in 0..count {
					items.push(Self::read_typed(cursor, buffer, depth + 1)?);
				}
				Value::from(items)
			}
			ValueKind::Dict => {
				let len = cursor.read_len_u64()?;
				let start = cursor.pos();
				cursor.skip(len)?;
				Value::Dict(DictValue::raw(buffer.clone(), start..start + len))
			}
			ValueKind::Struct => Value::struct_bytes(cursor.read_bytes_u32()?),
			ValueKind::Ref => Value::reference(cursor.read_str()?),
			ValueKind::Saved => {
				let kind = SavedKind::from_tag(cursor.read_u8()?)?;
				let compression = Compression::from_tag(cursor.read_u8()?)?;
				let original_len = cursor.read_u64_le()?;
				let stored_len = cursor.read_len_u64()?;
				let stored = cursor.read_exact(stored_len)?;
				Value::from(SavedData::from_parts(kind, compression, original_len, stored))
			}
		};

		Ok(value)
	}
}

fn save_dict_payload(slot: &DictValue, writer: &mut PackWriter) {
	let len_at = writer.reserve_u64();
	let start = writer.pos();

	match (slot.raw_bytes(), slot.get()) {
		(Some(raw), _) => writer.write_raw(raw),
		(None, Some(dict)) => dict.save(writer, None),
		(None, None) => {}
	}

	let len = writer.pos() - start;
	writer.patch_u64_le(len_at, len as u64);
}
