use std::sync::Arc;

use crate::pack::{Compression, Dict, PackError, PackWriter, Result, compress_bytes, decode_bytes};

/// What a saved payload decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedKind {
	/// Plain byte blob.
	Bytes,
	/// Serialized dict block.
	Dict,
}

impl SavedKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bytes => "bytes",
			Self::Dict => "dict",
		}
	}

	/// Persisted tag for this kind.
	pub fn tag(self) -> u8 {
		match self {
			Self::Bytes => 0,
			Self::Dict => 1,
		}
	}

	/// Decode a persisted tag.
	pub fn from_tag(kind: u8) -> Result<Self> {
		match kind {
			0 => Ok(Self::Bytes),
			1 => Ok(Self::Dict),
			_ => Err(PackError::UnknownSavedKind { kind }),
		}
	}
}

/// Bytes or a dict stored, optionally zstd-compressed, behind a saved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedData {
	kind: SavedKind,
	compression: Compression,
	original_len: u64,
	stored: Arc<[u8]>,
}

impl SavedData {
	/// Store a byte blob.
	pub fn from_bytes(raw: &[u8], compress: bool) -> Result<Self> {
		Self::store(SavedKind::Bytes, raw, compress)
	}

	/// Store a serialized dict.
	pub fn from_dict(dict: &Dict, compress: bool) -> Result<Self> {
		let mut writer = PackWriter::new();
		dict.save(&mut writer, None);
		Self::store(SavedKind::Dict, writer.as_bytes(), compress)
	}

	pub(crate) fn from_parts(kind: SavedKind, compression: Compression, original_len: u64, stored: &[u8]) -> Self {
		Self {
			kind,
			compression,
			original_len,
			stored: Arc::from(stored),
		}
	}

	fn store(kind: SavedKind, raw: &[u8], compress: bool) -> Result<Self> {
		let (compression, stored) = if compress {
			(Compression::Zstd, compress_bytes(raw)?)
		} else {
			(Compression::None, raw.to_vec())
		};

		Ok(Self {
			kind,
			compression,
			original_len: raw.len() as u64,
			stored: Arc::from(stored),
		})
	}

	/// Payload kind.
	pub fn kind(&self) -> SavedKind {
		self.kind
	}

	/// Compression applied to the stored bytes.
	pub fn compression(&self) -> Compression {
		self.compression
	}

	/// Size of the payload before compression.
	pub fn original_len(&self) -> u64 {
		self.original_len
	}

	/// Stored (possibly compressed) bytes.
	pub fn stored(&self) -> &[u8] {
		&self.stored
	}

	/// Decode the stored bytes.
	pub fn load_bytes(&self) -> Result<Vec<u8>> {
		decode_bytes(self.compression, &self.stored, self.original_len)
	}

	/// Decode the stored bytes as a dict block.
	pub fn load_dict(&self) -> Result<Dict> {
		Dict::load(&self.load_bytes()?)
	}
}
