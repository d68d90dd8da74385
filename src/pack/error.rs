use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors produced while reading, writing, and parsing pack data.
#[derive(Debug, Error)]
pub enum PackError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Dict block did not start with the dict magic.
	#[error("bad dict magic at offset {at}: 0x{got:08x}")]
	BadDictMagic {
		/// Byte offset of the magic read.
		at: usize,
		/// Value found instead of the magic.
		got: u32,
	},
	/// Persisted value carried an unknown kind tag.
	#[error("unknown value type tag {tag} at offset {at}")]
	UnknownTypeTag {
		/// Offending tag byte.
		tag: u8,
		/// Byte offset of the tag.
		at: usize,
	},
	/// Persisted string was not UTF-8.
	#[error("invalid utf-8 string at offset {at}")]
	InvalidUtf8 {
		/// Byte offset of the string payload.
		at: usize,
	},
	/// A block did not consume all of its declared bytes.
	#[error("unexpected trailing bytes at offset {at} ({rem} remaining)")]
	TrailingBytes {
		/// Offset where parsing stopped.
		at: usize,
		/// Unconsumed bytes.
		rem: usize,
	},
	/// Declared length does not fit in memory on this platform.
	#[error("declared length {len} at offset {at} is too large")]
	LengthOverflow {
		/// Declared length.
		len: u64,
		/// Byte offset of the length field.
		at: usize,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Decompressed size did not match the recorded size.
	#[error("decompressed size mismatch: expected {expected}, got {got}")]
	DecompressedSizeMismatch {
		/// Size recorded alongside the payload.
		expected: u64,
		/// Actual decompressed size.
		got: usize,
	},
	/// Persisted compression byte is unknown.
	#[error("unknown compression mode {mode}")]
	UnknownCompression {
		/// Offending compression byte.
		mode: u8,
	},
	/// Persisted saved-data kind byte is unknown.
	#[error("unknown saved data kind {kind}")]
	UnknownSavedKind {
		/// Offending kind byte.
		kind: u8,
	},
	/// JSON text failed to parse.
	#[error("Failed parsing JSON at pos: {offset}\n  -->{excerpt}")]
	JsonParse {
		/// Byte offset of the offending token.
		offset: usize,
		/// Up to 32 characters of text starting at `offset`.
		excerpt: String,
	},
	/// No factory is registered for a type name.
	#[error("no factory registered for type: {type_name}")]
	UnknownFactory {
		/// Requested type name.
		type_name: String,
	},
	/// Nested value depth exceeded the reader limit.
	#[error("value nesting exceeded {max_depth} levels at offset {at}")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
		/// Offset where the limit was hit.
		at: usize,
	},
}
