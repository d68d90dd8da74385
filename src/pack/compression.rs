use std::io::Read;

use crate::pack::{PackError, Result};

const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;
const ZSTD_LEVEL: i32 = 19;

/// Compression mode of a saved payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Raw uncompressed bytes.
	None,
	/// zstd-compressed bytes.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}

	/// Persisted tag for this mode.
	pub fn tag(self) -> u8 {
		match self {
			Self::None => 0,
			Self::Zstd => 1,
		}
	}

	/// Decode a persisted tag.
	pub fn from_tag(mode: u8) -> Result<Self> {
		match mode {
			0 => Ok(Self::None),
			1 => Ok(Self::Zstd),
			_ => Err(PackError::UnknownCompression { mode }),
		}
	}
}

/// Compress `raw` with zstd.
pub fn compress_bytes(raw: &[u8]) -> Result<Vec<u8>> {
	Ok(zstd::stream::encode_all(raw, ZSTD_LEVEL)?)
}

/// Decode a payload stored with `compression`, checking the recorded size.
pub fn decode_bytes(compression: Compression, stored: &[u8], expected_len: u64) -> Result<Vec<u8>> {
	let out = match compression {
		Compression::None => stored.to_vec(),
		Compression::Zstd => decode_zstd(stored)?,
	};

	if out.len() as u64 != expected_len {
		return Err(PackError::DecompressedSizeMismatch {
			expected: expected_len,
			got: out.len(),
		});
	}

	Ok(out)
}

fn decode_zstd(raw: &[u8]) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > MAX_DECOMPRESSED_BYTES {
			return Err(PackError::DecompressedTooLarge { limit: MAX_DECOMPRESSED_BYTES });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}
