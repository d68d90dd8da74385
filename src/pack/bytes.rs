use crate::pack::{PackError, Result};

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Create a cursor starting at `pos`.
	pub fn at(bytes: &'a [u8], pos: usize) -> Self {
		Self { bytes, pos }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(PackError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Skip `n` bytes.
	pub fn skip(&mut self, n: usize) -> Result<()> {
		let _ = self.read_exact(n)?;
		Ok(())
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_exact(1)?[0])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `u64`.
	pub fn read_u64_le(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		Ok(i32::from_le_bytes(self.read_array()?))
	}

	/// Read a little-endian `f64`.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.read_array()?))
	}

	/// Read a `u64` length and narrow it to `usize`.
	pub fn read_len_u64(&mut self) -> Result<usize> {
		let at = self.pos;
		let len = self.read_u64_le()?;
		usize::try_from(len).map_err(|_| PackError::LengthOverflow { len, at })
	}

	/// Read a `u32`-length-prefixed byte run.
	pub fn read_bytes_u32(&mut self) -> Result<&'a [u8]> {
		let len = self.read_u32_le()? as usize;
		self.read_exact(len)
	}

	/// Read a `u32`-length-prefixed UTF-8 string.
	pub fn read_str(&mut self) -> Result<&'a str> {
		let at = self.pos;
		let raw = self.read_bytes_u32()?;
		std::str::from_utf8(raw).map_err(|_| PackError::InvalidUtf8 { at })
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}
}

/// Append-only little-endian writer backing pack serialization.
#[derive(Debug, Default)]
pub struct PackWriter {
	out: Vec<u8>,
}

impl PackWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of bytes written so far.
	pub fn pos(&self) -> usize {
		self.out.len()
	}

	/// Borrow the written bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.out
	}

	/// Consume the writer and return its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.out
	}

	/// Write one byte.
	pub fn write_u8(&mut self, value: u8) {
		self.out.push(value);
	}

	/// Write a little-endian `u32`.
	pub fn write_u32_le(&mut self, value: u32) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	/// Write a little-endian `u64`.
	pub fn write_u64_le(&mut self, value: u64) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	/// Write a little-endian `i32`.
	pub fn write_i32_le(&mut self, value: i32) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	/// Write a little-endian `f64`.
	pub fn write_f64_le(&mut self, value: f64) {
		self.out.extend_from_slice(&value.to_le_bytes());
	}

	/// Write raw bytes without a length prefix.
	pub fn write_raw(&mut self, bytes: &[u8]) {
		self.out.extend_from_slice(bytes);
	}

	/// Write a `u32`-length-prefixed byte run.
	pub fn write_bytes_u32(&mut self, bytes: &[u8]) {
		self.write_u32_le(bytes.len() as u32);
		self.write_raw(bytes);
	}

	/// Write a `u32`-length-prefixed UTF-8 string.
	pub fn write_str(&mut self, value: &str) {
		self.write_bytes_u32(value.as_bytes());
	}

	/// Reserve a `u64` slot and return its offset for [`PackWriter::patch_u64_le`].
	pub fn reserve_u64(&mut self) -> usize {
		let at = self.pos();
		self.write_u64_le(0);
		at
	}

	/// Overwrite a previously reserved `u64` slot.
	pub fn patch_u64_le(&mut self, at: usize, value: u64) {
		self.out[at..at + 8].copy_from_slice(&value.to_le_bytes());
	}
}
