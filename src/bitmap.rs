//! Numeric bitmap payloads.
//!
//! A [`Bitmap`] is a 2-D array with one numeric sample per pixel, stored
//! row-major. The element type is drawn from a fixed closed set and selected
//! at runtime through the [`Pixels`] union, so the savers dispatch on the
//! [`ElementType`] tag instead of being generic over the sample type.

use crate::error::{Error, Result};

/// The closed set of per-pixel element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
	/// Signed 8-bit integer samples.
	I8,
	/// Unsigned 8-bit integer samples.
	U8,
	/// Signed 16-bit integer samples.
	I16,
	/// Unsigned 16-bit integer samples.
	U16,
	/// Signed 32-bit integer samples.
	I32,
	/// Unsigned 32-bit integer samples.
	U32,
	/// Signed 64-bit integer samples.
	I64,
	/// Unsigned 64-bit integer samples.
	U64,
	/// Single-precision float samples.
	F32,
	/// Double-precision float samples.
	F64,
}

impl ElementType {
	/// Size of one sample in bytes.
	#[must_use]
	pub const fn size(self) -> usize {
		match self {
			Self::I8 | Self::U8 => 1,
			Self::I16 | Self::U16 => 2,
			Self::I32 | Self::U32 | Self::F32 => 4,
			Self::I64 | Self::U64 | Self::F64 => 8,
		}
	}
	/// Tag identifying this element type in a BIG header.
	///
	/// The low nibble encodes `log2` of the sample size, the high nibble the
	/// kind (`1` signed, `2` unsigned, `3` float).
	#[must_use]
	pub const fn tag(self) -> u16 {
		match self {
			Self::I8 => 0x10,
			Self::U8 => 0x20,
			Self::I16 => 0x11,
			Self::U16 => 0x21,
			Self::I32 => 0x12,
			Self::U32 => 0x22,
			Self::I64 => 0x13,
			Self::U64 => 0x23,
			Self::F32 => 0x32,
			Self::F64 => 0x33,
		}
	}
	/// Element type of a BIG header tag, or `None` for an unknown tag.
	#[must_use]
	pub const fn from_tag(tag: u16) -> Option<Self> {
		match tag {
			0x10 => Some(Self::I8),
			0x20 => Some(Self::U8),
			0x11 => Some(Self::I16),
			0x21 => Some(Self::U16),
			0x12 => Some(Self::I32),
			0x22 => Some(Self::U32),
			0x13 => Some(Self::I64),
			0x23 => Some(Self::U64),
			0x32 => Some(Self::F32),
			0x33 => Some(Self::F64),
			_ => None,
		}
	}
}

/// Sample storage of one bitmap, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
	/// Signed 8-bit samples.
	I8(Vec<i8>),
	/// Unsigned 8-bit samples.
	U8(Vec<u8>),
	/// Signed 16-bit samples.
	I16(Vec<i16>),
	/// Unsigned 16-bit samples.
	U16(Vec<u16>),
	/// Signed 32-bit samples.
	I32(Vec<i32>),
	/// Unsigned 32-bit samples.
	U32(Vec<u32>),
	/// Signed 64-bit samples.
	I64(Vec<i64>),
	/// Unsigned 64-bit samples.
	U64(Vec<u64>),
	/// Single-precision float samples.
	F32(Vec<f32>),
	/// Double-precision float samples.
	F64(Vec<f64>),
}

impl Pixels {
	/// Element type of the stored samples.
	#[must_use]
	pub const fn element_type(&self) -> ElementType {
		match self {
			Self::I8(_) => ElementType::I8,
			Self::U8(_) => ElementType::U8,
			Self::I16(_) => ElementType::I16,
			Self::U16(_) => ElementType::U16,
			Self::I32(_) => ElementType::I32,
			Self::U32(_) => ElementType::U32,
			Self::I64(_) => ElementType::I64,
			Self::U64(_) => ElementType::U64,
			Self::F32(_) => ElementType::F32,
			Self::F64(_) => ElementType::F64,
		}
	}
	/// Number of stored samples.
	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			Self::I8(data) => data.len(),
			Self::U8(data) => data.len(),
			Self::I16(data) => data.len(),
			Self::U16(data) => data.len(),
			Self::I32(data) => data.len(),
			Self::U32(data) => data.len(),
			Self::I64(data) => data.len(),
			Self::U64(data) => data.len(),
			Self::F32(data) => data.len(),
			Self::F64(data) => data.len(),
		}
	}
	/// Whether no samples are stored.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A single 2-D image payload with row-major samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
	width: u32,
	height: u32,
	pixels: Pixels,
}

impl Bitmap {
	/// Wraps row-major samples into a bitmap of the given dimensions.
	///
	/// # Errors
	///
	/// Fails with [`Error::Config`] if the sample count does not equal
	/// `width * height`.
	pub fn new(width: u32, height: u32, pixels: Pixels) -> Result<Self> {
		let expected = width as usize * height as usize;
		if pixels.len() != expected {
			return Err(Error::Config(format!(
				"bitmap of {}x{} pixels needs {} samples but got {}",
				width,
				height,
				expected,
				pixels.len(),
			)));
		}
		Ok(Self {
			width,
			height,
			pixels,
		})
	}
	/// Width in pixels.
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}
	/// Height in pixels.
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}
	/// Element type of the samples.
	#[must_use]
	pub const fn element_type(&self) -> ElementType {
		self.pixels.element_type()
	}
	/// The stored samples in row-major order.
	#[must_use]
	pub const fn pixels(&self) -> &Pixels {
		&self.pixels
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_count_must_match_dimensions() {
		let bitmap = Bitmap::new(3, 2, Pixels::U8(vec![0; 6]));
		assert!(bitmap.is_ok());
		let bitmap = Bitmap::new(3, 2, Pixels::U8(vec![0; 5]));
		assert!(matches!(bitmap, Err(Error::Config(_))));
	}

	#[test]
	fn tags_round_trip() {
		for element in [
			ElementType::I8,
			ElementType::U8,
			ElementType::I16,
			ElementType::U16,
			ElementType::I32,
			ElementType::U32,
			ElementType::I64,
			ElementType::U64,
			ElementType::F32,
			ElementType::F64,
		] {
			assert_eq!(ElementType::from_tag(element.tag()), Some(element));
		}
		assert_eq!(ElementType::from_tag(0x42), None);
	}
}
