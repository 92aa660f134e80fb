//! BIG bitmap codec.
//!
//! A BIG file is a 10-byte little-endian header followed by the raw samples
//! in row-major order:
//!
//! ```text
//! width: u16, height: u16, element-type tag: u16, reserved: u32 = 0
//! ```
//!
//! The serialized length of any bitmap is known before a single body byte is
//! produced, see [`file_size`]. The archive writer relies on [`write`]
//! producing exactly that many bytes.

use crate::bitmap::{Bitmap, ElementType, Pixels};
use std::io::{self, Read, Write};

/// Length of the BIG header in bytes.
pub const HEADER_LEN: u64 = 10;

/// Exact number of bytes [`write`] produces for this bitmap.
#[must_use]
pub fn file_size(bitmap: &Bitmap) -> u64 {
	HEADER_LEN
		+ bitmap.width() as u64 * bitmap.height() as u64 * bitmap.element_type().size() as u64
}

/// Serializes a bitmap to a byte sink.
///
/// # Errors
///
/// Fails if the dimensions exceed the 16-bit limits of the BIG header or if
/// the sink fails.
pub fn write<W: Write>(bitmap: &Bitmap, sink: &mut W) -> io::Result<()> {
	let width = u16::try_from(bitmap.width()).map_err(|_| {
		io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("bitmap width {} exceeds the BIG format limit", bitmap.width()),
		)
	})?;
	let height = u16::try_from(bitmap.height()).map_err(|_| {
		io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("bitmap height {} exceeds the BIG format limit", bitmap.height()),
		)
	})?;
	sink.write_all(&width.to_le_bytes())?;
	sink.write_all(&height.to_le_bytes())?;
	sink.write_all(&bitmap.element_type().tag().to_le_bytes())?;
	sink.write_all(&0u32.to_le_bytes())?;
	match bitmap.pixels() {
		Pixels::I8(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::U8(data) => sink.write_all(data)?,
		Pixels::I16(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::U16(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::I32(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::U32(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::I64(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::U64(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::F32(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
		Pixels::F64(data) => {
			for sample in data {
				sink.write_all(&sample.to_le_bytes())?;
			}
		}
	}
	Ok(())
}

fn read_body(source: &mut impl Read, count: usize, size: usize) -> io::Result<Vec<u8>> {
	let mut bytes = vec![0; count * size];
	source.read_exact(&mut bytes)?;
	Ok(bytes)
}

/// Deserializes a bitmap from a byte source.
///
/// # Errors
///
/// Fails if the source ends early, carries an unknown element-type tag, or
/// fails itself.
pub fn read<R: Read>(source: &mut R) -> io::Result<Bitmap> {
	let mut header = [0; HEADER_LEN as usize];
	source.read_exact(&mut header)?;
	let width = u16::from_le_bytes([header[0], header[1]]);
	let height = u16::from_le_bytes([header[2], header[3]]);
	let tag = u16::from_le_bytes([header[4], header[5]]);
	let element = ElementType::from_tag(tag).ok_or_else(|| {
		io::Error::new(
			io::ErrorKind::InvalidData,
			format!("unknown BIG element-type tag {tag:#06x}"),
		)
	})?;
	let count = width as usize * height as usize;
	let bytes = read_body(source, count, element.size())?;
	let pixels = match element {
		ElementType::I8 => Pixels::I8(bytes.iter().map(|byte| *byte as i8).collect()),
		ElementType::U8 => Pixels::U8(bytes),
		ElementType::I16 => Pixels::I16(
			bytes
				.chunks_exact(2)
				.map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
				.collect(),
		),
		ElementType::U16 => Pixels::U16(
			bytes
				.chunks_exact(2)
				.map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
				.collect(),
		),
		ElementType::I32 => Pixels::I32(
			bytes
				.chunks_exact(4)
				.map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
				.collect(),
		),
		ElementType::U32 => Pixels::U32(
			bytes
				.chunks_exact(4)
				.map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
				.collect(),
		),
		ElementType::I64 => Pixels::I64(
			bytes
				.chunks_exact(8)
				.map(|chunk| {
					i64::from_le_bytes([
						chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
						chunk[7],
					])
				})
				.collect(),
		),
		ElementType::U64 => Pixels::U64(
			bytes
				.chunks_exact(8)
				.map(|chunk| {
					u64::from_le_bytes([
						chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
						chunk[7],
					])
				})
				.collect(),
		),
		ElementType::F32 => Pixels::F32(
			bytes
				.chunks_exact(4)
				.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
				.collect(),
		),
		ElementType::F64 => Pixels::F64(
			bytes
				.chunks_exact(8)
				.map(|chunk| {
					f64::from_le_bytes([
						chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
						chunk[7],
					])
				})
				.collect(),
		),
	};
	Bitmap::new(width as u32, height as u32, pixels)
		.map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn samples() -> Vec<Bitmap> {
		vec![
			Bitmap::new(2, 2, Pixels::I8(vec![-1, 0, 1, 2])).unwrap(),
			Bitmap::new(2, 2, Pixels::U8(vec![0, 1, 254, 255])).unwrap(),
			Bitmap::new(2, 1, Pixels::I16(vec![-300, 300])).unwrap(),
			Bitmap::new(2, 1, Pixels::U16(vec![0, 65_535])).unwrap(),
			Bitmap::new(1, 2, Pixels::I32(vec![-70_000, 70_000])).unwrap(),
			Bitmap::new(1, 2, Pixels::U32(vec![0, 4_000_000_000])).unwrap(),
			Bitmap::new(1, 1, Pixels::I64(vec![-5_000_000_000])).unwrap(),
			Bitmap::new(1, 1, Pixels::U64(vec![18_000_000_000_000_000_000])).unwrap(),
			Bitmap::new(3, 1, Pixels::F32(vec![0.5, -1.5, 2.25])).unwrap(),
			Bitmap::new(1, 3, Pixels::F64(vec![0.5, -1.5, 2.25])).unwrap(),
		]
	}

	#[test]
	fn size_matches_write() {
		for bitmap in samples() {
			let mut bytes = Vec::new();
			write(&bitmap, &mut bytes).unwrap();
			assert_eq!(bytes.len() as u64, file_size(&bitmap));
		}
	}

	#[test]
	fn round_trip() {
		for bitmap in samples() {
			let mut bytes = Vec::new();
			write(&bitmap, &mut bytes).unwrap();
			let read = read(&mut bytes.as_slice()).unwrap();
			assert_eq!(read, bitmap);
		}
	}

	#[test]
	fn header_layout() {
		let bitmap = Bitmap::new(2, 1, Pixels::U16(vec![0x1234, 0x5678])).unwrap();
		let mut bytes = Vec::new();
		write(&bitmap, &mut bytes).unwrap();
		assert_eq!(
			bytes,
			[
				2, 0, // width
				1, 0, // height
				0x21, 0, // tag
				0, 0, 0, 0, // reserved
				0x34, 0x12, 0x78, 0x56, // samples
			],
		);
	}

	#[test]
	fn oversized_dimensions_are_rejected() {
		let bitmap = Bitmap::new(70_000, 1, Pixels::U8(vec![0; 70_000])).unwrap();
		let mut bytes = Vec::new();
		let err = write(&bitmap, &mut bytes).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
	}
}
