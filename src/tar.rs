//! Streaming POSIX ustar writer.
//!
//! Exactly the write-once subset the saver needs: sequential entries, each a
//! 512-byte header followed by the declared number of body bytes, zero-padded
//! to the next block boundary, with two zero blocks as trailer. Headers are
//! emitted strictly before bodies and are never rewritten, so an entry's body
//! length must be known up front and the body callback must produce exactly
//! that many bytes.
//!
//! Entry metadata is fixed (mode `0644`, uid/gid 0, mtime 0) so repeated runs
//! of the same input produce byte-identical archives.

use std::io::{self, Write};

const BLOCK_LEN: usize = 512;

/// A sequential archive session over a byte sink.
///
/// The trailer is written by [`finish`](Self::finish), or on drop if the
/// session ends early on an error path.
#[derive(Debug)]
pub struct TarWriter<W: Write> {
	sink: W,
	finished: bool,
}

struct BodySink<'a, W: Write> {
	sink: &'a mut W,
	written: u64,
}

impl<W: Write> Write for BodySink<'_, W> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let written = self.sink.write(buf)?;
		self.written += written as u64;
		Ok(written)
	}
	fn flush(&mut self) -> io::Result<()> {
		self.sink.flush()
	}
}

fn header(name: &str, size: u64) -> io::Result<[u8; BLOCK_LEN]> {
	let mut block = [0; BLOCK_LEN];
	let name = name.as_bytes();
	if name.len() > 100 {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!(
				"entry name of {} bytes exceeds the 100-byte tar limit",
				name.len(),
			),
		));
	}
	if size > 0o777_7777_7777 {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("entry of {size} bytes exceeds the tar size limit"),
		));
	}
	block[..name.len()].copy_from_slice(name);
	block[100..108].copy_from_slice(b"0000644\0");
	block[108..116].copy_from_slice(b"0000000\0");
	block[116..124].copy_from_slice(b"0000000\0");
	block[124..136].copy_from_slice(format!("{size:011o}\0").as_bytes());
	block[136..148].copy_from_slice(b"00000000000\0");
	block[148..156].copy_from_slice(b"        ");
	block[156] = b'0';
	block[257..263].copy_from_slice(b"ustar\0");
	block[263..265].copy_from_slice(b"00");
	let checksum = block.iter().map(|byte| *byte as u64).sum::<u64>();
	block[148..155].copy_from_slice(format!("{checksum:06o}\0").as_bytes());
	// Checksum field ends with an octal digit, NUL, space.
	block[155] = b' ';
	Ok(block)
}

impl<W: Write> TarWriter<W> {
	/// Starts an archive session over a byte sink.
	pub const fn new(sink: W) -> Self {
		Self {
			sink,
			finished: false,
		}
	}
	/// Appends one entry.
	///
	/// The header declares `size` body bytes and `body` must write exactly
	/// that many to the sink it is handed.
	///
	/// # Errors
	///
	/// Fails if the name exceeds 100 bytes, the size exceeds the 11-digit
	/// octal header field, the body callback fails or produces a byte count
	/// other than `size`, or the sink fails. The sink position is
	/// unspecified after a failed append; the session may only be finished.
	pub fn append<F>(&mut self, name: &str, size: u64, body: F) -> io::Result<()>
	where
		F: FnOnce(&mut dyn Write) -> io::Result<()>,
	{
		let header = header(name, size)?;
		self.sink.write_all(&header)?;
		let mut body_sink = BodySink {
			sink: &mut self.sink,
			written: 0,
		};
		body(&mut body_sink)?;
		let written = body_sink.written;
		if written != size {
			return Err(io::Error::new(
				io::ErrorKind::InvalidData,
				format!("entry {name:?} declared {size} body bytes but wrote {written}"),
			));
		}
		let padding = (BLOCK_LEN - size as usize % BLOCK_LEN) % BLOCK_LEN;
		self.sink.write_all(&[0; BLOCK_LEN][..padding])?;
		Ok(())
	}
	/// Writes the trailer and flushes the sink.
	///
	/// Idempotent; called on drop with the error discarded, so call it
	/// explicitly on the success path.
	///
	/// # Errors
	///
	/// Fails if the sink fails.
	pub fn finish(&mut self) -> io::Result<()> {
		if self.finished {
			return Ok(());
		}
		self.finished = true;
		self.sink.write_all(&[0; 2 * BLOCK_LEN])?;
		self.sink.flush()
	}
}

impl<W: Write> Drop for TarWriter<W> {
	fn drop(&mut self) {
		let _ = self.finish();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn verify_checksum(header: &[u8]) {
		let mut unsigned = header.to_vec();
		unsigned[148..156].copy_from_slice(b"        ");
		let checksum = unsigned.iter().map(|byte| *byte as u64).sum::<u64>();
		let field = std::str::from_utf8(&header[148..154]).unwrap();
		assert_eq!(u64::from_str_radix(field, 8).unwrap(), checksum);
		assert_eq!(header[154], 0);
		assert_eq!(header[155], b' ');
	}

	#[test]
	fn single_entry_layout() {
		let mut bytes = Vec::new();
		let mut tar = TarWriter::new(&mut bytes);
		tar.append("a.big", 5, |sink| sink.write_all(b"hello"))
			.unwrap();
		tar.finish().unwrap();
		drop(tar);
		// Header, one padded body block, two trailer blocks.
		assert_eq!(bytes.len(), 4 * BLOCK_LEN);
		assert_eq!(&bytes[..5], b"a.big");
		assert!(bytes[5..100].iter().all(|byte| *byte == 0));
		assert_eq!(&bytes[100..108], b"0000644\0");
		assert_eq!(&bytes[124..136], b"00000000005\0");
		assert_eq!(&bytes[136..148], b"00000000000\0");
		assert_eq!(bytes[156], b'0');
		assert_eq!(&bytes[257..265], b"ustar\000");
		verify_checksum(&bytes[..BLOCK_LEN]);
		assert_eq!(&bytes[BLOCK_LEN..BLOCK_LEN + 5], b"hello");
		assert!(bytes[BLOCK_LEN + 5..].iter().all(|byte| *byte == 0));
	}

	#[test]
	fn block_sized_body_is_not_padded() {
		let mut bytes = Vec::new();
		let mut tar = TarWriter::new(&mut bytes);
		tar.append("full", 512, |sink| sink.write_all(&[7; 512]))
			.unwrap();
		tar.finish().unwrap();
		drop(tar);
		assert_eq!(bytes.len(), 4 * BLOCK_LEN);
		assert_eq!(&bytes[BLOCK_LEN..2 * BLOCK_LEN], [7; 512]);
		assert!(bytes[2 * BLOCK_LEN..].iter().all(|byte| *byte == 0));
	}

	#[test]
	fn body_length_mismatch_is_rejected() {
		let mut bytes = Vec::new();
		let mut tar = TarWriter::new(&mut bytes);
		let err = tar
			.append("a.big", 5, |sink| sink.write_all(b"hell"))
			.unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidData);
	}

	#[test]
	fn oversized_name_is_rejected() {
		let mut bytes = Vec::new();
		let mut tar = TarWriter::new(&mut bytes);
		let name = "x".repeat(101);
		let err = tar.append(&name, 0, |_| Ok(())).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
	}

	#[test]
	fn drop_writes_the_trailer() {
		let mut bytes = Vec::new();
		{
			let mut tar = TarWriter::new(&mut bytes);
			tar.append("a.big", 1, |sink| sink.write_all(b"x")).unwrap();
			// Dropped without finish, as on an error path.
		}
		assert_eq!(bytes.len(), 4 * BLOCK_LEN);
		assert!(bytes[2 * BLOCK_LEN..].iter().all(|byte| *byte == 0));
	}

	#[test]
	fn finish_is_idempotent() {
		let mut bytes = Vec::new();
		let mut tar = TarWriter::new(&mut bytes);
		tar.finish().unwrap();
		tar.finish().unwrap();
		drop(tar);
		assert_eq!(bytes.len(), 2 * BLOCK_LEN);
	}
}
