//! Error taxonomy of the saver.
//!
//! Configuration and pattern errors are raised before any payload is touched,
//! shape errors abort the offending batch only, and I/O errors abort the
//! remaining leaves of the current batch without rolling back entries that
//! were already written.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by pattern compilation, group reconstruction, and
/// persistence.
#[derive(Debug, Error)]
pub enum Error {
	/// Invalid or conflicting configuration, rejected before processing
	/// begins.
	#[error("invalid configuration: {0}")]
	Config(String),
	/// A name pattern that cannot be compiled against its declared
	/// placeholders.
	#[error("invalid name pattern {pattern:?}: {reason}")]
	Pattern {
		/// The offending pattern text.
		pattern: String,
		/// Why compilation failed.
		reason: String,
	},
	/// A reconstructed group whose dimensions do not match the configured
	/// input shape.
	#[error("batch {id}: {reason}")]
	ShapeMismatch {
		/// The top-level key of the offending batch.
		id: u64,
		/// Why the group does not fit the shape.
		reason: String,
	},
	/// An output sink that cannot be opened or written.
	#[error("cannot write {path:?}")]
	Io {
		/// The file or archive entry path.
		path: PathBuf,
		/// The underlying I/O failure.
		#[source]
		source: io::Error,
	},
}

/// Specialized result of all fallible saver operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}
