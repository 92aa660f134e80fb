//! Persists keyed batches of numeric bitmaps as BIG files or streaming TAR
//! archives
//!
//! An upstream pipeline delivers bitmaps as a flat stream of `(id, payload)`
//! entries in non-decreasing id order, where consecutive entries sharing an
//! id belong to the same batch. Depending on the configured [`InputShape`],
//! a batch is rebuilt into a 2-D group of camera rows and sequence positions
//! and every leaf bitmap is written either as a loose BIG file or as one
//! entry of a per-batch TAR archive, under deterministic names compiled from
//! `${id}`/`${cam}`/`${pos}` patterns.
//!
//! # Example
//!
//! ```no_run
//! use bigsave::{Bitmap, Config, InputShape, Payload, Pixels, Saver};
//!
//! # fn main() -> bigsave::Result<()> {
//! let mut config = Config::new(InputShape::Image { sequence_count: 2 });
//! config.tar = true;
//! config.dir = "export".into();
//! let saver = Saver::new(config)?;
//! let image = |sample| -> bigsave::Result<_> {
//! 	Ok(Payload::Image(Bitmap::new(1, 1, Pixels::U8(vec![sample]))?))
//! };
//! // Four images of batch 7, grouped into two rows of two.
//! saver.exec(
//! 	[image(0)?, image(1)?, image(2)?, image(3)?]
//! 		.into_iter()
//! 		.map(|payload| (7, payload)),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! This writes `export/007.tar` containing the entries `0_000.big`,
//! `0_001.big`, `1_000.big`, and `1_001.big`.

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

pub mod big;
pub mod bitmap;
pub mod error;
pub mod group;
pub mod name;
pub mod saver;
pub mod tar;

pub use bitmap::{Bitmap, ElementType, Pixels};
pub use error::{Error, Result};
pub use group::{Group, InputShape, Payload};
pub use name::{Format, NameGenerator, Placeholder};
pub use saver::{Config, Saver};
pub use tar::TarWriter;
