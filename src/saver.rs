//! Batch persistence orchestration.
//!
//! A [`Saver`] is configured once and then fed the flat `(id, payload)`
//! stream the pipeline delivers. Per maximal equal-id run it rebuilds the
//! nested groups, remaps the id, and persists every leaf bitmap either as a
//! loose BIG file under the output directory or as one entry of a per-id TAR
//! session.
//!
//! All configuration is immutable after [`Saver::new`], so one saver may be
//! shared across threads persisting different ids concurrently. The only
//! shared mutable resource is the destination filesystem; distinct ids must
//! map to distinct output names, which is a configuration concern.

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::group::{Group, InputShape, Payload, reconstruct};
use crate::name::{Format, NameGenerator, Placeholder};
use crate::{big, tar::TarWriter};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Saver configuration, fixed at construction of a [`Saver`].
#[derive(Debug, Clone)]
pub struct Config {
	/// Writes one TAR archive per id instead of loose files.
	pub tar: bool,
	/// Output directory for loose files and archives.
	pub dir: PathBuf,
	/// Position value of the first image in a row.
	pub sequence_start: u64,
	/// Camera value of the first row of a group.
	pub camera_start: u64,
	/// Replaces the observed id entirely when set.
	pub fixed_id: Option<u64>,
	/// Modulus applied to the resolved id before formatting, must be
	/// positive when set.
	pub id_modulo: Option<u64>,
	/// Nesting level of the delivered payloads.
	pub shape: InputShape,
	/// Formatter of the `${id}` placeholder.
	pub id_format: Format,
	/// Formatter of the `${cam}` placeholder.
	pub camera_format: Format,
	/// Formatter of the `${pos}` placeholder.
	pub position_format: Format,
	/// Archive name pattern over `${id}`, defaults to `"${id}.tar"`.
	pub tar_pattern: Option<String>,
	/// Entry name pattern over `${id}`/`${cam}`/`${pos}`, where `${id}` is
	/// only available in loose-file mode. Defaults to
	/// `"${cam}_${pos}.big"` in TAR mode and `"${id}_${cam}_${pos}.big"`
	/// otherwise.
	pub big_pattern: Option<String>,
}

impl Config {
	/// Default configuration for the given input shape: loose files in the
	/// current directory, zero offsets, no id remapping, and 3/1/3
	/// zero-pad digits for id, camera, and position.
	#[must_use]
	pub fn new(shape: InputShape) -> Self {
		Self {
			tar: false,
			dir: PathBuf::from("."),
			sequence_start: 0,
			camera_start: 0,
			fixed_id: None,
			id_modulo: None,
			shape,
			id_format: Format { digits: 3, add: 0 },
			camera_format: Format { digits: 1, add: 0 },
			position_format: Format { digits: 3, add: 0 },
			tar_pattern: None,
			big_pattern: None,
		}
	}
}

/// Persists keyed batches of bitmaps per its immutable [`Config`].
#[derive(Debug)]
pub struct Saver {
	config: Config,
	tar_name: Option<NameGenerator>,
	entry_name: NameGenerator,
}

impl Saver {
	/// Validates a configuration and compiles its name patterns.
	///
	/// # Errors
	///
	/// Fails with [`Error::Config`] on a zero `sequence_count` or
	/// `id_modulo` and with [`Error::Pattern`] if a pattern references an
	/// undeclared or disabled placeholder.
	pub fn new(config: Config) -> Result<Self> {
		if let InputShape::Image { sequence_count } = config.shape {
			if sequence_count == 0 {
				return Err(Error::Config(
					"sequence_count needs to be greater than 0".to_string(),
				));
			}
		}
		if config.id_modulo == Some(0) {
			return Err(Error::Config(
				"id_modulo needs to be greater than 0".to_string(),
			));
		}
		let tar_name = if config.tar {
			let pattern = config.tar_pattern.as_deref().unwrap_or("${id}.tar");
			Some(NameGenerator::compile(
				pattern,
				&[Placeholder::new("id", config.id_format)],
			)?)
		} else {
			None
		};
		let pattern = config.big_pattern.as_deref().unwrap_or(if config.tar {
			"${cam}_${pos}.big"
		} else {
			"${id}_${cam}_${pos}.big"
		});
		let id = Placeholder::new("id", config.id_format);
		let entry_name = NameGenerator::compile(
			pattern,
			&[
				if config.tar { id.disabled() } else { id },
				Placeholder::new("cam", config.camera_format),
				Placeholder::new("pos", config.position_format),
			],
		)?;
		Ok(Self {
			config,
			tar_name,
			entry_name,
		})
	}
	/// The configuration this saver was built from.
	#[must_use]
	pub const fn config(&self) -> &Config {
		&self.config
	}
	/// Persists a stream of `(id, payload)` entries.
	///
	/// Entries sharing an id form one batch and are expected to arrive
	/// contiguously in non-decreasing id order; a key delivered in separate
	/// runs is treated as one merged batch.
	///
	/// # Errors
	///
	/// Fails with [`Error::ShapeMismatch`] or [`Error::Config`] if a batch
	/// does not fit the configured shape and with [`Error::Io`] if a sink
	/// cannot be opened or written. A failed batch aborts the stream;
	/// leaves already persisted for it are left in place.
	pub fn exec<I>(&self, entries: I) -> Result<()>
	where
		I: IntoIterator<Item = (u64, Payload<Bitmap>)>,
	{
		let mut batches = IndexMap::<u64, Vec<Payload<Bitmap>>>::new();
		for (id, payload) in entries {
			batches.entry(id).or_default().push(payload);
		}
		for (id, entries) in batches {
			for group in reconstruct(self.config.shape, id, entries)? {
				self.save(id, &group)?;
			}
		}
		Ok(())
	}
	/// Persists one reconstructed group under its top-level id.
	///
	/// # Errors
	///
	/// Fails with [`Error::Io`] if a sink cannot be opened or written.
	pub fn save(&self, id: u64, group: &Group<Bitmap>) -> Result<()> {
		let mut id = self.config.fixed_id.unwrap_or(id);
		if let Some(modulo) = self.config.id_modulo {
			id %= modulo;
		}
		if let Some(tar_name) = &self.tar_name {
			self.save_archive(id, tar_name, group)
		} else {
			self.save_files(id, group)
		}
	}
	fn save_archive(&self, id: u64, tar_name: &NameGenerator, group: &Group<Bitmap>) -> Result<()> {
		let path = self.config.dir.join(tar_name.generate(&[id]));
		info!("write {:?}", path);
		let sink = File::create(&path)
			.map(BufWriter::new)
			.map_err(|err| Error::io(&path, err))?;
		let mut tar = TarWriter::new(sink);
		let mut cam = self.config.camera_start;
		for row in group {
			let mut pos = self.config.sequence_start;
			for bitmap in row {
				let name = self.entry_name.generate(&[cam, pos]);
				debug!("write {:?}", path.join(&name));
				tar.append(&name, big::file_size(bitmap), |mut sink| {
					big::write(bitmap, &mut sink)
				})
				.map_err(|err| Error::io(path.join(&name), err))?;
				pos += 1;
			}
			cam += 1;
		}
		// The trailer is written on drop as well, keeping the archive
		// well-formed when an entry failed above.
		tar.finish().map_err(|err| Error::io(&path, err))
	}
	fn save_files(&self, id: u64, group: &Group<Bitmap>) -> Result<()> {
		let mut cam = self.config.camera_start;
		for row in group {
			let mut pos = self.config.sequence_start;
			for bitmap in row {
				let path = self.config.dir.join(self.entry_name.generate(&[id, cam, pos]));
				info!("write {:?}", path);
				write_file(&path, bitmap)?;
				pos += 1;
			}
			cam += 1;
		}
		Ok(())
	}
}

fn write_file(path: &Path, bitmap: &Bitmap) -> Result<()> {
	// The file is closed when the writer drops, success or failure.
	let mut sink = File::create(path)
		.map(BufWriter::new)
		.map_err(|err| Error::io(path, err))?;
	big::write(bitmap, &mut sink).map_err(|err| Error::io(path, err))?;
	sink.flush().map_err(|err| Error::io(path, err))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_sequence_count_is_rejected() {
		let config = Config::new(InputShape::Image { sequence_count: 0 });
		assert!(matches!(Saver::new(config), Err(Error::Config(_))));
	}

	#[test]
	fn zero_id_modulo_is_rejected() {
		let mut config = Config::new(InputShape::Vector);
		config.id_modulo = Some(0);
		assert!(matches!(Saver::new(config), Err(Error::Config(_))));
	}

	#[test]
	fn entry_pattern_must_not_use_id_in_tar_mode() {
		let mut config = Config::new(InputShape::Vector);
		config.tar = true;
		config.big_pattern = Some("${id}_${cam}_${pos}.big".to_string());
		assert!(matches!(Saver::new(config), Err(Error::Pattern { .. })));
	}

	#[test]
	fn default_patterns_compile_in_both_modes() {
		let config = Config::new(InputShape::Sequence);
		assert!(Saver::new(config).is_ok());
		let mut config = Config::new(InputShape::Sequence);
		config.tar = true;
		assert!(Saver::new(config).is_ok());
	}
}
