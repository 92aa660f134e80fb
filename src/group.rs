//! Group reconstruction.
//!
//! The pipeline delivers payloads as a flat stream of `(id, payload)` entries
//! whose only grouping signal is id equality. Depending on the configured
//! [`InputShape`], the payload of one entry is a full 2-D group, one row of a
//! group, or a single image, and this module rebuilds the nested group the
//! savers consume from one maximal equal-id run of entries. Arrival order is
//! preserved exactly since camera and position assignment is positional.

use crate::error::{Error, Result};

/// How the payloads delivered for one id are already nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
	/// Each entry is a full 2-D group.
	Sequence,
	/// Each entry is one row; all entries of a run form one group.
	Vector,
	/// Each entry is a single image; every `sequence_count` consecutive
	/// entries of a run form one row.
	Image {
		/// Number of images per row, must be positive.
		sequence_count: usize,
	},
}

/// One stream entry at the nesting depth its input shape declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
	/// A single image, for [`InputShape::Image`].
	Image(T),
	/// One row of images, for [`InputShape::Vector`].
	Vector(Vec<T>),
	/// A full 2-D group, for [`InputShape::Sequence`].
	Sequence(Vec<Vec<T>>),
}

/// A reconstructed 2-D group, outer dimension camera, inner dimension
/// position.
pub type Group<T> = Vec<Vec<T>>;

/// Rebuilds the nested groups of one maximal equal-id run of entries.
///
/// Returns one group per [`Payload::Sequence`] entry and otherwise a single
/// group collecting the whole run.
///
/// # Errors
///
/// Fails with [`Error::Config`] if an entry does not match the shape and
/// with [`Error::ShapeMismatch`] if an [`InputShape::Image`] run ends in a
/// partial row of fewer than `sequence_count` images. Groups are not padded.
pub fn reconstruct<T>(shape: InputShape, id: u64, entries: Vec<Payload<T>>) -> Result<Vec<Group<T>>> {
	match shape {
		InputShape::Sequence => entries
			.into_iter()
			.map(|entry| match entry {
				Payload::Sequence(group) => Ok(group),
				entry => Err(mismatch(shape, id, &entry)),
			})
			.collect(),
		InputShape::Vector => {
			let mut group = Vec::with_capacity(entries.len());
			for entry in entries {
				match entry {
					Payload::Vector(row) => group.push(row),
					entry => return Err(mismatch(shape, id, &entry)),
				}
			}
			Ok(vec![group])
		}
		InputShape::Image { sequence_count } => {
			let mut group = Vec::new();
			let mut position = 0;
			for entry in entries {
				let image = match entry {
					Payload::Image(image) => image,
					entry => return Err(mismatch(shape, id, &entry)),
				};
				if position == 0 {
					group.push(Vec::with_capacity(sequence_count));
				}
				position += 1;
				if position == sequence_count {
					position = 0;
				}
				if let Some(row) = group.last_mut() {
					row.push(image);
				}
			}
			if position != 0 {
				return Err(Error::ShapeMismatch {
					id,
					reason: format!(
						"single image count does not match sequence_count {sequence_count}",
					),
				});
			}
			Ok(vec![group])
		}
	}
}

fn mismatch<T>(shape: InputShape, id: u64, entry: &Payload<T>) -> Error {
	let delivered = match entry {
		Payload::Image(_) => "a single image",
		Payload::Vector(_) => "an image vector",
		Payload::Sequence(_) => "an image sequence",
	};
	let expected = match shape {
		InputShape::Sequence => "an image sequence",
		InputShape::Vector => "an image vector",
		InputShape::Image { .. } => "a single image",
	};
	Error::Config(format!(
		"input shape expects {expected} per entry but batch {id} delivered {delivered}",
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn images(images: &[char]) -> Vec<Payload<char>> {
		images.iter().map(|image| Payload::Image(*image)).collect()
	}

	#[test]
	fn image_run_chunks_into_rows() {
		let shape = InputShape::Image { sequence_count: 3 };
		let groups = reconstruct(shape, 5, images(&['a', 'b', 'c', 'd', 'e', 'f'])).unwrap();
		assert_eq!(
			groups,
			vec![vec![vec!['a', 'b', 'c'], vec!['d', 'e', 'f']]],
		);
	}

	#[test]
	fn partial_image_row_is_rejected() {
		let shape = InputShape::Image { sequence_count: 3 };
		let groups = reconstruct(shape, 5, images(&['a', 'b']));
		assert!(matches!(groups, Err(Error::ShapeMismatch { id: 5, .. })));
	}

	#[test]
	fn vector_run_collects_rows_in_arrival_order() {
		let entries = vec![
			Payload::Vector(vec!['a', 'b']),
			Payload::Vector(vec!['c', 'd']),
			Payload::Vector(vec!['e', 'f']),
		];
		let groups = reconstruct(InputShape::Vector, 1, entries).unwrap();
		assert_eq!(
			groups,
			vec![vec![vec!['a', 'b'], vec!['c', 'd'], vec!['e', 'f']]],
		);
	}

	#[test]
	fn sequence_entries_pass_through_unchanged() {
		let entries = vec![
			Payload::Sequence(vec![vec!['a'], vec!['b']]),
			Payload::Sequence(vec![vec!['c']]),
		];
		let groups = reconstruct(InputShape::Sequence, 2, entries).unwrap();
		assert_eq!(
			groups,
			vec![vec![vec!['a'], vec!['b']], vec![vec!['c']]],
		);
	}

	#[test]
	fn empty_run_yields_one_empty_group() {
		let groups = reconstruct::<char>(InputShape::Vector, 0, Vec::new()).unwrap();
		assert_eq!(groups, vec![Vec::<Vec<char>>::new()]);
	}

	#[test]
	fn wrong_nesting_is_a_configuration_error() {
		let entries = vec![Payload::Vector(vec!['a'])];
		let shape = InputShape::Image { sequence_count: 1 };
		let groups = reconstruct(shape, 3, entries);
		assert!(matches!(groups, Err(Error::Config(_))));
	}
}
