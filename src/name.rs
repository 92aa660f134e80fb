//! Name pattern engine.
//!
//! A pattern like `"${id}_${cam}_${pos}.big"` is compiled once against an
//! ordered list of declared placeholders into a [`NameGenerator`]. Each
//! placeholder carries a formatter and an enabled flag; which placeholders
//! are enabled depends on the active input shape, so a pattern referencing a
//! dimension that has no meaning in the current configuration is rejected at
//! compile time rather than producing nonsense names at write time.
//!
//! Generation is pure: the same values always yield the same name.

use crate::error::{Error, Result};

/// Zero-padded decimal formatter with an additive offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
	/// Minimum number of digits, filled with leading zeros.
	pub digits: usize,
	/// Offset added to the value before formatting.
	pub add: u64,
}

impl Format {
	/// Formats a value as zero-padded decimal text.
	#[must_use]
	pub fn apply(self, value: u64) -> String {
		format!("{:0width$}", value + self.add, width = self.digits)
	}
}

/// A declared substitution point of a name pattern.
#[derive(Debug, Clone)]
pub struct Placeholder {
	name: String,
	format: Option<Format>,
	enabled: bool,
}

impl Placeholder {
	/// Declares an enabled placeholder with its formatter.
	pub fn new(name: impl Into<String>, format: Format) -> Self {
		Self {
			name: name.into(),
			format: Some(format),
			enabled: true,
		}
	}
	/// Declares a placeholder without a formatter.
	///
	/// Referencing it in a pattern fails at compile time.
	pub fn unformatted(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			format: None,
			enabled: true,
		}
	}
	/// Disables this placeholder.
	///
	/// A disabled placeholder stays declared but contributes no generator
	/// argument, and referencing it in a pattern fails at compile time.
	#[must_use]
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}
}

#[derive(Debug, Clone)]
enum Segment {
	Literal(String),
	/// Index into the generator's argument tuple.
	Value(usize),
}

/// A compiled name pattern.
///
/// Calling [`generate`](Self::generate) with one value per enabled
/// placeholder, in declaration order, substitutes every `${name}` occurrence
/// with the formatted value and leaves all other pattern text untouched.
#[derive(Debug, Clone)]
pub struct NameGenerator {
	segments: Vec<Segment>,
	formats: Vec<Format>,
}

impl NameGenerator {
	/// Compiles a pattern against its declared placeholders.
	///
	/// # Errors
	///
	/// Fails with [`Error::Pattern`] if the pattern references an undeclared
	/// or disabled placeholder, references a placeholder without a formatter,
	/// or contains an unterminated `${` reference.
	pub fn compile(pattern: &str, placeholders: &[Placeholder]) -> Result<Self> {
		let fail = |reason: String| Error::Pattern {
			pattern: pattern.to_string(),
			reason,
		};
		let mut formats = Vec::new();
		let mut arguments = Vec::new();
		for placeholder in placeholders {
			if placeholder.enabled {
				arguments.push((placeholder, Some(formats.len())));
				if let Some(format) = placeholder.format {
					formats.push(format);
				} else {
					// Keeps argument indices dense, checked on reference.
					formats.push(Format { digits: 0, add: 0 });
				}
			} else {
				arguments.push((placeholder, None));
			}
		}
		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut rest = pattern;
		while let Some(start) = rest.find("${") {
			literal.push_str(&rest[..start]);
			let reference = &rest[start + 2..];
			let Some(end) = reference.find('}') else {
				return Err(fail("unterminated placeholder reference".to_string()));
			};
			let name = &reference[..end];
			let Some((placeholder, argument)) = arguments
				.iter()
				.find(|(placeholder, _)| placeholder.name == name)
			else {
				return Err(fail(format!("references undeclared placeholder {name:?}")));
			};
			let Some(argument) = argument else {
				return Err(fail(format!("references disabled placeholder {name:?}")));
			};
			if placeholder.format.is_none() {
				return Err(fail(format!("placeholder {name:?} has no formatter")));
			}
			if !literal.is_empty() {
				segments.push(Segment::Literal(std::mem::take(&mut literal)));
			}
			segments.push(Segment::Value(*argument));
			rest = &reference[end + 1..];
		}
		literal.push_str(rest);
		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}
		Ok(Self { segments, formats })
	}
	/// Number of values [`generate`](Self::generate) expects, one per enabled
	/// placeholder.
	#[must_use]
	pub fn arity(&self) -> usize {
		self.formats.len()
	}
	/// Generates a name from one value per enabled placeholder, in
	/// declaration order.
	#[must_use]
	pub fn generate(&self, values: &[u64]) -> String {
		debug_assert_eq!(values.len(), self.arity());
		let mut name = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => name.push_str(text),
				Segment::Value(argument) => {
					name.push_str(&self.formats[*argument].apply(values[*argument]));
				}
			}
		}
		name
	}
}
