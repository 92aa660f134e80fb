//! Repacks loose BIG bitmap files as named sequences or streaming TAR
//! archives
//!
//! # Installation
//!
//! ```sh
//! cargo install bigsave
//! ```
//!
//! # Command-line Interface
//!
//! ```text
//! Usage: bigsave [OPTIONS] [glob]...
//!
//! Arguments:
//!   [glob]...  Reads input BIG files
//!
//! Options:
//!   -d, --dir <path>               Writes to this output directory
//!   -t, --tar                      Writes one TAR archive instead of loose files
//!   -c, --sequence-count <count>   Images per sequence row
//!       --sequence-start <pos>     Position value of the first image in a row
//!       --camera-start <cam>       Camera value of the first row
//!       --fixed-id <id>            Replaces the batch id entirely
//!       --id-modulo <modulo>       Modulus applied to the resolved id
//!       --id-digits <digits>       Zero-pad width of `${id}`
//!       --camera-digits <digits>   Zero-pad width of `${cam}`
//!       --position-digits <digits> Zero-pad width of `${pos}`
//!       --id-add <offset>          Offset added to `${id}` before formatting
//!       --camera-add <offset>      Offset added to `${cam}` before formatting
//!       --position-add <offset>    Offset added to `${pos}` before formatting
//!       --tar-pattern <pattern>    Archive name pattern over `${id}`
//!       --big-pattern <pattern>    Entry name pattern over `${id}`/`${cam}`/`${pos}`
//!   -v, --verbose...               Prints status information
//!   -h, --help                     Print help
//!   -V, --version                  Print version
//! ```

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

use anyhow::{Context, Result, ensure};
use bigsave::{Config, Format, InputShape, Payload, Saver, big};
use clap::Parser;
use glob::glob as glob_expand;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Repacks loose BIG bitmap files as named sequences or streaming TAR archives
///
/// The matched files form one batch in match order, grouped into rows of
/// --sequence-count images each, and are rewritten under names generated from
/// the --big-pattern with the id, camera, and position placeholders. With
/// --tar, all images of the batch are written as entries of a single TAR
/// archive named by the --tar-pattern; the entry names then carry no id.
#[derive(Parser, Debug)]
#[command(version, author, arg_required_else_help = true)]
struct Bigsave {
	/// Reads input BIG files.
	///
	/// Directories are traversed sorted by file name. The files are grouped
	/// in the order their globs match.
	#[arg(value_name = "glob")]
	inputs: Vec<String>,
	/// Writes to this output directory.
	#[arg(short, long, value_name = "path", default_value = ".")]
	dir: PathBuf,
	/// Writes one TAR archive instead of loose files.
	#[arg(short, long)]
	tar: bool,
	/// Images per sequence row.
	///
	/// Must evenly divide the input count. With no count, all inputs form a
	/// single row.
	#[arg(short = 'c', long, value_name = "count")]
	sequence_count: Option<usize>,
	/// Position value of the first image in a row.
	#[arg(long, value_name = "pos", default_value_t = 0)]
	sequence_start: u64,
	/// Camera value of the first row.
	#[arg(long, value_name = "cam", default_value_t = 0)]
	camera_start: u64,
	/// Replaces the batch id entirely.
	#[arg(long, value_name = "id")]
	fixed_id: Option<u64>,
	/// Modulus applied to the resolved id before formatting.
	#[arg(long, value_name = "modulo")]
	id_modulo: Option<u64>,
	/// Zero-pad width of `${id}`.
	#[arg(long, value_name = "digits", default_value_t = 3)]
	id_digits: usize,
	/// Zero-pad width of `${cam}`.
	#[arg(long, value_name = "digits", default_value_t = 1)]
	camera_digits: usize,
	/// Zero-pad width of `${pos}`.
	#[arg(long, value_name = "digits", default_value_t = 3)]
	position_digits: usize,
	/// Offset added to `${id}` before formatting.
	#[arg(long, value_name = "offset", default_value_t = 0)]
	id_add: u64,
	/// Offset added to `${cam}` before formatting.
	#[arg(long, value_name = "offset", default_value_t = 0)]
	camera_add: u64,
	/// Offset added to `${pos}` before formatting.
	#[arg(long, value_name = "offset", default_value_t = 0)]
	position_add: u64,
	/// Archive name pattern over `${id}`.
	#[arg(long, value_name = "pattern")]
	tar_pattern: Option<String>,
	/// Entry name pattern over `${id}`/`${cam}`/`${pos}`.
	#[arg(long, value_name = "pattern")]
	big_pattern: Option<String>,
	/// Prints status information.
	///
	/// The more occurrences, the more verbose, with three at most.
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() -> Result<()> {
	let bigsave = Bigsave::parse();
	let level = match bigsave.verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
		)
		.init();
	let mut paths = Vec::new();
	for glob in &bigsave.inputs {
		let inputs =
			glob_expand(glob).with_context(|| format!("Invalid glob pattern {glob:?}"))?;
		for path in inputs {
			let path = path.with_context(|| format!("Cannot read matches of {glob:?}"))?;
			if path.is_dir() {
				let entries = WalkDir::new(&path)
					.follow_links(true)
					.sort_by(|a, b| a.file_name().cmp(b.file_name()))
					.into_iter();
				for entry in entries {
					let entry =
						entry.with_context(|| format!("Cannot traverse {path:?}"))?;
					if entry.file_type().is_file() {
						paths.push(entry.path().to_path_buf());
					}
				}
			} else {
				paths.push(path);
			}
		}
	}
	ensure!(!paths.is_empty(), "No input BIG files");
	let mut payloads = Vec::with_capacity(paths.len());
	for path in &paths {
		let mut reader = OpenOptions::new()
			.read(true)
			.open(path)
			.map(BufReader::new)
			.with_context(|| format!("Cannot open input BIG file {path:?}"))?;
		let bitmap = big::read(&mut reader)
			.with_context(|| format!("Cannot read input BIG file {path:?}"))?;
		payloads.push((0, Payload::Image(bitmap)));
	}
	let sequence_count = bigsave.sequence_count.unwrap_or(payloads.len());
	let config = Config {
		tar: bigsave.tar,
		dir: bigsave.dir,
		sequence_start: bigsave.sequence_start,
		camera_start: bigsave.camera_start,
		fixed_id: bigsave.fixed_id,
		id_modulo: bigsave.id_modulo,
		shape: InputShape::Image { sequence_count },
		id_format: Format {
			digits: bigsave.id_digits,
			add: bigsave.id_add,
		},
		camera_format: Format {
			digits: bigsave.camera_digits,
			add: bigsave.camera_add,
		},
		position_format: Format {
			digits: bigsave.position_digits,
			add: bigsave.position_add,
		},
		tar_pattern: bigsave.tar_pattern,
		big_pattern: bigsave.big_pattern,
	};
	let saver = Saver::new(config)?;
	saver.exec(payloads)?;
	if bigsave.verbose > 0 {
		println!(
			"{} image{} written to {:?}",
			paths.len(),
			if paths.len() > 1 { "s" } else { "" },
			saver.config().dir,
		);
	}
	Ok(())
}
