use std::path::{Path, PathBuf};

use respack::pack::{Dict, PackError, PackFile};

/// Description compile command.
pub mod build;
/// Pack merge command.
pub mod combine;
/// Pack listing command.
pub mod dump;
/// Binary extraction command.
pub mod dumpbin;

pub(crate) mod util;

/// Command failure, one variant per exit code.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
	/// Input path does not exist.
	#[error("input file not found: {path}")]
	MissingInput {
		/// Missing path.
		path: PathBuf,
	},
	/// An output directory could not be prepared.
	#[error("failed to prepare directory {path}: {source}")]
	Init {
		/// Directory path.
		path: PathBuf,
		/// Underlying IO failure.
		source: std::io::Error,
	},
	/// Compilation reported errors; they were printed already.
	#[error("failed to compile {path}: {count} error(s)")]
	Compile {
		/// Description file.
		path: PathBuf,
		/// Number of reported errors.
		count: usize,
	},
	/// A pack could not be read from disk.
	#[error("failed to open pack {path}: {source}")]
	Open {
		/// Pack path.
		path: PathBuf,
		/// Underlying failure.
		source: PackError,
	},
	/// A pack's top-level dict did not parse.
	#[error("failed to read pack {path}: {source}")]
	Unreadable {
		/// Pack path.
		path: PathBuf,
		/// Underlying failure.
		source: PackError,
	},
	/// A nested dict inside a pack did not parse.
	#[error("failed to load nested dicts of {path}: {source}")]
	Materialize {
		/// Pack path.
		path: PathBuf,
		/// Underlying failure.
		source: PackError,
	},
	/// Binary extraction reported errors; they were printed already.
	#[error("failed to extract binaries from {path}: {count} error(s)")]
	Visit {
		/// Pack path.
		path: PathBuf,
		/// Number of reported errors.
		count: usize,
	},
	/// An output file could not be written.
	#[error("failed to write {path}: {source}")]
	Write {
		/// Output path.
		path: PathBuf,
		/// Underlying IO failure.
		source: std::io::Error,
	},
}

impl CmdError {
	/// Process exit code for this failure class.
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::MissingInput { .. } => 2,
			Self::Init { .. } => 5,
			Self::Compile { .. } => 6,
			Self::Open { .. } => 7,
			Self::Unreadable { .. } => 8,
			Self::Materialize { .. } => 9,
			Self::Visit { .. } => 10,
			Self::Write { .. } => 11,
		}
	}
}

/// Result alias used by commands.
pub type CmdResult<T> = std::result::Result<T, CmdError>;

/// Exit code for command-line usage errors.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Read a pack and materialize its top-level children, mapping each failure to
/// its exit class.
pub(crate) fn load_pack(path: &Path) -> CmdResult<(PackFile, Dict)> {
	if !path.exists() {
		return Err(CmdError::MissingInput { path: path.to_path_buf() });
	}

	let pack = PackFile::open(path).map_err(|source| CmdError::Open {
		path: path.to_path_buf(),
		source,
	})?;
	let mut dict = pack.dict().map_err(|source| CmdError::Unreadable {
		path: path.to_path_buf(),
		source,
	})?;
	dict.load_child_dicts().map_err(|source| CmdError::Materialize {
		path: path.to_path_buf(),
		source,
	})?;

	Ok((pack, dict))
}
