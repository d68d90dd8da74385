//! Shared test helpers for workspace crates.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Scratch directory that is removed when dropped.
pub struct Scratch {
	dir: TempDir,
}

impl Scratch {
	/// Create an empty scratch directory.
	pub fn new() -> Self {
		Self {
			dir: tempfile::tempdir().expect("scratch dir is created"),
		}
	}

	/// Root of the scratch directory (canonical, so it compares equal to compiled paths).
	pub fn root(&self) -> PathBuf {
		self.dir.path().canonicalize().unwrap_or_else(|_| self.dir.path().to_path_buf())
	}

	/// Absolute path of `name` inside the scratch directory.
	pub fn path(&self, name: &str) -> PathBuf {
		self.root().join(name)
	}

	/// Write `contents` to `name`, creating parent directories.
	pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
		let path = self.path(name);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).expect("parent dirs are created");
		}
		fs::write(&path, contents).expect("scratch file is written");
		path
	}

	/// Set the modification time of `name` to `offset` relative to now.
	pub fn set_mtime(&self, name: &str, offset: Offset) -> SystemTime {
		set_mtime(&self.path(name), offset)
	}
}

impl Default for Scratch {
	fn default() -> Self {
		Self::new()
	}
}

/// Time offset relative to the current clock.
#[derive(Debug, Clone, Copy)]
pub enum Offset {
	/// Seconds in the past.
	Past(u64),
	/// Seconds in the future.
	Future(u64),
}

/// Set the modification time of an existing file.
pub fn set_mtime(path: &Path, offset: Offset) -> SystemTime {
	let now = SystemTime::now();
	let time = match offset {
		Offset::Past(secs) => now - Duration::from_secs(secs),
		Offset::Future(secs) => now + Duration::from_secs(secs),
	};

	let file = File::options().write(true).open(path).expect("file opens for mtime update");
	file.set_modified(time).expect("mtime is updated");
	time
}
