use std::io;

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while training, loading or saving a model.
///
/// Generation never fails: an empty or dead-ended model simply yields an
/// empty (or shorter) string.
#[derive(Error, Debug)]
pub enum Error {
	/// A corpus or cache path could not be opened, read or written.
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// The cache file is truncated or structurally invalid.
	#[error("corrupt cache at byte {offset}: {reason}")]
	CorruptCache {
		/// Byte offset at which the problem was detected.
		offset: u64,
		/// What was wrong with the data.
		reason: String,
	},

	/// A configuration value is out of range.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

impl Error {
	pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
		Error::CorruptCache { offset, reason: reason.into() }
	}

	/// Returns `true` if this is a `CorruptCache` error.
	pub fn is_corrupt_cache(&self) -> bool {
		matches!(self, Error::CorruptCache { .. })
	}
}
