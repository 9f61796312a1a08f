use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Split, Write};
use std::path::Path;

use log::warn;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::model::symbol::{END, START};

/// Lazy reader over the words of a training corpus.
///
/// Yields one word per `\n`-delimited line, as raw bytes:
/// - A trailing `\r` is stripped
/// - Blank lines are skipped
/// - Sentinel bytes are removed (they are reserved for word boundaries)
#[derive(Debug)]
pub struct CorpusReader<R = BufReader<File>> {
	lines: Split<R>,
}

impl CorpusReader {
	/// Opens a corpus file.
	///
	/// # Errors
	/// Returns `Error::Io` if the file cannot be opened.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let file = File::open(path)?;
		Ok(Self::new(BufReader::new(file)))
	}
}

impl<R: BufRead> CorpusReader<R> {
	/// Wraps any buffered reader.
	pub fn new(reader: R) -> Self {
		Self { lines: reader.split(b'\n') }
	}
}

impl<R: BufRead> Iterator for CorpusReader<R> {
	type Item = Result<Vec<u8>>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let mut line = match self.lines.next()? {
				Ok(line) => line,
				Err(e) => return Some(Err(e.into())),
			};

			if line.last() == Some(&b'\r') {
				line.pop();
			}

			if line.iter().any(|b| *b == START || *b == END) {
				warn!("Stripping sentinel bytes from corpus line");
				line.retain(|b| *b != START && *b != END);
			}

			if !line.is_empty() {
				return Some(Ok(line));
			}
		}
	}
}

/// Writes a file atomically.
///
/// The content is written to a temporary file next to `path`, then renamed
/// over it. If `write` fails, the destination is left untouched.
pub(crate) fn write_atomic<P, F>(path: P, write: F) -> Result<()>
where
	P: AsRef<Path>,
	F: FnOnce(&mut dyn Write) -> Result<()>,
{
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	fs::create_dir_all(parent)?;

	let mut temp_file = NamedTempFile::new_in(parent)?;
	{
		let mut writer = BufWriter::new(&mut temp_file);
		write(&mut writer)?;
		writer.flush()?;
	}
	temp_file.as_file().sync_all()?;
	temp_file.persist(path).map_err(io::Error::from)?;
	Ok(())
}
