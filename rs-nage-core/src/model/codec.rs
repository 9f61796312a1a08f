//! Binary cache format for trained models.
//!
//! All integers are little-endian, there is no header:
//!
//! ```text
//! record_count          u64
//! record_count times:
//!   context_length      u16
//!   context_bytes       [u8; context_length]
//!   next_symbol_count   u64
//!   next_symbol_count times:
//!     symbol_length     u16
//!     symbol_bytes      [u8; symbol_length]
//!     probability       f64
//! ```
//!
//! Probabilities are stored already normalized and are never recomputed on
//! load.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, info};

use super::markov_model::Model;
use super::state::Distribution;
use super::symbol::{END, START, symbol_count};
use crate::error::{Error, Result};
use crate::io::write_atomic;

/// Writes `model` in cache format, contexts in byte order.
///
/// # Errors
/// Returns `Error::Io` on write failure, or with `InvalidInput` if a context
/// or symbol is longer than 65535 bytes.
pub fn write_model<W: Write>(mut writer: W, model: &Model) -> Result<()> {
	writer.write_all(&(model.len() as u64).to_le_bytes())?;
	for (context, distribution) in model.iter() {
		write_bytes(&mut writer, context)?;
		writer.write_all(&(distribution.len() as u64).to_le_bytes())?;
		for (next_symbol, probability) in distribution.iter() {
			write_bytes(&mut writer, next_symbol)?;
			writer.write_all(&probability.to_le_bytes())?;
		}
	}
	debug!("Encoded {} contexts", model.len());
	Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
	let len = u16::try_from(bytes.len()).map_err(|_| {
		io::Error::new(ErrorKind::InvalidInput, format!("{} bytes key exceeds the u16 length prefix", bytes.len()))
	})?;
	writer.write_all(&len.to_le_bytes())?;
	writer.write_all(bytes)?;
	Ok(())
}

/// Saves `model` to `path`.
///
/// The file is replaced atomically: on failure any previous cache at `path`
/// is left untouched.
pub fn save<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
	write_atomic(&path, |writer| write_model(writer, model))?;
	info!("Saved {} contexts to {}", model.len(), path.as_ref().display());
	Ok(())
}

/// Reads a model in cache format.
///
/// `order` is the order of the returned model; contexts longer than `order`
/// symbols are rejected.
///
/// # Errors
/// - `Error::CorruptCache` if the data ends early or is structurally invalid
/// - `Error::Io` on any other read failure
pub fn read_model<R: Read>(reader: R, order: usize) -> Result<Model> {
	let mut reader = CacheReader { inner: reader, offset: 0 };
	let mut contexts = BTreeMap::new();

	let record_count = reader.read_u64()?;
	for _ in 0..record_count {
		let record_offset = reader.offset;
		let context = reader.read_bytes()?;
		let len = symbol_count(&context);
		if len == 0 || len > order {
			return Err(Error::corrupt(
				record_offset,
				format!("context of {} symbols, expected 1 to {}", len, order),
			));
		}
		if context.contains(&END) {
			return Err(Error::corrupt(record_offset, "END inside a context"));
		}

		let next_symbol_count = reader.read_u64()?;
		let mut probabilities = BTreeMap::new();
		for _ in 0..next_symbol_count {
			let symbol_offset = reader.offset;
			let next_symbol = reader.read_bytes()?;
			if next_symbol.is_empty() {
				return Err(Error::corrupt(symbol_offset, "empty symbol"));
			}
			if symbol_count(&next_symbol) != 1 {
				return Err(Error::corrupt(symbol_offset, "successor is not a single symbol"));
			}
			if next_symbol != [END] && next_symbol.iter().any(|&b| b == START || b == END) {
				return Err(Error::corrupt(symbol_offset, "sentinel byte in a successor"));
			}
			let probability = reader.read_f64()?;
			if !probability.is_finite() || probability < 0.0 {
				return Err(Error::corrupt(symbol_offset, format!("invalid probability {}", probability)));
			}
			if probabilities.insert(next_symbol, probability).is_some() {
				return Err(Error::corrupt(symbol_offset, "duplicate symbol"));
			}
		}

		if contexts.insert(context, Distribution::from_probabilities(probabilities)).is_some() {
			return Err(Error::corrupt(record_offset, "duplicate context"));
		}
	}

	if !reader.at_end()? {
		return Err(Error::corrupt(reader.offset, "trailing bytes after last record"));
	}

	debug!("Decoded {} contexts", contexts.len());
	Ok(Model::from_contexts(order, contexts))
}

/// Loads a model from the cache file at `path`.
///
/// # Errors
/// - `Error::Io` if the file cannot be opened or read
/// - `Error::CorruptCache` if it is truncated or structurally invalid
pub fn load<P: AsRef<Path>>(path: P, order: usize) -> Result<Model> {
	let file = File::open(&path)?;
	let model = read_model(BufReader::new(file), order)?;
	info!("Loaded {} contexts from {}", model.len(), path.as_ref().display());
	Ok(model)
}

/// Tracks the byte offset so errors can point at the faulty record.
struct CacheReader<R> {
	inner: R,
	offset: u64,
}

impl<R: Read> CacheReader<R> {
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
		match self.inner.read_exact(buf) {
			Ok(()) => {
				self.offset += buf.len() as u64;
				Ok(())
			}
			Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::corrupt(
				self.offset,
				format!("truncated: expected {} more bytes", buf.len()),
			)),
			Err(e) => Err(e.into()),
		}
	}

	fn read_u16(&mut self) -> Result<u16> {
		let mut buf = [0; 2];
		self.read_exact(&mut buf)?;
		Ok(u16::from_le_bytes(buf))
	}

	fn read_u64(&mut self) -> Result<u64> {
		let mut buf = [0; 8];
		self.read_exact(&mut buf)?;
		Ok(u64::from_le_bytes(buf))
	}

	fn read_f64(&mut self) -> Result<f64> {
		let mut buf = [0; 8];
		self.read_exact(&mut buf)?;
		Ok(f64::from_le_bytes(buf))
	}

	fn read_bytes(&mut self) -> Result<Vec<u8>> {
		let len = self.read_u16()?;
		let mut buf = vec![0; len as usize];
		self.read_exact(&mut buf)?;
		Ok(buf)
	}

	fn at_end(&mut self) -> Result<bool> {
		let mut buf = [0; 1];
		loop {
			match self.inner.read(&mut buf) {
				Ok(0) => return Ok(true),
				Ok(_) => return Ok(false),
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::trainer::FrequencyTrainer;

	fn trained(order: usize, words: &[&str]) -> Model {
		let mut trainer = FrequencyTrainer::new(order).unwrap();
		for word in words {
			trainer.add_word(word.as_bytes());
		}
		trainer.finish()
	}

	fn encode(model: &Model) -> Vec<u8> {
		let mut bytes = Vec::new();
		write_model(&mut bytes, model).unwrap();
		bytes
	}

	#[test]
	fn empty_model_is_a_zero_count() {
		let bytes = encode(&Model::empty(2));
		assert_eq!(bytes, 0u64.to_le_bytes());
		assert!(read_model(bytes.as_slice(), 2).unwrap().is_empty());
	}

	#[test]
	fn exact_layout_of_a_single_record() {
		// order 1, word "" -> only START -> END
		let bytes = encode(&trained(1, &[""]));

		let mut expected = Vec::new();
		expected.extend_from_slice(&1u64.to_le_bytes());
		expected.extend_from_slice(&1u16.to_le_bytes());
		expected.push(0x02);
		expected.extend_from_slice(&1u64.to_le_bytes());
		expected.extend_from_slice(&1u16.to_le_bytes());
		expected.push(0x03);
		expected.extend_from_slice(&1.0f64.to_le_bytes());
		assert_eq!(bytes, expected);
	}

	#[test]
	fn decode_restores_the_model() {
		let model = trained(3, &["ana", "anna", "anja", "étienne"]);
		let decoded = read_model(encode(&model).as_slice(), 3).unwrap();
		assert_eq!(decoded, model);
	}

	#[test]
	fn every_truncation_is_detected() {
		let bytes = encode(&trained(2, &["ab", "ba"]));
		for len in 0..bytes.len() {
			let err = read_model(&bytes[..len], 2).unwrap_err();
			assert!(err.is_corrupt_cache(), "truncated at {}: {:?}", len, err);
		}
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let mut bytes = encode(&trained(2, &["ab"]));
		bytes.push(0);
		assert!(read_model(bytes.as_slice(), 2).unwrap_err().is_corrupt_cache());
	}

	#[test]
	fn context_longer_than_order_is_rejected() {
		let bytes = encode(&trained(3, &["abc"]));
		let err = read_model(bytes.as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache());
	}

	#[test]
	fn invalid_probability_is_rejected() {
		let mut bytes = encode(&trained(1, &[""]));
		let len = bytes.len();
		bytes[len - 8..].copy_from_slice(&f64::NAN.to_le_bytes());
		assert!(read_model(bytes.as_slice(), 1).unwrap_err().is_corrupt_cache());
	}

	#[test]
	fn duplicate_context_is_rejected() {
		let record = {
			let bytes = encode(&trained(1, &[""]));
			bytes[8..].to_vec()
		};
		let mut bytes = 2u64.to_le_bytes().to_vec();
		bytes.extend_from_slice(&record);
		bytes.extend_from_slice(&record);
		assert!(read_model(bytes.as_slice(), 1).unwrap_err().is_corrupt_cache());
	}

	/// Encodes a single record by hand, bypassing the trainer.
	fn record(context: &[u8], successors: &[&[u8]]) -> Vec<u8> {
		let mut bytes = 1u64.to_le_bytes().to_vec();
		bytes.extend_from_slice(&(context.len() as u16).to_le_bytes());
		bytes.extend_from_slice(context);
		bytes.extend_from_slice(&(successors.len() as u64).to_le_bytes());
		for successor in successors {
			bytes.extend_from_slice(&(successor.len() as u16).to_le_bytes());
			bytes.extend_from_slice(successor);
			bytes.extend_from_slice(&(1.0 / successors.len() as f64).to_le_bytes());
		}
		bytes
	}

	#[test]
	fn hand_built_record_is_accepted() {
		let model = read_model(record(b"\x02", &[b"a", "é".as_bytes(), b"\x03"]).as_slice(), 2).unwrap();
		assert_eq!(model.len(), 1);
		assert_eq!(model.distribution(b"\x02").unwrap().len(), 3);
	}

	#[test]
	fn start_successor_is_rejected() {
		let err = read_model(record(b"\x02", &[b"\x02"]).as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache(), "{:?}", err);
	}

	#[test]
	fn successor_ending_with_end_is_rejected() {
		let err = read_model(record(b"\x02\x02", &[b"a\x03"]).as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache(), "{:?}", err);
	}

	#[test]
	fn sentinel_inside_a_multibyte_successor_is_rejected() {
		// 0xC3 announces a two-byte symbol, so this is one symbol holding END
		let err = read_model(record(b"\x02", &[&[0xC3, END]]).as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache(), "{:?}", err);
	}

	#[test]
	fn multi_symbol_successor_is_rejected() {
		let err = read_model(record(b"\x02", &[b"ab"]).as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache(), "{:?}", err);
	}

	#[test]
	fn end_inside_a_context_is_rejected() {
		let err = read_model(record(b"a\x03", &[b"b"]).as_slice(), 2).unwrap_err();
		assert!(err.is_corrupt_cache(), "{:?}", err);
	}

	#[test]
	fn huge_record_count_fails_without_allocating() {
		let bytes = u64::MAX.to_le_bytes();
		assert!(read_model(&bytes[..], 1).unwrap_err().is_corrupt_cache());
	}

	#[test]
	fn oversized_key_cannot_be_written() {
		let mut probabilities = BTreeMap::new();
		probabilities.insert(b"a".to_vec(), 1.0);
		let mut contexts = BTreeMap::new();
		contexts.insert(vec![b'a'; 70_000], Distribution::from_probabilities(probabilities));
		let model = Model::from_contexts(70_000, contexts);
		let err = write_model(&mut Vec::<u8>::new(), &model).unwrap_err();
		assert!(matches!(err, Error::Io(ref e) if e.kind() == ErrorKind::InvalidInput));
	}

	#[test]
	fn failed_save_keeps_previous_cache() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("cache.bin");
		std::fs::write(&path, b"previous cache").unwrap();

		let mut probabilities = BTreeMap::new();
		probabilities.insert(b"a".to_vec(), 1.0);
		let mut contexts = BTreeMap::new();
		contexts.insert(b"a".to_vec(), Distribution::from_probabilities(probabilities.clone()));
		contexts.insert(vec![b'b'; 70_000], Distribution::from_probabilities(probabilities));
		let model = Model::from_contexts(70_000, contexts);

		assert!(save(&model, &path).is_err());
		assert_eq!(std::fs::read(&path).unwrap(), b"previous cache");
	}

	#[test]
	fn save_then_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("cache.bin");
		let model = trained(2, &["ana", "anna"]);

		save(&model, &path).unwrap();
		assert_eq!(load(&path, 2).unwrap(), model);
	}

	#[test]
	fn load_missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load(dir.path().join("missing.bin"), 2).unwrap_err();
		assert!(matches!(err, Error::Io(_)));
	}
}
