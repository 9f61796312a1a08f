/// Sentinel marking the beginning of every word (ASCII "start of text").
pub const START: u8 = 0x02;

/// Sentinel marking the end of every word (ASCII "end of text").
pub const END: u8 = 0x03;

/// Returns `true` if `symbol` is one of the two sentinels.
pub fn is_sentinel(symbol: &[u8]) -> bool {
	symbol == [START] || symbol == [END]
}

/// Length in bytes of the symbol starting with `lead`.
///
/// Follows the UTF-8 leading byte layout. Continuation bytes and invalid
/// leading bytes count as a one-byte symbol.
pub fn symbol_len(lead: u8) -> usize {
	match lead {
		b if b & 0x80 == 0x00 => 1,
		b if b & 0xE0 == 0xC0 => 2,
		b if b & 0xF0 == 0xE0 => 3,
		b if b & 0xF8 == 0xF0 => 4,
		_ => 1,
	}
}

/// Returns the start offset of every symbol in `bytes`.
///
/// A multi-byte symbol running past the end of the slice is clamped.
pub fn symbol_starts(bytes: &[u8]) -> Vec<usize> {
	let mut starts = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		starts.push(i);
		i = (i + symbol_len(bytes[i])).min(bytes.len());
	}
	starts
}

/// Number of symbols in `bytes`.
pub fn symbol_count(bytes: &[u8]) -> usize {
	symbol_starts(bytes).len()
}

/// A word wrapped with `START` and `END`, split into symbols.
///
/// Symbols are stored contiguously, so any run of consecutive symbols is a
/// plain byte slice of `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedWord {
	bytes: Vec<u8>,
	/// Symbol boundaries: symbol `i` is `bytes[bounds[i]..bounds[i + 1]]`.
	bounds: Vec<usize>,
}

impl BoundedWord {
	/// Wraps `word` as `START + word + END`.
	///
	/// The word is chunked on its own before the sentinels are added, so a
	/// truncated trailing sequence never swallows `END`.
	pub fn new(word: &[u8]) -> Self {
		let mut bytes = Vec::with_capacity(word.len() + 2);
		bytes.push(START);
		bytes.extend_from_slice(word);
		bytes.push(END);

		let mut bounds = Vec::with_capacity(word.len() + 3);
		bounds.push(0);
		bounds.extend(symbol_starts(word).into_iter().map(|start| start + 1));
		bounds.push(word.len() + 1);
		bounds.push(word.len() + 2);

		Self { bytes, bounds }
	}

	/// Number of symbols, sentinels included.
	pub fn len(&self) -> usize {
		self.bounds.len() - 1
	}

	/// Always `false`: a bounded word holds at least both sentinels.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Bytes of symbol `i`.
	pub fn symbol(&self, i: usize) -> &[u8] {
		&self.bytes[self.bounds[i]..self.bounds[i + 1]]
	}

	/// Bytes of the symbols `first..=last`, concatenated.
	pub fn span(&self, first: usize, last: usize) -> &[u8] {
		&self.bytes[self.bounds[first]..self.bounds[last + 1]]
	}
}
