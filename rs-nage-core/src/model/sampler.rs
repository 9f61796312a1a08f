use rand::Rng;

use super::markov_model::Model;
use super::symbol::{END, START};

/// Draws words from a [`Model`].
///
/// Generation starts from `START` and appends one symbol per step:
/// - One uniform draw `r` in `[0, 1)` is made for the step
/// - Contexts are tried from `order` symbols down to 1, shrinking the window
///   near the beginning of the word rather than padding it
/// - The first known context picks the successor with `r`; the same draw is
///   reused for every context tried during the step
///
/// Generation stops on `END`, after `max_length` symbols, or when no context
/// is known at all. It never fails: an empty model yields an empty string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sampler {
	/// Maximum context length tried, in symbols.
	order: usize,
	/// Maximum number of symbols in a generated word.
	max_length: usize,
}

impl Sampler {
	/// Creates a sampler. Both values are clamped to at least 1.
	pub fn new(order: usize, max_length: usize) -> Self {
		Self { order: order.max(1), max_length: max_length.max(1) }
	}

	/// The maximum context length tried.
	pub fn order(&self) -> usize {
		self.order
	}

	/// The maximum number of symbols in a generated word.
	pub fn max_length(&self) -> usize {
		self.max_length
	}

	/// Generates one word.
	///
	/// Symbols are decoded as UTF-8; invalid sequences (only possible with a
	/// hand-built or foreign cache) are replaced with `U+FFFD`.
	pub fn generate<R: Rng + ?Sized>(&self, model: &Model, rng: &mut R) -> String {
		if model.is_empty() {
			return String::new();
		}

		let mut word = vec![START];
		// Start offset of every symbol in `word`
		let mut starts = vec![0];

		while starts.len() - 1 < self.max_length {
			let r: f64 = rng.random();

			let mut next_symbol = None;
			for j in (1..=self.order).rev() {
				let window = j.min(starts.len());
				let context = &word[starts[starts.len() - window]..];
				if let Some(distribution) = model.distribution(context) {
					next_symbol = distribution.pick(r);
					if next_symbol.is_some() {
						break;
					}
				}
			}

			match next_symbol {
				Some(symbol) if symbol != [END] => {
					starts.push(word.len());
					word.extend_from_slice(symbol);
				}
				_ => break,
			}
		}

		String::from_utf8_lossy(&word[1..]).into_owned()
	}
}
