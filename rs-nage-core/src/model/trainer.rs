use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use super::markov_model::Model;
use super::state::Occurrences;
use super::symbol::{BoundedWord, END, START};
use crate::error::{Error, Result};
use crate::io::CorpusReader;

/// Accumulates context → successor counts over a corpus.
///
/// # Responsibilities
/// - Break every word into contexts of 1 to `order` symbols
/// - Count which symbol follows each context
/// - Merge with another trainer of the same order
/// - Finalize the counts into an immutable [`Model`]
///
/// Training is deterministic: the same words with the same order always
/// produce the same model.
#[derive(Clone, Debug)]
pub struct FrequencyTrainer {
	/// Maximum context length, in symbols (must be >= 1)
	order: usize,

	/// Occurrence counts for every context seen so far
	occurrences: HashMap<Vec<u8>, Occurrences>,
}

impl FrequencyTrainer {
	/// Creates an empty trainer.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		if order < 1 {
			return Err(Error::InvalidConfig("order must be >= 1".to_owned()));
		}
		Ok(Self { order, occurrences: HashMap::new() })
	}

	/// The maximum context length recorded.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct contexts recorded so far.
	pub fn context_count(&self) -> usize {
		self.occurrences.len()
	}

	/// Adds one training word.
	///
	/// The word is wrapped with the sentinels, then for every symbol but the
	/// final `END`, each context of 1 to `order` symbols ending at it records
	/// its successor. Contexts never reach before `START`. Sentinel bytes
	/// inside `word` are dropped.
	pub fn add_word(&mut self, word: &[u8]) {
		let word = if word.iter().any(|&b| b == START || b == END) {
			let cleaned: Vec<u8> = word.iter().copied().filter(|&b| b != START && b != END).collect();
			BoundedWord::new(&cleaned)
		} else {
			BoundedWord::new(word)
		};

		for i in 0..word.len() - 1 {
			let next_symbol = word.symbol(i + 1);
			for j in 1..=self.order.min(i + 1) {
				let context = word.span(i + 1 - j, i);
				match self.occurrences.get_mut(context) {
					Some(occurrences) => occurrences.add_transition(next_symbol),
					None => {
						let mut occurrences = Occurrences::default();
						occurrences.add_transition(next_symbol);
						self.occurrences.insert(context.to_vec(), occurrences);
					}
				}
			}
		}
	}

	/// Adds every word of a corpus file.
	///
	/// Returns the number of words read.
	///
	/// # Errors
	/// Returns `Error::Io` if the file cannot be opened or read.
	pub fn add_corpus<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
		let mut words = 0;
		for word in CorpusReader::open(&path)? {
			self.add_word(&word?);
			words += 1;
		}
		info!("Trained {} words from {}", words, path.as_ref().display());
		Ok(words)
	}

	/// Merges another trainer into this one.
	///
	/// Occurrence counts of matching contexts are summed.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if the orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(Error::InvalidConfig(format!(
				"order mismatch: self={}, other={}",
				self.order, other.order
			)));
		}

		for (context, occurrences) in &other.occurrences {
			if let Some(existing) = self.occurrences.get_mut(context) {
				existing.merge(occurrences);
			} else {
				self.occurrences.insert(context.clone(), occurrences.clone());
			}
		}

		Ok(())
	}

	/// Turns the accumulated counts into probabilities.
	pub fn finish(&self) -> Model {
		let contexts = self
			.occurrences
			.iter()
			.map(|(context, occurrences)| (context.clone(), occurrences.finalize()))
			.collect();
		debug!("Finalized {} contexts (order {})", self.occurrences.len(), self.order);
		Model::from_contexts(self.order, contexts)
	}
}
