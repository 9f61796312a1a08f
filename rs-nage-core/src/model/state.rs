use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Occurrence counts recorded for a single context during training.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - `total` is the sum of all transition counts
/// - Each transition occurrence count is strictly positive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Occurrences {
	/// Number of times the context was observed with a successor.
	total: u64,
	/// Outgoing transitions indexed by the next symbol.
	/// Example: { "e" => 42, "a" => 3 }
	transitions: HashMap<Vec<u8>, u64>,
}

impl Occurrences {
	/// Records one occurrence of a transition toward `next_symbol`.
	pub fn add_transition(&mut self, next_symbol: &[u8]) {
		match self.transitions.get_mut(next_symbol) {
			Some(occurrence) => *occurrence += 1,
			None => {
				self.transitions.insert(next_symbol.to_vec(), 1);
			}
		}
		self.total += 1;
	}

	/// Sums the counts of `other` into this one.
	pub fn merge(&mut self, other: &Self) {
		for (next_symbol, occurrence) in &other.transitions {
			*self.transitions.entry(next_symbol.clone()).or_insert(0) += *occurrence;
		}
		self.total += other.total;
	}

	/// Number of observations of the context.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Converts the counts into probabilities (`count / total`).
	pub fn finalize(&self) -> Distribution {
		let total = self.total as f64;
		let probabilities = self
			.transitions
			.iter()
			.map(|(next_symbol, occurrence)| (next_symbol.clone(), *occurrence as f64 / total))
			.collect();
		Distribution { probabilities }
	}
}

/// Probability distribution over the symbols following one context.
///
/// Entries are kept sorted by symbol bytes. This is the order used by
/// sampling and by the cache file, which makes both reproducible.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Distribution {
	probabilities: BTreeMap<Vec<u8>, f64>,
}

impl Distribution {
	pub(crate) fn from_probabilities(probabilities: BTreeMap<Vec<u8>, f64>) -> Self {
		Self { probabilities }
	}

	/// Probability of `next_symbol`, or `None` if it never followed the context.
	pub fn probability(&self, next_symbol: &[u8]) -> Option<f64> {
		self.probabilities.get(next_symbol).copied()
	}

	/// Iterates over `(next_symbol, probability)` in sampling order.
	pub fn iter(&self) -> impl Iterator<Item = (&[u8], f64)> {
		self.probabilities.iter().map(|(k, v)| (k.as_slice(), *v))
	}

	/// Number of distinct successors.
	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	/// Returns `true` if the distribution has no successor.
	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	/// Sum of all probabilities (1.0 for a trained distribution).
	pub fn total(&self) -> f64 {
		self.probabilities.values().sum()
	}

	/// Picks the successor selected by the uniform draw `r` in `[0, 1)`.
	///
	/// Walks the entries accumulating their mass `m` and returns the first
	/// one with `m <= r < m + p`. If rounding leaves `r` past the total mass,
	/// the last entry is returned. Returns `None` only when empty.
	pub fn pick(&self, r: f64) -> Option<&[u8]> {
		let mut mass = 0.0;
		let mut fallback = None;
		for (next_symbol, p) in self.iter() {
			if mass <= r && r < mass + p {
				return Some(next_symbol);
			}
			mass += p;
			fallback = Some(next_symbol);
		}
		fallback
	}
}
