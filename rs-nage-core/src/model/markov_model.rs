use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use super::state::Distribution;
use super::symbol::symbol_count;
use crate::error::Error;

/// A trained n-gram model over UTF-8 symbols.
///
/// The `Model` maps every context (1 to `order` consecutive symbols, stored
/// as their concatenated bytes) to the distribution of the symbol that
/// followed it in the corpus.
///
/// A model is built once, by the trainer or by the cache loader, and is
/// read-only afterwards.
///
/// # Invariants
/// - `order` is always >= 1
/// - Every context holds between 1 and `order` symbols
/// - Every distribution of a trained model sums to 1.0
///
/// Deserializing checks the first two invariants.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "ModelData")]
pub struct Model {
	/// Maximum context length, in symbols.
	order: usize,

	/// Mapping from a context to the distribution of its successors.
	contexts: BTreeMap<Vec<u8>, Distribution>,
}

/// Unchecked serde form of [`Model`].
#[derive(Deserialize)]
struct ModelData {
	order: usize,
	contexts: BTreeMap<Vec<u8>, Distribution>,
}

impl TryFrom<ModelData> for Model {
	type Error = Error;

	fn try_from(data: ModelData) -> Result<Self, Self::Error> {
		if data.order == 0 {
			return Err(Error::InvalidConfig("model order must be at least 1".to_string()));
		}
		for context in data.contexts.keys() {
			let len = symbol_count(context);
			if len == 0 || len > data.order {
				return Err(Error::InvalidConfig(format!(
					"context of {} symbols in a model of order {}",
					len, data.order
				)));
			}
		}
		Ok(Self { order: data.order, contexts: data.contexts })
	}
}

impl Model {
	/// Creates an empty model of the given order.
	///
	/// Generating from an empty model yields the empty string.
	pub fn empty(order: usize) -> Self {
		Self { order: order.max(1), contexts: BTreeMap::new() }
	}

	pub(crate) fn from_contexts(order: usize, contexts: BTreeMap<Vec<u8>, Distribution>) -> Self {
		debug_assert!(contexts.keys().all(|context| {
			let len = symbol_count(context);
			len >= 1 && len <= order
		}));
		Self { order: order.max(1), contexts }
	}

	/// The maximum context length considered.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	/// Returns `true` if the model holds no context.
	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Distribution of the symbols following `context`.
	///
	/// Returns `None` if the context was never observed.
	pub fn distribution(&self, context: &[u8]) -> Option<&Distribution> {
		self.contexts.get(context)
	}

	/// Probability that `next_symbol` follows `context`.
	pub fn probability(&self, context: &[u8], next_symbol: &[u8]) -> Option<f64> {
		self.distribution(context)?.probability(next_symbol)
	}

	/// Iterates over all contexts in byte order.
	pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Distribution)> {
		self.contexts.iter().map(|(k, v)| (k.as_slice(), v))
	}
}
