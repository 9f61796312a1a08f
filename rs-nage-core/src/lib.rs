//! N-gram (Markov-chain) name generation library.
//!
//! This crate learns the character statistics of a word list and samples
//! plausible new words from them:
//! - A lazy corpus reader splitting words into UTF-8 symbols
//! - A frequency trainer covering every context length up to the order
//! - An immutable model with a compact binary cache format
//! - A sampler with context-length fallback
//!
//! The high-level entry point is [`MarkovChainGenerator`].

/// Crate error type.
pub mod error;

/// Core n-gram models, training, persistence and generation logic.
pub mod model;

/// I/O utilities (corpus reading, atomic writes).
///
/// Only the corpus reader is re-exported.
pub(crate) mod io;

pub use error::{Error, Result};
pub use io::CorpusReader;
pub use model::config::GeneratorConfig;
pub use model::generator::{MarkovChainGenerator, ModelSource};
pub use model::markov_model::{Distribution, Model};
pub use model::sampler::Sampler;
pub use model::trainer::FrequencyTrainer;
