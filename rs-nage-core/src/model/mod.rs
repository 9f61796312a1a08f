//! Top-level module for the n-gram generation system.
//!
//! This module provides a Markov-chain word generator, including:
//! - Symbol chunking and word sentinels (`symbol`)
//! - Training-time occurrence counting (`FrequencyTrainer`)
//! - The immutable trained model (`Model`, `Distribution`)
//! - The binary cache format (`codec`)
//! - Context-fallback sampling (`Sampler`)
//! - A high-level generation interface (`MarkovChainGenerator`)

/// High-level interface owning a model and its configuration.
///
/// Exposes training, cache loading and saving, and word generation.
pub mod generator;

/// Generator configuration (order, length cap).
pub mod config;

/// Trained n-gram model: context → next-symbol distribution.
pub mod markov_model;

/// Frequency trainer turning a corpus into a `Model`.
pub mod trainer;

/// Word generation with context-length fallback.
pub mod sampler;

/// Binary cache encoding and decoding.
pub mod codec;

/// UTF-8 symbol chunking and the `START`/`END` sentinels.
pub mod symbol;

/// Occurrence counts of a single context and their finalized distribution.
///
/// This module is not exposed publicly.
mod state;
