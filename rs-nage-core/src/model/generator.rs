use std::path::Path;

use log::info;
use rand::Rng;

use super::codec;
use super::config::GeneratorConfig;
use super::markov_model::Model;
use super::sampler::Sampler;
use super::trainer::FrequencyTrainer;
use crate::error::Result;

/// Where the model of a generator came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSource {
	/// Read from an existing cache file.
	Cache,
	/// Trained from the corpus (and written to the cache).
	Corpus,
}

/// High-level Markov-chain word generator.
///
/// # Responsibilities
/// - Own one trained [`Model`] and its configuration
/// - Train from a corpus, or load and save the binary cache
/// - Generate words with context-length fallback
///
/// There is no global registry: the caller owns the generator. Generation
/// only borrows the model, so a shared `&MarkovChainGenerator` may generate
/// from several threads, each with its own random source.
#[derive(Clone, Debug)]
pub struct MarkovChainGenerator {
	config: GeneratorConfig,
	model: Model,
}

impl MarkovChainGenerator {
	/// Creates a generator with an empty model.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		Self::with_config(GeneratorConfig::new(order)?)
	}

	/// Creates a generator with an empty model from a full configuration.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid.
	pub fn with_config(config: GeneratorConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config, model: Model::empty(config.order()) })
	}

	/// Returns the configuration.
	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Returns the current model.
	pub fn model(&self) -> &Model {
		&self.model
	}

	/// Trains a new model from a corpus file, replacing the current one.
	///
	/// The current model is kept if the corpus cannot be read.
	///
	/// # Errors
	/// Returns `Error::Io` if the corpus cannot be opened or read.
	pub fn compute<P: AsRef<Path>>(&mut self, corpus_path: P) -> Result<()> {
		let mut trainer = FrequencyTrainer::new(self.config.order())?;
		trainer.add_corpus(&corpus_path)?;
		self.model = trainer.finish();
		info!(
			"Trained model of order {} with {} contexts from {}",
			self.config.order(),
			self.model.len(),
			corpus_path.as_ref().display()
		);
		Ok(())
	}

	/// Loads a model from a cache file, replacing the current one.
	///
	/// The current model is kept on failure.
	///
	/// # Errors
	/// - `Error::Io` if the cache cannot be opened or read
	/// - `Error::CorruptCache` if it is truncated or invalid
	pub fn load<P: AsRef<Path>>(&mut self, cache_path: P) -> Result<()> {
		self.model = codec::load(cache_path, self.config.order())?;
		Ok(())
	}

	/// Saves the model to a cache file.
	///
	/// The file is replaced atomically; a failed save leaves any previous
	/// cache untouched.
	///
	/// # Errors
	/// Returns `Error::Io` if the file cannot be written.
	pub fn save<P: AsRef<Path>>(&self, cache_path: P) -> Result<()> {
		codec::save(&self.model, cache_path)
	}

	/// Loads the cache if it exists, otherwise trains from the corpus and
	/// writes the cache.
	///
	/// The cache is never invalidated: if the corpus changes, the cache file
	/// must be deleted by hand.
	///
	/// # Errors
	/// - `Error::Io` if the file to read (or the cache to write) fails
	/// - `Error::CorruptCache` if an existing cache is invalid; the caller may
	///   delete it and call again to retrain
	pub fn load_cache_or_compute<PC, PT>(&mut self, cache_path: PC, corpus_path: PT) -> Result<ModelSource>
	where
		PC: AsRef<Path>,
		PT: AsRef<Path>,
	{
		if cache_path.as_ref().exists() {
			self.load(&cache_path)?;
			Ok(ModelSource::Cache)
		} else {
			self.compute(&corpus_path)?;
			self.save(&cache_path)?;
			Ok(ModelSource::Corpus)
		}
	}

	/// Generates a word using the thread-local random generator.
	///
	/// Never fails; an empty model yields an empty string.
	pub fn generate(&self) -> String {
		self.generate_with(&mut rand::rng())
	}

	/// Generates a word using the given random generator.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		Sampler::new(self.config.order(), self.config.max_length()).generate(&self.model, rng)
	}
}
