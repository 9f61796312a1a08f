use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default maximum context length, in symbols.
pub const DEFAULT_ORDER: usize = 3;

/// Default maximum number of symbols in a generated word.
pub const DEFAULT_MAX_LENGTH: usize = 10;

/// Parameters of a [`MarkovChainGenerator`](super::generator::MarkovChainGenerator).
///
/// # Invariants
/// - `order` >= 1
/// - `max_length` >= 1
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
	/// Maximum context length used for training and sampling.
	order: usize,

	/// Hard cap on the number of symbols of a generated word.
	max_length: usize,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self { order: DEFAULT_ORDER, max_length: DEFAULT_MAX_LENGTH }
	}
}

impl GeneratorConfig {
	/// Creates a configuration with the given order and the default length cap.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		let mut config = Self::default();
		config.set_order(order)?;
		Ok(config)
	}

	/// Returns the maximum context length.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Returns the generation length cap.
	pub fn max_length(&self) -> usize {
		self.max_length
	}

	/// Sets the maximum context length.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		if order < 1 {
			return Err(Error::InvalidConfig("order must be >= 1".to_owned()));
		}
		self.order = order;
		Ok(())
	}

	/// Sets the generation length cap.
	///
	/// # Errors
	/// Returns an error if `max_length` is 0.
	pub fn set_max_length(&mut self, max_length: usize) -> Result<()> {
		if max_length < 1 {
			return Err(Error::InvalidConfig("max_length must be >= 1".to_owned()));
		}
		self.max_length = max_length;
		Ok(())
	}

	/// Checks the invariants, for configurations built through serde.
	pub fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(Error::InvalidConfig("order must be >= 1".to_owned()));
		}
		if self.max_length < 1 {
			return Err(Error::InvalidConfig("max_length must be >= 1".to_owned()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = GeneratorConfig::default();
		assert_eq!(config.order(), 3);
		assert_eq!(config.max_length(), 10);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn setters_validate() {
		let mut config = GeneratorConfig::new(2).unwrap();
		assert!(config.set_order(0).is_err());
		assert!(config.set_max_length(0).is_err());
		assert_eq!(config.order(), 2);
		assert_eq!(config.max_length(), 10);

		config.set_max_length(4).unwrap();
		assert_eq!(config.max_length(), 4);
	}

	#[test]
	fn zero_order_is_rejected() {
		assert!(matches!(GeneratorConfig::new(0), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn serde_round_trip_then_validate() {
		let config: GeneratorConfig = postcard::from_bytes(&postcard::to_stdvec(&GeneratorConfig::default()).unwrap()).unwrap();
		assert_eq!(config, GeneratorConfig::default());

		let zero: GeneratorConfig =
			postcard::from_bytes(&postcard::to_stdvec(&(0usize, 5usize)).unwrap()).unwrap();
		assert!(zero.validate().is_err());
	}
}
