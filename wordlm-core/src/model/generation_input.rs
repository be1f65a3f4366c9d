use std::str::FromStr;

use crate::error::{Error, Result};
use crate::text::tokenizer::UnknownPolicy;

/// Upper bound on words generated by a single call.
pub const MAX_WORDS: usize = 1024;

/// How the next id is picked from the model's distribution.
///
/// # Variants
/// - `Argmax`: always the most probable id (deterministic).
/// - `Sample { seed }`: draw proportionally to the distribution using a
///   generator seeded with `seed`, so equal seeds give equal output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decoding {
	#[default]
	Argmax,
	Sample { seed: u64 },
}

impl FromStr for Decoding {
	type Err = Error;

	/// Parses `"argmax"` or `"sample:<u64>"` (case-insensitive prefix).
	fn from_str(s: &str) -> Result<Self> {
		let lower = s.trim().to_lowercase();
		if lower == "argmax" {
			return Ok(Decoding::Argmax);
		}
		if let Some(seed) = lower.strip_prefix("sample:") {
			return seed
				.parse::<u64>()
				.map(|seed| Decoding::Sample { seed })
				.map_err(|_| Error::InvalidInput("sample seed must be an unsigned integer".to_owned()));
		}
		Err(Error::InvalidInput("decoding must be 'argmax' or 'sample:<seed>'".to_owned()))
	}
}

/// Input parameters for one generation call.
///
/// # Invariants
/// - `n_words <= MAX_WORDS`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationInput {
	/// Text the generated words are appended to.
	pub seed_text: String,

	/// Number of words to append.
	n_words: usize,

	/// Handling of seed words missing from the vocabulary.
	pub policy: UnknownPolicy,

	/// Next-id selection strategy.
	pub decoding: Decoding,
}

impl GenerationInput {
	/// Creates an argmax input failing on unknown words.
	///
	/// # Errors
	/// Returns an error if `n_words` exceeds `MAX_WORDS`.
	pub fn new(seed_text: &str, n_words: usize) -> Result<Self> {
		let mut input = Self {
			seed_text: seed_text.to_owned(),
			n_words: 0,
			policy: UnknownPolicy::Error,
			decoding: Decoding::Argmax,
		};
		input.set_n_words(n_words)?;
		Ok(input)
	}

	pub fn n_words(&self) -> usize {
		self.n_words
	}

	/// Sets the number of words to generate.
	///
	/// # Errors
	/// Returns an error if `n_words` exceeds `MAX_WORDS`.
	pub fn set_n_words(&mut self, n_words: usize) -> Result<()> {
		if n_words > MAX_WORDS {
			return Err(Error::InvalidInput(format!("n_words must be <= {MAX_WORDS}, got {n_words}")));
		}
		self.n_words = n_words;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decoding_parses_both_forms() {
		assert_eq!("argmax".parse::<Decoding>().unwrap(), Decoding::Argmax);
		assert_eq!(" Sample:42".parse::<Decoding>().unwrap(), Decoding::Sample { seed: 42 });
		assert!("sample:-1".parse::<Decoding>().is_err());
		assert!("beam".parse::<Decoding>().is_err());
	}

	#[test]
	fn word_count_is_bounded() {
		assert!(GenerationInput::new("a", MAX_WORDS).is_ok());
		assert!(GenerationInput::new("a", MAX_WORDS + 1).is_err());

		let mut input = GenerationInput::new("a", 3).unwrap();
		assert!(input.set_n_words(MAX_WORDS + 1).is_err());
		assert_eq!(input.n_words(), 3);
	}
}
