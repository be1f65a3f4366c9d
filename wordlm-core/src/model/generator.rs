use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::generation_input::{Decoding, GenerationInput};
use super::{Predictor, argmax};
use crate::error::{Error, Result};
use crate::text::framer::pad_context;
use crate::text::tokenizer::{TokenizerConfig, UnknownPolicy};
use crate::text::vocabulary::{TokenId, Vocabulary};

/// Text generator over a trained model and its vocabulary.
///
/// # Responsibilities
/// - Encode the in-progress text with the training vocabulary
/// - Pad it to the model's context length
/// - Pick the next id (argmax or seeded sampling) and append its word
#[derive(Debug)]
pub struct Generator<'a, P: Predictor> {
	model: &'a P,
	vocabulary: &'a Vocabulary,
	config: &'a TokenizerConfig,
}

impl<'a, P: Predictor> Generator<'a, P> {
	/// Pairs a model with the vocabulary it was trained on.
	///
	/// # Errors
	/// Returns `Error::VocabularyMismatch` if the model's output size is not
	/// the vocabulary size.
	pub fn new(model: &'a P, vocabulary: &'a Vocabulary, config: &'a TokenizerConfig) -> Result<Self> {
		if model.vocab_size() != vocabulary.size() {
			return Err(Error::VocabularyMismatch {
				expected: vocabulary.size(),
				actual: model.vocab_size(),
			});
		}
		Ok(Self { model, vocabulary, config })
	}

	/// Appends `input.n_words()` words to `input.seed_text`.
	///
	/// Every step re-encodes the whole text generated so far, pads (or
	/// truncates) it to the model's context length and predicts one word.
	///
	/// # Errors
	/// - `Error::UnknownWord` if the seed has a word outside the vocabulary
	///   and the policy is `UnknownPolicy::Error`
	/// - `Error::UnmappedId` if the model picks an id with no word (such as
	///   padding) and the policy is `UnknownPolicy::Error`; with
	///   `UnknownPolicy::Skip` an empty word is appended instead
	/// - any error returned by the model
	pub fn generate(&self, input: &GenerationInput) -> Result<String> {
		let mut rng = match input.decoding {
			Decoding::Argmax => None,
			Decoding::Sample { seed } => Some(StdRng::seed_from_u64(seed)),
		};

		let mut text = input.seed_text.clone();
		for step in 0..input.n_words() {
			let encoded = self.vocabulary.encode(&text, self.config, input.policy)?;
			let context = pad_context(&encoded, self.model.context_len());
			let distribution = self.model.distribution(&context)?;

			let id = match rng.as_mut() {
				Some(rng) => sample(&distribution, rng),
				None => argmax(&distribution),
			}
			.ok_or_else(|| Error::InvalidInput("model returned an empty distribution".to_owned()))?;

			let word = match (self.vocabulary.decode(id), input.policy) {
				(Ok(word), _) => word,
				(Err(_), UnknownPolicy::Skip) => "",
				(Err(e), UnknownPolicy::Error) => return Err(e),
			};
			debug!("Step {}: context {:?} -> {} ({:?})", step + 1, context, id, word);

			text.push(' ');
			text.push_str(word);
		}

		Ok(text)
	}
}

/// Draws an id proportionally to `distribution`.
///
/// Non-positive and NaN weights are never drawn. Falls back to argmax when
/// no weight is positive or the weights do not sum to a finite total.
fn sample<R: Rng>(distribution: &[f32], rng: &mut R) -> Option<TokenId> {
	let total: f32 = distribution.iter().filter(|p| **p > 0.0).sum();
	if !(total > 0.0) || !total.is_finite() {
		return argmax(distribution);
	}

	let mut r = rng.random_range(0.0..total);

	let mut fallback = None;
	for (id, &p) in distribution.iter().enumerate() {
		if !(p > 0.0) {
			continue;
		}
		if r < p {
			return Some(id as TokenId);
		}
		r -= p;
		fallback = Some(id as TokenId);
	}

	// Rounding can leave `r` slightly above the last weight
	fallback
}
