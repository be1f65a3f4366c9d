//! Next-word models and text generation.
//!
//! The pipeline never depends on a concrete model. It talks to:
//! - `Trainer`: fits a model on a padded `Dataset`
//! - `Predictor`: maps a padded context to a distribution over the vocabulary
//!
//! A counting back-off backend (`FrequencyModel`) ships with the crate.

use crate::error::{Error, Result};
use crate::text::framer::Dataset;
use crate::text::vocabulary::TokenId;

/// High-level generation loop (encode, pad, predict, decode, append).
pub mod generator;

/// Generation parameters (seed text, word count, decoding strategy).
pub mod generation_input;

/// Counting back-off model and its parallel trainer.
pub mod frequency_model;

/// Transition counts for a single context key.
///
/// Not exposed publicly.
mod state;

/// A trained next-word model.
///
/// # Invariants
/// - `distribution` returns exactly `vocab_size()` values
/// - contexts passed in are padded to `context_len()`
pub trait Predictor {
	/// Number of output classes (vocabulary size, padding included).
	fn vocab_size(&self) -> usize;

	/// Fixed context length the model was trained with.
	fn context_len(&self) -> usize;

	/// Probability of every id following `context`.
	///
	/// # Errors
	/// Implementations return `Error::ContextLength` when `context` is not
	/// `context_len()` ids long.
	fn distribution(&self, context: &[TokenId]) -> Result<Vec<f32>>;

	/// Most probable next id (argmax of `distribution`).
	fn predict(&self, context: &[TokenId]) -> Result<TokenId> {
		let distribution = self.distribution(context)?;
		argmax(&distribution)
			.ok_or_else(|| Error::InvalidInput("model returned an empty distribution".to_owned()))
	}

	/// Human-readable description of the model.
	fn summary(&self) -> String {
		format!(
			"Model: context length {}, {} output classes",
			self.context_len(),
			self.vocab_size()
		)
	}
}

/// Fits a `Predictor` on a padded dataset.
pub trait Trainer {
	type Model: Predictor;

	/// Trains a new model.
	///
	/// # Errors
	/// Returns `Error::EmptyDataset` if there is nothing to learn from.
	fn train(&self, dataset: &Dataset) -> Result<Self::Model>;
}

/// Index of the largest value; ties go to the lowest index.
///
/// Returns `None` for an empty slice. NaN values never win.
pub fn argmax(values: &[f32]) -> Option<TokenId> {
	let mut best: Option<(usize, f32)> = None;
	for (i, &value) in values.iter().enumerate() {
		match best {
			Some((_, best_value)) if value <= best_value => (),
			_ if value.is_nan() => (),
			_ => best = Some((i, value)),
		}
	}
	best.map(|(i, _)| i as TokenId)
}
