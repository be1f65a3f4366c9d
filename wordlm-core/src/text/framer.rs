use log::info;
use serde::{Deserialize, Serialize};

use super::tokenizer::{TokenizerConfig, UnknownPolicy};
use super::vocabulary::{PAD_ID, TokenId, Vocabulary};
use crate::error::Result;

/// A single unpadded training example.
///
/// `context` holds the ids preceding `target` on the same line.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Example {
	pub context: Vec<TokenId>,
	pub target: TokenId,
}

/// Emits every prefix example of an encoded line.
///
/// For a line of `k` ids this returns `k - 1` examples whose contexts have
/// lengths `1..k-1`. Lines shorter than 2 ids give nothing.
pub fn frame_line(ids: &[TokenId]) -> Vec<Example> {
	(2..=ids.len())
		.map(|i| Example {
			context: ids[..i - 1].to_vec(),
			target: ids[i - 1],
		})
		.collect()
}

/// Left-pads `ids` with `PAD_ID` up to `len`.
///
/// Longer inputs keep their last `len` ids. Padding an already padded
/// context returns it unchanged.
pub fn pad_context(ids: &[TokenId], len: usize) -> Vec<TokenId> {
	if ids.len() >= len {
		return ids[ids.len() - len..].to_vec();
	}
	let mut padded = vec![PAD_ID; len - ids.len()];
	padded.extend_from_slice(ids);
	padded
}

/// One-hot vector of length `size` with a `1.0` at `id`.
///
/// An id outside `0..size` gives an all-zero vector.
pub fn one_hot(id: TokenId, size: usize) -> Vec<f32> {
	let mut encoded = vec![0.0; size];
	if let Some(slot) = encoded.get_mut(id as usize) {
		*slot = 1.0;
	}
	encoded
}

/// Padded training set derived from a corpus.
///
/// # Invariants
/// - every context has exactly `context_len` ids
/// - `context_len` is the longest unpadded context of the corpus
/// - `contexts.len() == targets.len()`
///
/// Padding ids are not masked: a model sees leading zeros as ordinary input.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Dataset {
	contexts: Vec<Vec<TokenId>>,
	targets: Vec<TokenId>,
	context_len: usize,
	vocab_size: usize,
}

impl Dataset {
	/// Frames `text` line by line (split on `'\n'`) using `vocabulary`.
	///
	/// # Errors
	/// Returns `Error::UnknownWord` if a word of `text` is not in `vocabulary`,
	/// which cannot happen when the vocabulary was fitted on the same text.
	pub fn frame(text: &str, vocabulary: &Vocabulary, config: &TokenizerConfig) -> Result<Self> {
		let mut examples = Vec::new();
		for line in text.split('\n') {
			let ids = vocabulary.encode(line, config, UnknownPolicy::Error)?;
			examples.extend(frame_line(&ids));
		}

		let dataset = Self::from_examples(examples, vocabulary.size());
		info!(
			"Framed {} sequences, context length {}",
			dataset.len(),
			dataset.context_len()
		);
		Ok(dataset)
	}

	/// Pads `examples` to their longest context.
	pub fn from_examples(examples: Vec<Example>, vocab_size: usize) -> Self {
		let context_len = examples.iter().map(|e| e.context.len()).max().unwrap_or(0);

		let (contexts, targets) = examples
			.into_iter()
			.map(|e| (pad_context(&e.context, context_len), e.target))
			.unzip();

		Self { contexts, targets, context_len, vocab_size }
	}

	/// Number of examples.
	pub fn len(&self) -> usize {
		self.targets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.targets.is_empty()
	}

	/// Fixed length of every context.
	pub fn context_len(&self) -> usize {
		self.context_len
	}

	/// Length of a full sequence (context plus target).
	pub fn max_sequence_len(&self) -> usize {
		self.context_len + 1
	}

	pub fn vocab_size(&self) -> usize {
		self.vocab_size
	}

	pub fn contexts(&self) -> &[Vec<TokenId>] {
		&self.contexts
	}

	pub fn targets(&self) -> &[TokenId] {
		&self.targets
	}

	/// Iterates over `(padded context, target)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&[TokenId], TokenId)> {
		self.contexts.iter().map(Vec::as_slice).zip(self.targets.iter().copied())
	}

	/// Targets as one-hot vectors of length `vocab_size`.
	pub fn one_hot_targets(&self) -> Vec<Vec<f32>> {
		self.targets.iter().map(|&t| one_hot(t, self.vocab_size)).collect()
	}
}
