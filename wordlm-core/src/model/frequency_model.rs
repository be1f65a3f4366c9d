use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::state::State;
use super::{Predictor, Trainer};
use crate::error::{Error, Result};
use crate::text::framer::Dataset;
use crate::text::vocabulary::TokenId;

/// Number of chunks per worker when training in parallel.
const CHUNK_FACTOR: usize = 8;

/// Counting back-off next-word model.
///
/// For every order `k` in `0..=context_len` it counts which ids follow the
/// last `k` ids of each padded context. Prediction uses the longest order
/// whose key was seen during training and falls back to shorter ones; order
/// `0` is the plain target frequency and always matches.
///
/// # Invariants
/// - `orders.len() == context_len + 1`
/// - every key in `orders[k]` has exactly `k` ids
/// - padding ids take part in keys like any other id
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FrequencyModel {
	context_len: usize,
	vocab_size: usize,
	/// `orders[k]` maps the trailing `k` context ids to their state.
	orders: Vec<HashMap<Vec<TokenId>, State>>,
	/// Number of training examples seen.
	examples: usize,
}

impl FrequencyModel {
	/// Creates an untrained model.
	pub fn new(context_len: usize, vocab_size: usize) -> Self {
		Self {
			context_len,
			vocab_size,
			orders: vec![HashMap::new(); context_len + 1],
			examples: 0,
		}
	}

	/// Number of training examples the model has counted.
	pub fn examples(&self) -> usize {
		self.examples
	}

	/// Records one padded example.
	///
	/// # Errors
	/// Returns `Error::ContextLength` if `context` is not `context_len` ids long.
	pub fn add_example(&mut self, context: &[TokenId], target: TokenId) -> Result<()> {
		self.check_context(context)?;

		for (k, states) in self.orders.iter_mut().enumerate() {
			let key = &context[self.context_len - k..];
			states
				.entry(key.to_vec())
				.or_insert_with(|| State::new(key))
				.add_transition(target);
		}
		self.examples += 1;
		Ok(())
	}

	/// Merges another model of the same shape into this one.
	///
	/// # Errors
	/// Returns an error if context lengths or vocabulary sizes differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.context_len != other.context_len {
			return Err(Error::ContextLength { expected: self.context_len, actual: other.context_len });
		}
		if self.vocab_size != other.vocab_size {
			return Err(Error::VocabularyMismatch { expected: self.vocab_size, actual: other.vocab_size });
		}

		for (states, other_states) in self.orders.iter_mut().zip(&other.orders) {
			for (key, state) in other_states {
				if let Some(existing) = states.get_mut(key) {
					existing.merge(state)?;
				} else {
					states.insert(key.clone(), state.clone());
				}
			}
		}
		self.examples += other.examples;

		Ok(())
	}

	fn check_context(&self, context: &[TokenId]) -> Result<()> {
		if context.len() != self.context_len {
			return Err(Error::ContextLength { expected: self.context_len, actual: context.len() });
		}
		Ok(())
	}
}

impl Predictor for FrequencyModel {
	fn vocab_size(&self) -> usize {
		self.vocab_size
	}

	fn context_len(&self) -> usize {
		self.context_len
	}

	fn distribution(&self, context: &[TokenId]) -> Result<Vec<f32>> {
		self.check_context(context)?;
		if self.examples == 0 {
			return Err(Error::EmptyDataset);
		}

		// Longest known suffix wins
		for k in (0..=self.context_len).rev() {
			if let Some(state) = self.orders[k].get(&context[self.context_len - k..]) {
				return Ok(state.distribution(self.vocab_size));
			}
		}

		// Order 0 always exists once an example was added
		Err(Error::EmptyDataset)
	}

	fn summary(&self) -> String {
		let mut summary = String::from("Model: \"frequency_backoff\"\n");
		summary.push_str(&format!("{:<8}{:>10}{:>14}\n", "order", "states", "transitions"));
		for (k, states) in self.orders.iter().enumerate() {
			let transitions: usize = states.values().map(State::len).sum();
			summary.push_str(&format!("{:<8}{:>10}{:>14}\n", k, states.len(), transitions));
		}
		summary.push_str(&format!("Context length: {}\n", self.context_len));
		summary.push_str(&format!("Output classes: {}\n", self.vocab_size));
		summary.push_str(&format!("Training examples: {}", self.examples));
		summary
	}
}

/// Builds `FrequencyModel`s, optionally on several threads.
///
/// The dataset is split into `workers * 8` chunks, each chunk is counted on
/// its own thread and the partial models are merged as they arrive.
#[derive(Clone, Debug)]
pub struct FrequencyTrainer {
	workers: usize,
}

impl Default for FrequencyTrainer {
	fn default() -> Self {
		Self { workers: num_cpus::get() }
	}
}

impl FrequencyTrainer {
	/// Creates a trainer with an explicit worker count (`1` = single thread).
	///
	/// # Errors
	/// Returns an error if `workers` is zero.
	pub fn with_workers(workers: usize) -> Result<Self> {
		if workers == 0 {
			return Err(Error::InvalidInput("workers must be >= 1".to_owned()));
		}
		Ok(Self { workers })
	}

	pub fn workers(&self) -> usize {
		self.workers
	}

	fn count(dataset: &Dataset, range: std::ops::Range<usize>) -> Result<FrequencyModel> {
		let mut model = FrequencyModel::new(dataset.context_len(), dataset.vocab_size());
		for i in range {
			model.add_example(&dataset.contexts()[i], dataset.targets()[i])?;
		}
		Ok(model)
	}
}

impl Trainer for FrequencyTrainer {
	type Model = FrequencyModel;

	fn train(&self, dataset: &Dataset) -> Result<FrequencyModel> {
		if dataset.is_empty() {
			return Err(Error::EmptyDataset);
		}

		if self.workers == 1 {
			let model = Self::count(dataset, 0..dataset.len())?;
			info!("Trained on {} examples (single thread)", model.examples());
			return Ok(model);
		}

		let chunks = self.workers * CHUNK_FACTOR;
		let chunk_size = dataset.len().div_ceil(chunks);
		let total_chunks = dataset.len().div_ceil(chunk_size);

		let mut final_model = FrequencyModel::new(dataset.context_len(), dataset.vocab_size());
		thread::scope(|scope| -> Result<()> {
			let (tx, rx) = mpsc::channel();
			for start in (0..dataset.len()).step_by(chunk_size) {
				let tx = tx.clone();
				let end = (start + chunk_size).min(dataset.len());
				scope.spawn(move || {
					// The receiver outlives every sender inside the scope
					let _ = tx.send(Self::count(dataset, start..end));
				});
			}
			drop(tx);

			for (merged, partial_model) in rx.iter().enumerate() {
				final_model.merge(&partial_model?)?;
				debug!("Merged partial model {}/{}", merged + 1, total_chunks);
			}
			Ok(())
		})?;

		info!(
			"Trained on {} examples ({} chunks, {} workers)",
			final_model.examples(),
			total_chunks,
			self.workers
		);
		Ok(final_model)
	}
}
