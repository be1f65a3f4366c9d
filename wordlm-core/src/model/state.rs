use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::vocabulary::TokenId;

/// Represents a context in the frequency model.
///
/// A `State` corresponds to a fixed run of trailing context ids (`key`) and
/// stores every observed next id after it.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Turn counts into a probability distribution over the vocabulary
/// - Merge with another state having the same key (parallel training)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct State {
	/// Trailing context ids identifying the state.
	key: Vec<TokenId>,
	/// Outgoing transitions indexed by the next id.
	/// Example: { 7 => 42, 3 => 1 }
	transitions: HashMap<TokenId, usize>,
}

impl State {
	/// Creates a new empty state for the given key.
	pub(crate) fn new(key: &[TokenId]) -> Self {
		Self {
			key: key.to_vec(),
			transitions: HashMap::new(),
		}
	}

	/// Records one occurrence of `next` after this key.
	pub(crate) fn add_transition(&mut self, next: TokenId) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Number of distinct next ids.
	pub(crate) fn len(&self) -> usize {
		self.transitions.len()
	}

	/// Normalised transition counts as a vector of length `size`.
	///
	/// Ids outside `0..size` are ignored. An empty state gives all zeros.
	pub(crate) fn distribution(&self, size: usize) -> Vec<f32> {
		let mut distribution = vec![0.0; size];

		let total: usize = self.transitions.values().sum();
		if total == 0 {
			return distribution;
		}

		for (&next, &occurrence) in &self.transitions {
			if let Some(slot) = distribution.get_mut(next as usize) {
				*slot = occurrence as f32 / total as f32;
			}
		}
		distribution
	}

	/// Merges another state into this one.
	///
	/// Both states must have the same key. Occurrence counts are summed.
	///
	/// # Errors
	/// Returns an error if the keys do not match.
	pub(crate) fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(Error::InvalidInput(format!(
				"cannot merge state {:?} into {:?}",
				other.key, self.key
			)));
		}

		for (&next, &occurrence) in &other.transitions {
			*self.transitions.entry(next).or_insert(0) += occurrence;
		}

		Ok(())
	}
}
