use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::tokenizer::{TokenizerConfig, UnknownPolicy};
use crate::error::{Error, Result};

/// Integer id of a word.
pub type TokenId = u32;

/// Padding sentinel, meaning "no token here".
pub const PAD_ID: TokenId = 0;

/// Two-way mapping between words and ids.
///
/// Built once from the training corpus and never modified afterwards.
///
/// ## Responsibilities:
/// - Assign ids `1..` by descending frequency, ties broken by first appearance
/// - Encode text to ids and decode ids to words, both in O(1) per word
///
/// ## Invariants
/// - `words[id - 1]` is the word with id `id`
/// - `ids[words[i]] == i + 1`
/// - `PAD_ID` is never assigned
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
	/// Words ordered by id, offset by one (id 0 is padding).
	words: Vec<String>,
	/// Reverse lookup.
	ids: HashMap<String, TokenId>,
}

impl Vocabulary {
	/// Builds the vocabulary of `text`.
	///
	/// An empty corpus gives an empty vocabulary of size 1 (padding only).
	pub fn fit(text: &str, config: &TokenizerConfig) -> Self {
		// Occurrences per word, in first-appearance order
		let mut counts: Vec<(String, usize)> = Vec::new();
		let mut positions: HashMap<String, usize> = HashMap::new();
		for word in config.words(text) {
			match positions.get(&word) {
				Some(&i) => counts[i].1 += 1,
				None => {
					positions.insert(word.clone(), counts.len());
					counts.push((word, 1));
				}
			}
		}

		// Stable sort keeps first-appearance order among equal counts
		counts.sort_by(|a, b| b.1.cmp(&a.1));

		Self::from_words(counts.into_iter().map(|(word, _)| word))
	}

	/// Builds a vocabulary assigning ids `1..` in iteration order.
	///
	/// Duplicates are skipped (first occurrence wins).
	pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
		let mut vocabulary = Self { words: Vec::new(), ids: HashMap::new() };
		for word in words {
			if vocabulary.ids.contains_key(&word) {
				continue;
			}
			vocabulary.words.push(word.clone());
			vocabulary.ids.insert(word, vocabulary.words.len() as TokenId);
		}
		vocabulary
	}

	/// Number of distinct words plus one for padding.
	pub fn size(&self) -> usize {
		self.words.len() + 1
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Returns the id of `word`, if known.
	pub fn id(&self, word: &str) -> Option<TokenId> {
		self.ids.get(word).copied()
	}

	/// Returns the word with id `id`, if any.
	pub fn word(&self, id: TokenId) -> Option<&str> {
		if id == PAD_ID {
			return None;
		}
		self.words.get(id as usize - 1).map(String::as_str)
	}

	/// Iterates over `(word, id)` pairs in id order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> {
		self.words.iter().enumerate().map(|(i, word)| (word.as_str(), i as TokenId + 1))
	}

	/// Encodes `text` into ids.
	///
	/// # Errors
	/// With `UnknownPolicy::Error`, returns `Error::UnknownWord` on the first
	/// word missing from the vocabulary. With `UnknownPolicy::Skip` such words
	/// are dropped.
	pub fn encode(&self, text: &str, config: &TokenizerConfig, policy: UnknownPolicy) -> Result<Vec<TokenId>> {
		let mut encoded = Vec::new();
		for word in config.words(text) {
			match (self.id(&word), policy) {
				(Some(id), _) => encoded.push(id),
				(None, UnknownPolicy::Error) => return Err(Error::UnknownWord(word)),
				(None, UnknownPolicy::Skip) => warn!("Skipping unknown word {word:?}"),
			}
		}
		Ok(encoded)
	}

	/// Decodes a single id.
	///
	/// # Errors
	/// Returns `Error::UnmappedId` for the padding id or an out-of-range id.
	pub fn decode(&self, id: TokenId) -> Result<&str> {
		self.word(id).ok_or(Error::UnmappedId(id))
	}
}
