use serde::{Deserialize, Serialize};

/// Characters removed from the text before splitting.
///
/// Apostrophes are deliberately absent, so `'tis` and `there's` stay whole.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// What to do with a word the vocabulary does not know (or an id with no word).
///
/// # Variants
/// - `Error`: fail with `Error::UnknownWord` / `Error::UnmappedId`.
/// - `Skip`: drop the unknown word when encoding, emit an empty word when decoding.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
	#[default]
	Error,
	Skip,
}

/// Word-level splitting rules.
///
/// The same configuration must be used for fitting the vocabulary, framing
/// the corpus and encoding seed phrases; `LanguageModel` stores it for that
/// reason.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
	/// Characters replaced by `split` before splitting.
	pub filters: String,

	/// Lowercase the text first.
	pub lower: bool,

	/// Word separator.
	pub split: char,
}

impl Default for TokenizerConfig {
	fn default() -> Self {
		Self {
			filters: DEFAULT_FILTERS.to_owned(),
			lower: true,
			split: ' ',
		}
	}
}

impl TokenizerConfig {
	/// Splits `text` into words.
	///
	/// - Lowercases if `lower` is set
	/// - Replaces every filter character with `split`
	/// - Splits on `split` and drops empty pieces
	pub fn words(&self, text: &str) -> Vec<String> {
		let text = if self.lower { text.to_lowercase() } else { text.to_owned() };

		let cleaned: String = text
			.chars()
			.map(|c| if self.filters.contains(c) { self.split } else { c })
			.collect();

		cleaned
			.split(self.split)
			.filter(|word| !word.is_empty())
			.map(str::to_owned)
			.collect()
	}
}
