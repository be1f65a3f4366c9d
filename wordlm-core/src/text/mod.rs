//! Text side of the pipeline.
//!
//! - Word splitting rules (`TokenizerConfig`) and unknown-word handling (`UnknownPolicy`)
//! - The immutable two-way word/id mapping (`Vocabulary`)
//! - Prefix framing and padding of training examples (`Dataset`)

/// Word splitting configuration and unknown-word policy.
pub mod tokenizer;

/// Word ↔ id mapping built once from the training corpus.
///
/// Id `0` is reserved for padding and never assigned to a word.
pub mod vocabulary;

/// Prefix n-gram framing, padding and one-hot targets.
pub mod framer;
