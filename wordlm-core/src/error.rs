use std::{fmt, io};

use crate::text::vocabulary::TokenId;

/// Errors produced anywhere in the pipeline.
///
/// # Variants
/// - `UnknownWord`: a word was encoded that the vocabulary never saw.
/// - `UnmappedId`: an id has no word (the padding id, or out of range).
/// - `EmptyDataset`: training was asked to run on zero examples.
/// - `ContextLength`: a context does not have the model's fixed length.
/// - `VocabularyMismatch`: a model and a vocabulary disagree on size.
/// - `InvalidInput`: a configuration or request value is out of range.
/// - `Io` / `Serialization`: file access or postcard failures.
#[derive(Debug)]
pub enum Error {
	UnknownWord(String),
	UnmappedId(TokenId),
	EmptyDataset,
	ContextLength { expected: usize, actual: usize },
	VocabularyMismatch { expected: usize, actual: usize },
	InvalidInput(String),
	Io(io::Error),
	Serialization(postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::UnknownWord(word) => write!(f, "unknown word {word:?}"),
			Error::UnmappedId(id) => write!(f, "no vocabulary entry for id {id}"),
			Error::EmptyDataset => write!(f, "dataset has no training examples"),
			Error::ContextLength { expected, actual } => {
				write!(f, "context length mismatch: expected {expected}, got {actual}")
			}
			Error::VocabularyMismatch { expected, actual } => {
				write!(f, "vocabulary size mismatch: expected {expected}, got {actual}")
			}
			Error::InvalidInput(message) => write!(f, "invalid input: {message}"),
			Error::Io(e) => write!(f, "i/o error: {e}"),
			Error::Serialization(e) => write!(f, "serialization error: {e}"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			Error::Serialization(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Error::Io(e)
	}
}

impl From<postcard::Error> for Error {
	fn from(e: postcard::Error) -> Self {
		Error::Serialization(e)
	}
}
