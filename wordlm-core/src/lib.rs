//! Word-level language-model pipeline.
//!
//! This crate turns a raw text corpus into a next-word predictor and
//! generates text from a seed phrase:
//! - Word tokenization and an immutable two-way vocabulary
//! - Prefix n-gram framing with left padding to a corpus-wide context length
//! - A pluggable model interface (`Trainer` / `Predictor`) with a built-in
//!   counting back-off backend
//! - Argmax (or seeded sampled) generation
//! - A serializable bundle tying vocabulary, context length and model together

/// Crate-wide error type.
pub mod error;

/// Tokenizer configuration, vocabulary and sequence framing.
pub mod text;

/// Model interface, counting backend and the text generator.
pub mod model;

/// End-to-end pipeline bundle with binary persistence.
pub mod pipeline;

/// I/O utilities (corpus loading, path helpers).
pub mod io;

pub use error::{Error, Result};
pub use model::generator::Generator;
pub use model::generation_input::{Decoding, GenerationInput};
pub use model::{Predictor, Trainer};
pub use model::frequency_model::{FrequencyModel, FrequencyTrainer};
pub use pipeline::{LanguageModel, TrainingReport};
pub use text::framer::{Dataset, Example};
pub use text::tokenizer::{TokenizerConfig, UnknownPolicy};
pub use text::vocabulary::{Vocabulary, PAD_ID, TokenId};
