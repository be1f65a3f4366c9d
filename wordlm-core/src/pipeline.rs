use std::fmt;
use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::io::{build_output_path, read_corpus};
use crate::model::generation_input::GenerationInput;
use crate::model::generator::Generator;
use crate::model::{Predictor, Trainer};
use crate::text::framer::Dataset;
use crate::text::tokenizer::TokenizerConfig;
use crate::text::vocabulary::Vocabulary;

/// Figures printed after training, in the order the pipeline produces them.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
	/// Distinct words plus padding.
	pub vocab_size: usize,
	/// Number of framed training examples.
	pub sequences: usize,
	/// Context length plus the target.
	pub max_sequence_len: usize,
	/// Share of training examples whose target is the model's argmax.
	pub accuracy: f32,
}

impl fmt::Display for TrainingReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Vocabulary Size: {}", self.vocab_size)?;
		writeln!(f, "Total Sequences: {}", self.sequences)?;
		writeln!(f, "Max Sequence Length: {}", self.max_sequence_len)?;
		write!(f, "Training Accuracy: {:.4}", self.accuracy)
	}
}

/// A trained model bundled with everything needed to use it.
///
/// Holding the tokenizer configuration, the vocabulary and the model
/// together guarantees that generation encodes and pads exactly as
/// training did.
///
/// # Responsibilities
/// - Run the pipeline: vocabulary → framing → training
/// - Generate text from seed phrases
/// - Save and load itself with `postcard`
#[derive(Serialize, Deserialize, Debug)]
pub struct LanguageModel<P> {
	/// SHA-256 (hex) of the training text.
	corpus_digest: String,
	config: TokenizerConfig,
	vocabulary: Vocabulary,
	model: P,
}

impl<P: Predictor> LanguageModel<P> {
	/// Builds the vocabulary of `text`, frames it and trains a model.
	///
	/// # Errors
	/// - `Error::EmptyDataset` if no line has two words or more
	/// - `Error::VocabularyMismatch` / `Error::ContextLength` if the trainer
	///   returns a model shaped differently from the dataset
	pub fn train<T>(text: &str, trainer: &T, config: TokenizerConfig) -> Result<(Self, TrainingReport)>
	where
		T: Trainer<Model = P>,
	{
		let vocabulary = Vocabulary::fit(text, &config);
		info!("Vocabulary built: {} words", vocabulary.len());

		let dataset = Dataset::frame(text, &vocabulary, &config)?;
		let model = trainer.train(&dataset)?;

		if model.vocab_size() != dataset.vocab_size() {
			return Err(Error::VocabularyMismatch { expected: dataset.vocab_size(), actual: model.vocab_size() });
		}
		if model.context_len() != dataset.context_len() {
			return Err(Error::ContextLength { expected: dataset.context_len(), actual: model.context_len() });
		}

		let report = TrainingReport {
			vocab_size: dataset.vocab_size(),
			sequences: dataset.len(),
			max_sequence_len: dataset.max_sequence_len(),
			accuracy: accuracy(&model, &dataset)?,
		};
		info!("Training finished, accuracy {:.4}", report.accuracy);

		Ok((Self { corpus_digest: sha256_hex(text), config, vocabulary, model }, report))
	}

	/// Generates text, see `Generator::generate`.
	pub fn generate(&self, input: &GenerationInput) -> Result<String> {
		Generator::new(&self.model, &self.vocabulary, &self.config)?.generate(input)
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// SHA-256 (hex) of the text the model was trained on.
	pub fn corpus_digest(&self) -> &str {
		&self.corpus_digest
	}

	pub fn config(&self) -> &TokenizerConfig {
		&self.config
	}

	pub fn model(&self) -> &P {
		&self.model
	}

	/// Context length every generation step pads to.
	pub fn context_len(&self) -> usize {
		self.model.context_len()
	}
}

impl<P: Serialize> LanguageModel<P> {
	/// Writes the bundle to `path`.
	pub fn save<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}
}

impl<P: DeserializeOwned> LanguageModel<P> {
	/// Reads a bundle written by `save`.
	pub fn load<Q: AsRef<Path>>(path: Q) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

impl<P: Predictor + Serialize + DeserializeOwned> LanguageModel<P> {
	/// Loads the cached bundle next to `corpus_path` or trains a new one.
	///
	/// - The cache is `<corpus stem>.bin` in the corpus folder
	/// - A cache built from other text (digest mismatch), with another
	///   tokenizer configuration, or that fails to decode, is rebuilt
	/// - A freshly trained bundle is written to the cache
	///
	/// Returns the training report when training happened.
	pub fn from_file<Q, T>(corpus_path: Q, trainer: &T, config: TokenizerConfig) -> Result<(Self, Option<TrainingReport>)>
	where
		Q: AsRef<Path>,
		T: Trainer<Model = P>,
	{
		let text = read_corpus(&corpus_path)?;
		let digest = sha256_hex(&text);

		let binary_data_path = build_output_path(&corpus_path, "bin")?;
		if binary_data_path.exists() {
			match Self::load(&binary_data_path) {
				Ok(cached) if cached.corpus_digest != digest => {
					warn!("Cached model {} is out of date, retraining", binary_data_path.display())
				}
				Ok(cached) if cached.config == config => {
					info!("Loaded cached model {}", binary_data_path.display());
					return Ok((cached, None));
				}
				Ok(_) => warn!("Cached model {} uses another tokenizer, retraining", binary_data_path.display()),
				Err(e) => warn!("Cached model {} unreadable ({e}), retraining", binary_data_path.display()),
			}
		}

		let (model, report) = Self::train(&text, trainer, config)?;
		model.save(&binary_data_path)?;
		info!("Saved model to {}", binary_data_path.display());

		Ok((model, Some(report)))
	}
}

fn sha256_hex(text: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(text.as_bytes());
	hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Share of examples whose target equals the model's argmax prediction.
fn accuracy<P: Predictor>(model: &P, dataset: &Dataset) -> Result<f32> {
	if dataset.is_empty() {
		return Ok(0.0);
	}
	let mut hits = 0;
	for (context, target) in dataset.iter() {
		if model.predict(context)? == target {
			hits += 1;
		}
	}
	Ok(hits as f32 / dataset.len() as f32)
}
