use std::collections::HashSet;
use std::{env, fs};

use wordlm_core::{
	Decoding, Error, FrequencyModel, FrequencyTrainer, GenerationInput, LanguageModel, Predictor, TokenizerConfig,
	UnknownPolicy,
};

const SOLILOQUY: &str = "To be, or not to be, that is the question
Whether it is nobler in the mind to suffer
The slings and arrows of outrageous fortune
Or to take arms against a sea of troubles
And by opposing end them. To die—to sleep
No more; and by a sleep to say we end
The heart-ache and the thousand natural shocks
That flesh is heir to: 'tis a consummation
Devoutly to be wish'd. To die, to sleep
To sleep, perchance to dream—ay, there's the rub
For in that sleep of death what dreams may come
When we have shuffled off this mortal coil
Must give us pause—there's the respect
That makes calamity of so long life";

fn train() -> LanguageModel<FrequencyModel> {
	let trainer = FrequencyTrainer::default();
	let (model, _) = LanguageModel::train(SOLILOQUY, &trainer, TokenizerConfig::default()).unwrap();
	model
}

#[test]
fn report_counts_words_and_prefixes() {
	let config = TokenizerConfig::default();
	let trainer = FrequencyTrainer::with_workers(2).unwrap();
	let (model, report) = LanguageModel::train(SOLILOQUY, &trainer, config.clone()).unwrap();

	let distinct: HashSet<String> = config.words(SOLILOQUY).into_iter().collect();
	assert_eq!(report.vocab_size, distinct.len() + 1);

	let lengths: Vec<usize> = SOLILOQUY.lines().map(|line| config.words(line).len()).collect();
	let sequences: usize = lengths.iter().map(|k| k.saturating_sub(1)).sum();
	assert_eq!(report.sequences, sequences);
	assert_eq!(report.max_sequence_len, *lengths.iter().max().unwrap());
	assert_eq!(model.context_len() + 1, report.max_sequence_len);
	assert_eq!(model.model().vocab_size(), report.vocab_size);
}

#[test]
fn seeds_continue_their_training_line() {
	let model = train();

	let cases = [
		("The slings and", "The slings and arrows of outrageous fortune"),
		("Or to", "Or to take arms against a"),
		("Must give", "Must give us pause—there's the respect"),
	];
	for (seed, expected) in cases {
		let input = GenerationInput::new(seed, 4).unwrap();
		assert_eq!(model.generate(&input).unwrap(), expected);
	}
}

#[test]
fn argmax_generation_is_deterministic() {
	let model = train();
	let input = GenerationInput::new("to sleep", 12).unwrap();
	let first = model.generate(&input).unwrap();
	for _ in 0..5 {
		assert_eq!(model.generate(&input).unwrap(), first);
	}
}

#[test]
fn sampled_generation_repeats_with_the_same_seed() {
	let model = train();
	let mut input = GenerationInput::new("the", 10).unwrap();
	input.decoding = Decoding::Sample { seed: 2024 };
	assert_eq!(model.generate(&input).unwrap(), model.generate(&input).unwrap());
}

#[test]
fn unknown_seed_word_is_reported() {
	let model = train();
	let mut input = GenerationInput::new("Alas poor Yorick", 2).unwrap();
	assert!(matches!(model.generate(&input), Err(Error::UnknownWord(word)) if word == "alas"));

	input.policy = UnknownPolicy::Skip;
	let text = model.generate(&input).unwrap();
	assert!(text.starts_with("Alas poor Yorick "));
	assert_eq!(text.split(' ').count(), 5);
}

#[test]
fn saved_model_generates_identically() {
	let dir = env::temp_dir().join(format!("wordlm-save-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let path = dir.join("soliloquy.bin");

	let model = train();
	model.save(&path).unwrap();
	let loaded: LanguageModel<FrequencyModel> = LanguageModel::load(&path).unwrap();

	assert_eq!(loaded.vocabulary(), model.vocabulary());
	assert_eq!(loaded.context_len(), model.context_len());
	let input = GenerationInput::new("that", 6).unwrap();
	assert_eq!(loaded.generate(&input).unwrap(), model.generate(&input).unwrap());

	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corpus_file_is_trained_once_then_cached() {
	let dir = env::temp_dir().join(format!("wordlm-cache-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let corpus = dir.join("soliloquy.txt");
	fs::write(&corpus, SOLILOQUY).unwrap();

	let trainer = FrequencyTrainer::with_workers(1).unwrap();
	let (first, report) = LanguageModel::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(report.is_some());
	assert!(dir.join("soliloquy.bin").exists());

	let (second, report) = LanguageModel::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(report.is_none());
	assert_eq!(first.vocabulary(), second.vocabulary());

	let cased = TokenizerConfig { lower: false, ..TokenizerConfig::default() };
	let (third, report) = LanguageModel::from_file(&corpus, &trainer, cased).unwrap();
	assert!(report.is_some());
	assert!(third.vocabulary().id("The").is_some());

	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn edited_corpus_invalidates_the_cache() {
	let dir = env::temp_dir().join(format!("wordlm-stale-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let corpus = dir.join("rhyme.txt");
	fs::write(&corpus, "jack and jill went up the hill").unwrap();

	let trainer = FrequencyTrainer::with_workers(1).unwrap();
	let (first, _) = LanguageModel::<FrequencyModel>::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(first.vocabulary().id("water").is_none());

	fs::write(&corpus, "jack and jill went up the hill\nto fetch a pail of water").unwrap();
	let (second, report) = LanguageModel::<FrequencyModel>::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(report.is_some());
	assert!(second.vocabulary().id("water").is_some());
	assert_ne!(first.corpus_digest(), second.corpus_digest());

	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corrupt_cache_is_rebuilt() {
	let dir = env::temp_dir().join(format!("wordlm-corrupt-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let corpus = dir.join("rhyme.txt");
	fs::write(&corpus, "jack and jill went up the hill").unwrap();
	fs::write(dir.join("rhyme.bin"), [0xff, 0xff, 0xff]).unwrap();

	let trainer = FrequencyTrainer::with_workers(1).unwrap();
	let (model, report) = LanguageModel::<FrequencyModel>::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(report.is_some());
	assert_eq!(model.generate(&GenerationInput::new("jack", 2).unwrap()).unwrap(), "jack and jill");

	// The rewritten cache is readable again
	let (_, report) = LanguageModel::<FrequencyModel>::from_file(&corpus, &trainer, TokenizerConfig::default()).unwrap();
	assert!(report.is_none());

	fs::remove_dir_all(&dir).unwrap();
}
