use wordlm_core::{FrequencyTrainer, GenerationInput, LanguageModel, Predictor, TokenizerConfig};

// Source text, one training line per line
const CORPUS: &str = "To be, or not to be, that is the question
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
That makes calamity of so long life
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=info shows the pipeline stages, RUST_LOG=debug every generation step
    env_logger::init();

    // Counting back-off model, trained on every core
    let trainer = FrequencyTrainer::default();
    log::info!("Training with {} workers", trainer.workers());

    // Vocabulary, framing and training in one go
    let (model, report) = LanguageModel::train(CORPUS, &trainer, TokenizerConfig::default())?;

    println!("Vocabulary Size: {}", report.vocab_size);
    println!("Total Sequences: {}", report.sequences);
    println!("Max Sequence Length: {}", report.max_sequence_len);
    println!("{}", model.model().summary());
    println!("Training Accuracy: {:.4}", report.accuracy);

    // Continue three seed phrases by four words each
    for seed in ["The slings and", "Or to", "Must give"] {
        let input = GenerationInput::new(seed, 4)?;
        println!("{}", model.generate(&input)?);
    }

    // A word the corpus never used is reported instead of silently dropped
    match model.generate(&GenerationInput::new("Alas poor Yorick", 4)?) {
        Ok(text) => println!("Should not happen: {}", text),
        Err(e) => println!("Cannot continue 'Alas poor Yorick': {}", e),
    }

    Ok(())
}
