use rs_nage_core::{GeneratorConfig, MarkovChainGenerator};

const CORPUS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/towns.txt");
const CACHE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/towns.bin");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=info (or debug) to see training and cache activity
    env_logger::init();

    // Order 3: up to three previous letters are used to pick the next one.
    // Generated words are capped at 12 letters
    let mut config = GeneratorConfig::new(3)?;
    config.set_max_length(12)?;
    let mut generator = MarkovChainGenerator::with_config(config)?;

    // Load the cache if it exists, otherwise train from the corpus and write it.
    // The cache is never refreshed: delete towns.bin after editing towns.txt
    let source = generator.load_cache_or_compute(CACHE, CORPUS)?;
    log::info!("Model ready from {:?}", source);

    // Filtering and retrying belong to the caller: here, keep words of at
    // least 4 letters and capitalize them
    let mut printed = 0;
    for _ in 0..1000 {
        if printed == 10 {
            break;
        }
        let word = generator.generate();
        if word.chars().count() < 4 {
            continue;
        }
        let mut chars = word.chars();
        let name: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => continue,
        };
        printed += 1;
        println!("Generated word {}: {}", printed, name);
    }

    Ok(())
}
