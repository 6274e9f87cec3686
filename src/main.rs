use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate text_io;

use anaphrase::{generate, DictionaryIndex, EngineError, Query, SearchResult};

#[derive(Parser)]
#[command(name = "anaphrase", about = "Multi-word anagram search over a frequency-ranked dictionary")]
struct Cli {
    /// Dictionary file: `word<TAB>score` lines or a plain ranked word list
    #[arg(long)]
    dict: Option<PathBuf>,
    /// Prepared index snapshot; loaded if present, written after a --dict build otherwise
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Seed phrase; omit to enter the interactive loop
    #[arg(long)]
    seed: Option<String>,
    /// Minimum letters per word
    #[arg(long, default_value = "3")]
    min_length: usize,
    /// Maximum words per combination
    #[arg(long, default_value = "5")]
    max_words: usize,
    /// Words that may never appear (comma separated)
    #[arg(long, default_value = "")]
    excludes: String,
    /// Tokens the combination must contain (comma separated)
    #[arg(long, default_value = "")]
    includes: String,
    /// Search only the N most common dictionary words
    #[arg(long, default_value = "200000")]
    top_n: usize,
    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_index(cli: &Cli) -> Result<DictionaryIndex, EngineError> {
    if let Some(snapshot) = &cli.snapshot {
        if snapshot.exists() {
            tracing::info!("loading index snapshot from {:?}", snapshot);
            return DictionaryIndex::load_snapshot(snapshot);
        }
    }
    let dict = cli.dict.as_ref().ok_or_else(|| {
        EngineError::invalid_input("dict", "need --dict or an existing --snapshot")
    })?;
    tracing::info!("building index from {:?}", dict);
    let index = DictionaryIndex::load_from_path(dict)?;
    if let Some(snapshot) = &cli.snapshot {
        index.save_snapshot(snapshot)?;
        tracing::info!("index snapshot written to {:?}", snapshot);
    }
    Ok(index)
}

fn print_result(seed: &str, result: &SearchResult, elapsed_ms: u128, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("failed to encode result: {}", e),
        }
        return;
    }
    println!(
        "{} anagrams, {} partials in {}.{:03}s for \"{}\"{}",
        result.anagrams.len(),
        result.partials.len(),
        elapsed_ms / 1000,
        elapsed_ms % 1000,
        seed,
        if result.complete { "" } else { " (incomplete)" },
    );
    for anagram in &result.anagrams {
        println!("{}", anagram);
    }
    if !result.partials.is_empty() {
        println!("--- partials ---");
        for partial in &result.partials {
            println!("{}", partial);
        }
    }
}

fn run_query(index: &DictionaryIndex, cli: &Cli, seed: &str) {
    let query = Query {
        seed: seed.to_string(),
        min_word_length: cli.min_length,
        max_words: cli.max_words,
        excludes: cli.excludes.clone(),
        includes: cli.includes.clone(),
        top_n: cli.top_n,
    };
    let start = Instant::now();
    match generate(index, &query) {
        Ok(result) => print_result(seed, &result, start.elapsed().as_millis(), cli.json),
        Err(e) => eprintln!("{}", e),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let index = match load_index(&cli) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("dictionary ready: {} words", index.len());

    if let Some(seed) = &cli.seed {
        run_query(&index, &cli, seed);
        return;
    }

    // interactive loop; empty seed exits
    loop {
        println!("Enter seed:");
        let seed: String = read!("{}\n");
        let seed = seed.trim().to_string();
        if seed.is_empty() {
            break;
        }
        run_query(&index, &cli, &seed);
    }
}
