use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use argonaut::config::EngineConfig;
use argonaut::embeddings::OnnxEmbedder;
use argonaut::engine::{answer_query, AnswerEngine, EngineContext};
use argonaut::index::DocumentIndex;
use argonaut::seed;
use argonaut::store::MeasurementStore;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Grounded Q&A over ARGO float measurements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about the dataset
    Ask {
        /// The question, in plain English
        question: String,

        /// Also print the evidence behind the answer
        #[arg(short, long)]
        evidence: bool,
    },

    /// Seed the database and index with a synthetic deployment
    Seed {
        /// Number of days of profiles to generate
        #[arg(long, default_value_t = 11)]
        days: u32,
    },

    /// Show dataset and index status
    Status,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { question, evidence } => ask(&question, evidence),
        Commands::Seed { days } => seed_command(days),
        Commands::Status => status(),
    }
}

fn ask(question: &str, evidence: bool) -> Result<()> {
    let answer = answer_query(question);
    println!("{}", answer.answer);

    if evidence {
        if !answer.sql_results.is_empty() {
            println!("\n{}", "Query results:".bold());
            for row in &answer.sql_results {
                println!("  {}", serde_json::to_string(row)?);
            }
        }
        if !answer.context_documents.is_empty() {
            println!("\n{}", "Context documents:".bold());
            for doc in &answer.context_documents {
                println!("  - {}", doc.dimmed());
            }
        }
    }
    Ok(())
}

fn seed_command(days: u32) -> Result<()> {
    let config = EngineConfig::load()?;
    let store = MeasurementStore::open(config.measurements_db())?;

    let inserted = seed::seed_store(&store, days)?;
    println!(
        "{} {} measurements into {}",
        "Seeded".green().bold(),
        inserted,
        config.measurements_db().display()
    );

    let index = DocumentIndex::open(config.index_dir(), config.embedding_dimensions)?;
    let mut embedder = OnnxEmbedder::open(&config.model_dir())
        .context("Failed to load embedding model; seeding indexed nothing")?;
    let indexed = seed::build_index(&store, &index, &mut embedder)?;
    println!(
        "{} {} documents into {}",
        "Indexed".green().bold(),
        indexed,
        config.index_dir().display()
    );
    Ok(())
}

fn status() -> Result<()> {
    let config = EngineConfig::load()?;
    let context = EngineContext::initialize(config.clone())?;
    let engine = AnswerEngine::new(context)?;
    let coverage = engine.coverage();

    println!("{}", "Dataset".bold());
    println!("  Measurements: {}", coverage.measurements);
    println!("  Floats:       {}", coverage.floats);
    match coverage.date_range() {
        Some(range) => println!("  Coverage:     {}", range),
        None => println!("  Coverage:     {}", "empty".yellow()),
    }
    println!("{}", "Engine".bold());
    println!("  Model:        {}", config.embedding_model);
    println!("  Data dir:     {}", config.data_dir.display());
    Ok(())
}
