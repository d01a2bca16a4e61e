//! Zidian CLI
//!
//! Runs the HTTP API and offers local commands for the review queue and the
//! dictionary.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use zidian_core::{
    review_card, seed_sample, select_all_due, select_next_due, Card, FsrsScheduler, Rating,
    Storage,
};
use zidian_server::{AppState, ServerConfig};

/// Zidian - Chinese vocabulary dictionary and review queue
#[derive(Parser)]
#[command(name = "zidian")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chinese vocabulary dictionary with spaced-repetition review")]
struct Cli {
    /// Directory holding zidian.db (overrides ZIDIAN_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides ZIDIAN_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides ZIDIAN_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the next card due for review
    Due {
        /// List every due card instead of only the next one
        #[arg(long)]
        all: bool,
    },

    /// Grade a card (1 = again, 2 = hard, 3 = good, 4 = easy)
    Review {
        card_id: i64,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        rating: u8,
    },

    /// Look up a word with its definitions and examples
    Lookup { word: String },

    /// Insert the sample entry into an empty dictionary
    Seed,

    /// Show card and review statistics
    Stats,
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let json = std::env::var("ZIDIAN_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_ansi(false)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Only the server logs at info by default; local commands stay quiet
    let default_directive = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_directive);

    let config = ServerConfig::from_env()?.with_overrides(cli.data_dir, None, None);

    match cli.command {
        Commands::Serve { host, port } => run_serve(config.with_overrides(None, host, port)),
        Commands::Due { all } => run_due(&config, all),
        Commands::Review { card_id, rating } => run_review(&config, card_id, rating),
        Commands::Lookup { word } => run_lookup(&config, &word),
        Commands::Seed => run_seed(&config),
        Commands::Stats => run_stats(&config),
    }
}

fn open_storage(config: &ServerConfig) -> anyhow::Result<Storage> {
    Ok(Storage::new(config.db_path())?)
}

fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let storage = Arc::new(open_storage(&config)?);
    tracing::info!("Zidian v{} starting", zidian_core::VERSION);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(zidian_server::serve(AppState::new(storage), addr))?;
    Ok(())
}

fn print_card(card: &Card) {
    println!(
        "  #{:<5} entry {:<5} {} {:<10} due {}  S={:.2} D={:.2} reps={} lapses={}",
        card.id,
        card.entry_id,
        card.kind,
        card.state.to_string().yellow(),
        card.due.to_string().cyan(),
        card.stability,
        card.difficulty,
        card.reps,
        card.lapses,
    );
}

fn run_due(config: &ServerConfig, all: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let now = Local::now();

    println!("{}", "=== Due Cards ===".cyan().bold());
    println!();

    if all {
        let mut cards = select_all_due(&storage, &now)?;
        if cards.is_empty() {
            println!("{}", "No cards are due for review.".dimmed());
            return Ok(());
        }
        cards.sort_by(zidian_core::due_order);
        for card in &cards {
            print_card(card);
        }
        println!();
        println!("{}: {}", "Total".white().bold(), cards.len());
    } else {
        match select_next_due(&storage, &now)? {
            Some(card) => print_card(&card),
            None => println!("{}", "No cards are due for review.".dimmed()),
        }
    }

    Ok(())
}

fn run_review(config: &ServerConfig, card_id: i64, rating: u8) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let rating = Rating::try_from(rating).map_err(anyhow::Error::msg)?;
    let scheduler = FsrsScheduler::default();

    let outcome = review_card(&storage, &scheduler, card_id, rating, &Local::now())?;

    println!(
        "{} card #{} rated {}",
        "Reviewed".green().bold(),
        card_id,
        rating.name()
    );
    print_card(&outcome.card);
    println!(
        "{}: {} day(s)",
        "Next interval".white().bold(),
        outcome.card.scheduled_days
    );
    Ok(())
}

fn run_lookup(config: &ServerConfig, word: &str) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let entries = storage.entries_by_word(word)?;

    if entries.is_empty() {
        println!("{} {}", "No entry for".dimmed(), word);
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} {}  (entry #{})",
            entry.word.bold(),
            entry.pinyin.cyan(),
            entry.id
        );
        for (i, definition) in storage.definitions_by_entry(entry.id)?.iter().enumerate() {
            println!(
                "  {}. [{}] {}",
                i + 1,
                definition.part.yellow(),
                definition.definition
            );
            for example in storage.examples_by_definition(definition.id)? {
                println!("       {}", example.sentence.dimmed());
            }
        }
        println!();
    }
    Ok(())
}

fn run_seed(config: &ServerConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    if seed_sample(&storage)? {
        println!("{} sample entry 你 (nǐ)", "Seeded".green().bold());
    } else {
        println!("{}", "Dictionary already has entries; nothing seeded.".dimmed());
    }
    Ok(())
}

fn run_stats(config: &ServerConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.card_stats(Local::now().date_naive())?;

    println!("{}", "=== Zidian Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Dictionary Entries".white().bold(), storage.count_entries()?);
    println!("{}: {}", "Total Cards".white().bold(), stats.total_cards);
    println!("{}: {}", "Due Today".white().bold(), stats.due_today);
    println!("{}: {}", "Total Reviews".white().bold(), stats.total_reviews);

    println!();
    println!("{}", "=== Card States ===".magenta().bold());
    println!("  {:<12} {}", "new", stats.new);
    println!("  {:<12} {}", "learning", stats.learning);
    println!("  {:<12} {}", "review", stats.review);
    println!("  {:<12} {}", "relearning", stats.relearning);

    Ok(())
}
