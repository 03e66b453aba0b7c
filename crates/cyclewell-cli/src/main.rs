//! CLI for cyclewell.
//!
//! Ranks meals and activities from local JSON files, records what was
//! consumed, and analyzes suggestion feedback. It is the operational
//! interface around the suggestion engine; nothing here talks to a network.

mod store;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cyclewell_core::{CategoryFilter, ScoredCandidate};
use cyclewell_feedback::{read_outcomes, FeedbackAnalyzer};
use cyclewell_suggest::{EngineConfig, SuggestionEngine, SuggestionQuery, SuggestionService};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use store::FileStore;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing_subscriber::EnvFilter;

const DATA_DIR_ENV: &str = "CYCLEWELL_DATA_DIR";
const CONFIG_ENV: &str = "CYCLEWELL_CONFIG";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank catalog items for the current context
    Suggest {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print only the best suggestion
    Quick {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Record that an item was consumed
    Record {
        #[command(flatten)]
        data: DataArgs,

        /// Catalog id of the consumed item
        #[arg(long)]
        item: String,

        /// RFC 3339 timestamp (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Source tag stored with the event
        #[arg(long, default_value = "cli")]
        source: String,
    },
    /// Analyze suggestion outcomes and propose weight adjustments
    Analyze {
        /// JSONL file with one outcome per line
        #[arg(long)]
        outcomes: PathBuf,

        /// Name of the weight set the outcomes were produced with
        #[arg(long, default_value = "default-weights")]
        policy: String,

        #[arg(long, default_value = "10")]
        min_outcomes: usize,

        #[arg(long, default_value = "0.5")]
        min_confidence: f32,
    },
    /// Print the effective engine configuration
    Weights {
        /// Engine config JSON (default: $CYCLEWELL_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Catalog JSON file (default: <data dir>/catalog.json)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Preferences JSON file (default: <data dir>/preferences.json)
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Consumption history JSONL file (default: <data dir>/history.jsonl)
    #[arg(long)]
    history: Option<PathBuf>,
}

impl DataArgs {
    fn into_store(self, data_dir: &Path) -> FileStore {
        FileStore::new(
            resolve_path(self.catalog, data_dir, "catalog.json"),
            resolve_path(self.prefs, data_dir, "preferences.json"),
            resolve_path(self.history, data_dir, "history.jsonl"),
        )
    }
}

#[derive(Args, Debug, Clone)]
struct QueryArgs {
    /// Active symptom tag (repeatable)
    #[arg(long = "symptom")]
    symptoms: Vec<String>,

    /// Current cycle phase
    #[arg(long)]
    phase: Option<String>,

    /// Hour of day 0-23 (default: local hour)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..24))]
    hour: Option<u8>,

    /// Category, or "auto" / "any"
    #[arg(long, default_value = "auto")]
    category: String,

    /// Maximum preparation time in minutes
    #[arg(long)]
    max_prep: Option<u32>,

    /// Engine config JSON (default: $CYCLEWELL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference time as RFC 3339 (default: now)
    #[arg(long)]
    now: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn data_dir() -> PathBuf {
    env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn resolve_path(flag: Option<PathBuf>, data_dir: &Path, file_name: &str) -> PathBuf {
    flag.unwrap_or_else(|| data_dir.join(file_name))
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn parse_timestamp(value: Option<&str>) -> Result<OffsetDateTime> {
    match value {
        Some(ts) => OffsetDateTime::parse(ts, &Rfc3339)
            .with_context(|| format!("Invalid RFC 3339 timestamp: {ts}")),
        None => Ok(local_now()),
    }
}

fn load_engine(config: Option<PathBuf>) -> Result<SuggestionEngine> {
    let path = config.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let Some(path) = path else {
        return Ok(SuggestionEngine::default());
    };
    let file = File::open(&path)
        .with_context(|| format!("Failed to open engine config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse engine config {}", path.display()))?;
    SuggestionEngine::with_config(config).context("Engine config rejected")
}

fn format_candidate(candidate: &ScoredCandidate) -> String {
    let name = if candidate.item.name.is_empty() {
        "<unnamed>"
    } else {
        candidate.item.name.as_str()
    };
    format!(
        "{}. {}\t{}\tscore {}\t{} min\t{}",
        candidate.rank,
        candidate.item.id,
        name,
        candidate.score,
        candidate.item.prep_time_minutes,
        candidate.item.category
    )
}

fn run_suggest(data: DataArgs, query: QueryArgs, quick: bool) -> Result<()> {
    let store = data.into_store(&data_dir());
    // The service would degrade to an empty list; a wrong path should fail loudly here.
    if !store.catalog_path().exists() {
        anyhow::bail!("Catalog file not found: {}", store.catalog_path().display());
    }
    let engine = load_engine(query.config.clone())?;
    let now = parse_timestamp(query.now.as_deref())?;

    let suggestion_query = SuggestionQuery {
        symptoms: query.symptoms,
        cycle_phase: query.phase,
        hour: query.hour.unwrap_or_else(|| now.hour()),
        category: CategoryFilter::from(query.category),
        max_prep_time: query.max_prep,
    };

    let service = SuggestionService::new(engine, store);
    if quick {
        let best = service.quick(&suggestion_query, now);
        if query.json {
            println!("{}", serde_json::to_string_pretty(&best)?);
        } else {
            match best {
                Some(candidate) => println!("{}", format_candidate(&candidate)),
                None => println!("no suggestion"),
            }
        }
    } else {
        let ranked = service.suggest(&suggestion_query, now);
        if query.json {
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        } else if ranked.is_empty() {
            println!("no suggestion");
        } else {
            for candidate in &ranked {
                println!("{}", format_candidate(candidate));
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Suggest { data, query } => run_suggest(data, query, false)?,
        Commands::Quick { data, query } => run_suggest(data, query, true)?,
        Commands::Record {
            data,
            item,
            at,
            source,
        } => {
            let at = parse_timestamp(at.as_deref())?;
            let store = data.into_store(&data_dir());
            let mut service =
                SuggestionService::new(SuggestionEngine::default(), store).with_source(source);
            service
                .track(&item, at)
                .with_context(|| format!("Failed to record consumption of '{item}'"))?;
            println!(
                "Recorded {} at {} in {}",
                item,
                at.format(&Rfc3339)?,
                service.store().history_path().display()
            );
        }
        Commands::Analyze {
            outcomes,
            policy,
            min_outcomes,
            min_confidence,
        } => {
            let file = File::open(&outcomes)
                .with_context(|| format!("Failed to open outcomes file {}", outcomes.display()))?;
            let outcomes = read_outcomes(BufReader::new(file)).context("Failed to read outcomes")?;
            let analyzer = FeedbackAnalyzer::new(min_outcomes, min_confidence);

            match analyzer.propose_adjustment(&policy, &outcomes) {
                Some(proposal) => println!("{}", serde_json::to_string_pretty(&proposal)?),
                None => println!(
                    "Not enough evidence for a weight adjustment ({} outcomes analyzed).",
                    outcomes.len()
                ),
            }
        }
        Commands::Weights { config } => {
            let engine = load_engine(config)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot()?)?);
        }
    }

    Ok(())
}
