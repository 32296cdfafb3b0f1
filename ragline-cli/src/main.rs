use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ragline_core::{corpus, Answer, Config, RagPipeline};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Answer questions over a small corpus with retrieval-augmented generation", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Answer a single question")]
    Ask {
        #[arg(help = "The question to answer")]
        query: String,

        #[arg(short, help = "Number of documents to retrieve (defaults to rag.top_k)")]
        k: Option<usize>,
    },

    #[command(about = "Answer questions read from stdin until 'exit'")]
    Chat {
        #[arg(short, help = "Number of documents to retrieve (defaults to rag.top_k)")]
        k: Option<usize>,
    },

    #[command(about = "Show the effective configuration")]
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Ask { query, k } => {
            let pipeline = build_pipeline(&config).await?;
            let answer = answer(&pipeline, &query, k).await?;
            print_answer(&answer);
            Ok(())
        }
        Commands::Chat { k } => chat(&config, k).await,
        Commands::Config => show_config(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ragline_core=debug" } else { "ragline_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

async fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let documents = corpus::load_configured(&config.corpus)
        .await
        .context("Failed to load corpus")?;

    let mut pipeline = RagPipeline::from_config(config).context("Failed to create providers")?;

    eprintln!("{} Building vector index over {} documents...", "→".blue(), documents.len());
    pipeline
        .build(documents)
        .await
        .context("Failed to build vector index")?;

    Ok(pipeline)
}

async fn answer(pipeline: &RagPipeline, query: &str, k: Option<usize>) -> Result<Answer> {
    let k = k.unwrap_or(pipeline.options().top_k);
    eprintln!("{} Retrieving context and generating answer...", "→".blue());
    pipeline
        .answer_with_k(query, k)
        .await
        .context("Failed to answer question")
}

fn print_answer(answer: &Answer) {
    println!();
    println!("{}", "==== Answer ====".bold().green());
    println!("{}", answer.text);
    println!();
    println!("{}", "Sources:".bold());
    for (rank, source) in answer.sources.iter().enumerate() {
        println!(
            "  {} [{}] {} {}",
            "•".cyan(),
            rank + 1,
            source.document.content,
            format!("(distance {:.4})", source.distance).dimmed()
        );
    }
}

async fn chat(config: &Config, k: Option<usize>) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let stdin = io::stdin();

    loop {
        print!("{} ", "Enter your question:".bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).context("Failed to read stdin")? == 0 {
            break;
        }

        let query = input.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        match answer(&pipeline, query, k).await {
            Ok(answer) => print_answer(&answer),
            Err(e) => eprintln!("{} {:#}", "✗".red().bold(), e),
        }
        println!();
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let mut shown = config.resolved();
    if shown.llm.api_key.is_some() {
        shown.llm.api_key = Some("********".to_string());
    }

    let yaml = serde_yaml::to_string(&shown).context("Failed to serialize config")?;
    println!("{}", "Current Configuration:".bold().green());
    println!();
    print!("{}", yaml);

    Ok(())
}
