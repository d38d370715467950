use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ageni::MemoryManager;
use ageni::config::{ConfigStore, default_config_path};
use ageni_cli::commands::{CollectionsCommand, ConfigCommand, MemoryCommand, TestCommand};
use ageni_cli::error::CliResult;
use ageni_cli::output::OutputFormat;

#[derive(Parser)]
#[command(name = "ageni")]
#[command(about = "Ageni - long-term memory for character chat, backed by Qdrant and OpenRouter")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),

    #[clap(about = "Memory commands")]
    Memory(MemoryCommand),

    #[clap(about = "List vector store collections")]
    Collections(CollectionsCommand),

    #[clap(about = "Check the embedding provider and the vector store")]
    Test(TestCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut store = ConfigStore::load(config_path);

    init_logging(store.config().general.debug);
    debug!("Using config file {}", store.path().display());

    match &cli.command {
        Command::Config(cmd) => cmd.execute(&mut store, format).await,
        Command::Memory(cmd) => cmd.execute(&manager(&store)?, format).await,
        Command::Collections(cmd) => cmd.execute(&manager(&store)?, format).await,
        Command::Test(cmd) => cmd.execute(&manager(&store)?, format).await,
    }
}

fn manager(store: &ConfigStore) -> CliResult<MemoryManager> {
    Ok(MemoryManager::new(store.config())?)
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "debug,ageni=debug"
    } else {
        "warn,ageni=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
