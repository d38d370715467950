use clap::{Parser, Subcommand};
use serde_json::Value;

use ageni::AgeniError;
use ageni::config::{CollectionType, ConfigStore};

use crate::error::CliResult;
use crate::output::{OutputFormat, new_table};

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show current configuration")]
    Show,

    #[clap(about = "Print a single value by dotted key (e.g. memory.vector_size)")]
    Get(GetArgs),

    #[clap(about = "Set a value by dotted key and save")]
    Set(SetArgs),

    #[clap(about = "Store API keys and the vector store address")]
    Setup(SetupArgs),
}

#[derive(Parser)]
pub struct GetArgs {
    #[clap(help = "Dotted configuration key")]
    pub key: String,
}

#[derive(Parser)]
pub struct SetArgs {
    #[clap(help = "Dotted configuration key")]
    pub key: String,

    #[clap(help = "New value, parsed as JSON when possible (768, true, null, ...)")]
    pub value: String,
}

#[derive(Parser)]
pub struct SetupArgs {
    #[clap(long, help = "OpenRouter API key")]
    pub api_key: String,

    #[clap(long, default_value = "localhost", help = "Qdrant host")]
    pub host: String,

    #[clap(long, default_value = "6333", help = "Qdrant port")]
    pub port: String,

    #[clap(long, help = "Qdrant API key, if the server requires one (omit or leave blank to clear)")]
    pub qdrant_api_key: Option<String>,

    #[clap(long, help = "Collection scope (character, chat)")]
    pub collection_type: Option<CollectionType>,
}

impl ConfigCommand {
    pub async fn execute(&self, store: &mut ConfigStore, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ConfigSubcommand::Show => Self::show(store, format),
            ConfigSubcommand::Get(args) => Self::get(store, args, format),
            ConfigSubcommand::Set(args) => Self::set(store, args, format),
            ConfigSubcommand::Setup(args) => Self::setup(store, args, format),
        }
    }

    fn show(store: &ConfigStore, format: OutputFormat) -> CliResult<()> {
        let config = store.config();

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Table => {
                println!("Configuration from: {}", store.path().display());
                println!("==============================\n");

                println!("[Qdrant]");
                let mut qdrant_table = new_table(["Setting", "Value"]);
                qdrant_table.add_row(["host", config.qdrant.host.as_deref().unwrap_or("(not set)")]);
                qdrant_table.add_row([
                    "port",
                    &config
                        .qdrant
                        .port
                        .map_or_else(|| "(not set)".to_string(), |p| p.to_string()),
                ]);
                qdrant_table.add_row(["api_key", &mask_secret(config.qdrant.api_key.as_deref())]);
                qdrant_table.add_row(["timeout_secs", &config.qdrant.timeout_secs.to_string()]);
                println!("{qdrant_table}\n");

                println!("[OpenRouter]");
                let mut openrouter_table = new_table(["Setting", "Value"]);
                openrouter_table.add_row([
                    "api_key",
                    &mask_secret(config.openrouter.api_key.as_deref()),
                ]);
                openrouter_table.add_row(["model", &config.openrouter.model]);
                openrouter_table.add_row(["base_url", &config.openrouter.base_url]);
                openrouter_table.add_row([
                    "timeout_secs",
                    &config.openrouter.timeout_secs.to_string(),
                ]);
                println!("{openrouter_table}\n");

                println!("[Memory]");
                let mut memory_table = new_table(["Setting", "Value"]);
                memory_table.add_row([
                    "collection_type",
                    &config.memory.collection_type.to_string(),
                ]);
                memory_table.add_row(["embedding_model", &config.memory.embedding_model]);
                memory_table.add_row(["vector_size", &config.memory.vector_size.to_string()]);
                memory_table.add_row([
                    "similarity_threshold",
                    &config.memory.similarity_threshold.to_string(),
                ]);
                memory_table.add_row(["max_results", &config.memory.max_results.to_string()]);
                println!("{memory_table}\n");

                println!("[General]");
                let mut general_table = new_table(["Setting", "Value"]);
                general_table.add_row(["enabled", &config.general.enabled.to_string()]);
                general_table.add_row(["debug", &config.general.debug.to_string()]);
                println!("{general_table}\n");

                if store.is_complete() {
                    println!("Status: configured");
                } else {
                    println!("Status: incomplete (run `ageni config setup`)");
                }
            }
        }

        Ok(())
    }

    fn get(store: &ConfigStore, args: &GetArgs, format: OutputFormat) -> CliResult<()> {
        let value = store.get_value(&args.key);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "key": args.key,
                    "value": value,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => match value {
                Some(Value::String(s)) => println!("{s}"),
                Some(other) => println!("{other}"),
                None => println!("(not set)"),
            },
        }

        Ok(())
    }

    fn set(store: &mut ConfigStore, args: &SetArgs, format: OutputFormat) -> CliResult<()> {
        let value = parse_value(&args.value);
        store.set(&args.key, value.clone())?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "key": args.key,
                    "value": value,
                    "saved_to": store.path().display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Set {} = {}", args.key, value);
            }
        }

        Ok(())
    }

    fn setup(store: &mut ConfigStore, args: &SetupArgs, format: OutputFormat) -> CliResult<()> {
        let port = validate_setup(args)?;

        store.set("openrouter.api_key", args.api_key.trim())?;
        store.set("qdrant.host", args.host.trim())?;
        store.set("qdrant.port", port)?;
        store.set("qdrant.api_key", optional_secret(args.qdrant_api_key.as_deref()))?;
        if let Some(collection_type) = args.collection_type {
            store.set("memory.collection_type", collection_type.to_string())?;
        }

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "saved_to": store.path().display().to_string(),
                    "complete": store.is_complete(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Configuration saved to {}", store.path().display());
            }
        }

        Ok(())
    }
}

/// Interpret a command-line value as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Check setup input and return the parsed port
fn validate_setup(args: &SetupArgs) -> Result<u16, AgeniError> {
    if args.api_key.trim().is_empty() {
        return Err(AgeniError::Validation("OpenRouter API key is required".to_string()));
    }
    if args.host.trim().is_empty() {
        return Err(AgeniError::Validation("Qdrant host is required".to_string()));
    }

    match args.port.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(AgeniError::Validation(format!(
            "Invalid port '{}': must be a number between 1 and 65535",
            args.port
        ))),
    }
}

/// Trimmed secret, or `null` when missing or blank
fn optional_secret(secret: Option<&str>) -> Value {
    match secret.map(str::trim) {
        Some(s) if !s.is_empty() => Value::String(s.to_string()),
        _ => Value::Null,
    }
}

fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "********".to_string(),
        Some(s) => {
            let head: String = s.chars().take(4).collect();
            format!("{head}********")
        }
    }
}
