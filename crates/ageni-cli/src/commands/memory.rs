use clap::{Parser, Subcommand};

use ageni::{MemoryManager, MemoryRecord, MessageType};

use crate::error::CliResult;
use crate::output::{OutputFormat, format_timestamp, new_table, truncate_string};

#[derive(Parser)]
pub struct MemoryCommand {
    #[clap(subcommand)]
    pub command: MemorySubcommand,
}

#[derive(Subcommand)]
pub enum MemorySubcommand {
    #[clap(about = "Store a message as a memory of a character or chat")]
    Add(AddArgs),

    #[clap(about = "Find memories relevant to a query")]
    Retrieve(RetrieveArgs),

    #[clap(about = "Summarize what is remembered about a context")]
    Summarize(SummarizeArgs),
}

#[derive(Parser)]
pub struct AddArgs {
    #[clap(help = "Character or chat name")]
    pub context: String,

    #[clap(help = "Message text to remember")]
    pub text: String,

    #[clap(long, default_value = "user", help = "Who said it (user, character)")]
    pub r#type: MessageType,
}

#[derive(Parser)]
pub struct RetrieveArgs {
    #[clap(help = "Character or chat name")]
    pub context: String,

    #[clap(help = "Text to search for")]
    pub query: String,

    #[clap(long, short, help = "Maximum hits to request (default: memory.max_results)")]
    pub limit: Option<usize>,
}

#[derive(Parser)]
pub struct SummarizeArgs {
    #[clap(help = "Character or chat name")]
    pub context: String,
}

impl MemoryCommand {
    pub async fn execute(&self, manager: &MemoryManager, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            MemorySubcommand::Add(args) => Self::add(manager, args, format).await,
            MemorySubcommand::Retrieve(args) => Self::retrieve(manager, args, format).await,
            MemorySubcommand::Summarize(args) => Self::summarize(manager, args, format).await,
        }
    }

    async fn add(manager: &MemoryManager, args: &AddArgs, format: OutputFormat) -> CliResult<()> {
        let id = manager
            .add_memory(&args.text, &args.context, args.r#type)
            .await?;
        let collection = manager.collection_name(&args.context);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "id": id.to_string(),
                    "collection": collection,
                    "keywords": manager.extract_keywords(&args.text),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Memory added to {collection}");
                println!("ID: {id}");
            }
        }

        Ok(())
    }

    async fn retrieve(
        manager: &MemoryManager,
        args: &RetrieveArgs,
        format: OutputFormat,
    ) -> CliResult<()> {
        let memories = manager
            .retrieve_memories(&args.query, &args.context, args.limit)
            .await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&memories)?);
            }
            OutputFormat::Table => {
                if memories.is_empty() {
                    println!("No memories found.");
                    return Ok(());
                }

                println!("{}", memory_table(&memories));
                println!("\nShowing {} memories", memories.len());
            }
        }

        Ok(())
    }

    async fn summarize(
        manager: &MemoryManager,
        args: &SummarizeArgs,
        format: OutputFormat,
    ) -> CliResult<()> {
        let summary = manager.get_context_summary(&args.context).await?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "context": args.context,
                    "summary": summary,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Summary for {}", args.context);
                println!("==============================\n");
                println!("{}", summary.trim());
            }
        }

        Ok(())
    }
}

fn memory_table(memories: &[MemoryRecord]) -> comfy_table::Table {
    let mut table = new_table(["Type", "When", "Text", "Keywords"]);

    for memory in memories {
        table.add_row([
            memory.message_type.to_string(),
            format_timestamp(memory.timestamp),
            truncate_string(&memory.text, 60),
            truncate_string(&memory.keywords.join(", "), 40),
        ]);
    }

    table
}
