use clap::Parser;

use ageni::MemoryManager;

use crate::error::CliResult;
use crate::output::{OutputFormat, new_table};

#[derive(Parser)]
pub struct CollectionsCommand {}

impl CollectionsCommand {
    pub async fn execute(&self, manager: &MemoryManager, format: OutputFormat) -> CliResult<()> {
        let mut collections = manager.list_collections().await?;
        collections.sort();

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&collections)?);
            }
            OutputFormat::Table => {
                if collections.is_empty() {
                    println!("No collections found.");
                    return Ok(());
                }

                let mut table = new_table(["Collection"]);
                for name in &collections {
                    table.add_row([name]);
                }
                println!("{table}");
                println!("\n{} collections", collections.len());
            }
        }

        Ok(())
    }
}

#[derive(Parser)]
pub struct TestCommand {}

impl TestCommand {
    pub async fn execute(&self, manager: &MemoryManager, format: OutputFormat) -> CliResult<()> {
        let report = manager.test_connection().await?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "provider": report.provider,
                    "embedding_dimension": report.embedding_dimension,
                    "collections": report.collections,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let expected = manager.config().memory.vector_size;

                println!("Connection test successful!");
                println!("==============================\n");

                let mut table = new_table(["Check", "Result"]);
                table.add_row(["Provider", report.provider]);
                table.add_row(["Embedding dimension", &report.embedding_dimension.to_string()]);
                table.add_row(["Collections found", &report.collections.len().to_string()]);
                println!("{table}");

                if report.embedding_dimension != expected {
                    println!(
                        "\nWarning: memory.vector_size is {expected} but the embedding model returned {}",
                        report.embedding_dimension
                    );
                }
            }
        }

        Ok(())
    }
}
