pub mod config;
pub mod connection;
pub mod memory;

pub use config::ConfigCommand;
pub use connection::{CollectionsCommand, TestCommand};
pub use memory::MemoryCommand;
