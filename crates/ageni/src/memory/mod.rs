//! Memory types and operations
//!
//! Defines the stored memory record, keyword tagging, and the manager that
//! ties the model provider and the vector store together.

pub mod keywords;
pub mod manager;
pub mod prompts;
pub mod types;

pub use keywords::{KeywordCategory, KeywordTaxonomy};
pub use manager::{ConnectionReport, MemoryManager};
pub use types::{MEMORY_SOURCE, MemoryRecord, MessageType};
