//! Fixed prompts and messages used by context summaries

/// Query embedded to pull a broad sample of a context's memories
pub const SUMMARY_QUERY: &str = "Get me all the important details about this context.";

/// Instruction placed before the memory texts in the summary prompt
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following memories:\n\n";

/// Returned instead of a summary when the context has no collection yet
pub const NO_MEMORIES_MESSAGE: &str = "No memories found for this context.";

/// Hits requested from the vector store for a summary (no threshold applied)
pub const SUMMARY_SEARCH_LIMIT: usize = 20;

/// Memory texts actually included in the summary prompt
pub const SUMMARY_MEMORY_COUNT: usize = 10;

/// Token budget for the generated summary
pub const SUMMARY_MAX_TOKENS: u32 = 200;

/// Build the summary prompt from memory texts in ranking order
pub fn summary_prompt<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let body = texts
        .into_iter()
        .take(SUMMARY_MEMORY_COUNT)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{SUMMARY_INSTRUCTION}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_joins_texts() {
        let prompt = summary_prompt(["Alice likes tea", "Alice lives in Oslo"]);
        assert_eq!(
            prompt,
            "Summarize the following memories:\n\nAlice likes tea\nAlice lives in Oslo"
        );
    }

    #[test]
    fn test_summary_prompt_caps_memory_count() {
        let texts: Vec<String> = (0..15).map(|i| format!("memory {i}")).collect();
        let prompt = summary_prompt(texts.iter().map(String::as_str));

        assert!(prompt.contains("memory 9"));
        assert!(!prompt.contains("memory 10"));
        assert_eq!(prompt.lines().filter(|l| l.starts_with("memory")).count(), 10);
    }

    #[test]
    fn test_summary_prompt_without_memories() {
        assert_eq!(summary_prompt([]), SUMMARY_INSTRUCTION);
    }
}
