//! Keyword tagging for memory records
//!
//! A deliberately naive heuristic: every trigger word that appears anywhere in
//! the lower-cased text (substring match, so `"i"` also hits `"this"`) yields a
//! `<category>_<word>` tag. Tags come out in category order, then trigger
//! order, and are not deduplicated.

/// One named group of trigger words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCategory {
    pub name: String,
    pub triggers: Vec<String>,
}

/// Ordered, immutable set of keyword categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTaxonomy {
    categories: Vec<KeywordCategory>,
}

impl KeywordTaxonomy {
    /// Build a taxonomy from `(category, triggers)` pairs, keeping their order.
    ///
    /// Triggers are lower-cased so that matching stays case-insensitive.
    pub fn new<C, W>(categories: impl IntoIterator<Item = (C, Vec<W>)>) -> Self
    where
        C: Into<String>,
        W: AsRef<str>,
    {
        let categories = categories
            .into_iter()
            .map(|(name, words)| KeywordCategory {
                name: name.into(),
                triggers: words.iter().map(|w| w.as_ref().to_lowercase()).collect(),
            })
            .collect();

        Self { categories }
    }

    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    /// Tag `text` with every matching `<category>_<word>` pair
    pub fn extract(&self, text: &str) -> Vec<String> {
        let text_lower = text.to_lowercase();

        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .triggers
                    .iter()
                    .filter(|word| text_lower.contains(word.as_str()))
                    .map(move |word| format!("{}_{}", category.name, word))
            })
            .collect()
    }
}

impl Default for KeywordTaxonomy {
    fn default() -> Self {
        Self::new([
            ("user", vec!["user", "i", "me", "my", "mine"]),
            ("character", vec!["you", "your", "yours", "character"]),
            (
                "emotional",
                vec!["feel", "emotion", "sad", "happy", "angry", "excited"],
            ),
            (
                "important",
                vec!["important", "crucial", "critical", "key", "essential"],
            ),
            (
                "context",
                vec!["context", "background", "setting", "situation", "scenario"],
            ),
            (
                "personal",
                vec!["name", "age", "location", "job", "hobby", "interest"],
            ),
        ])
    }
}
