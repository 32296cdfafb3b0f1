//! Prompt assembly.

use super::types::{Document, Prompt};

const CONTEXT_LABEL: &str = "Here is some relevant context:";
const QUESTION_LABEL: &str = "Based on this information, please answer the following question:";

/// Assembles retrieved documents and a query into a generation prompt.
///
/// Building is pure: the same query and documents always produce the same
/// prompt, with documents in the order they were retrieved.
///
/// ```text
/// Here is some relevant context:
/// <doc 1>
/// <doc 2>
///
/// Based on this information, please answer the following question:
/// <query>
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    max_context_chars: Option<usize>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the context section to roughly `max_chars` characters.
    ///
    /// Documents are kept whole in retrieval order; the first one that would
    /// overflow the budget and everything after it are dropped. The top
    /// document is always included.
    pub fn with_max_context_chars(mut self, max_chars: Option<usize>) -> Self {
        self.max_context_chars = max_chars;
        self
    }

    pub fn build<D: AsRef<Document>>(&self, query: &str, retrieved: &[D]) -> Prompt {
        let context = self.context(retrieved);
        Prompt::new(format!(
            "{}\n{}\n\n{}\n{}",
            CONTEXT_LABEL, context, QUESTION_LABEL, query
        ))
    }

    fn context<D: AsRef<Document>>(&self, retrieved: &[D]) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(retrieved.len());
        let mut used = 0;

        for doc in retrieved {
            let content = doc.as_ref().content.as_str();
            let cost = content.chars().count() + usize::from(!parts.is_empty());

            if let Some(limit) = self.max_context_chars {
                if !parts.is_empty() && used + cost > limit {
                    break;
                }
            }

            used += cost;
            parts.push(content);
        }

        parts.join("\n")
    }
}
