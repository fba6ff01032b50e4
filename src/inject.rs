//! Prompt injection of memory context into outgoing messages

use crate::error::{Error, Result};
use crate::message::{ChatMessage, Role};

/// Opening delimiter of the injected memory block
pub const PROMPT_BLOCK_OPEN: &str = "--# ADDITIONAL INFO #--";

/// Closing delimiter of the injected memory block
pub const PROMPT_BLOCK_CLOSE: &str = "--# DONE #--";

/// Build the delimited block that carries the memory context, followed by
/// optional extra instruction text.
pub fn build_prompt_block(context: &str, additional_prompt: Option<&str>) -> String {
    let extra = additional_prompt.unwrap_or("");
    format!("\n{PROMPT_BLOCK_OPEN}\n{context}\n{extra}\n{PROMPT_BLOCK_CLOSE}\n")
}

/// Merge a memory context into an outgoing message sequence.
///
/// Returns a new sequence; the input is never mutated, reordered, or
/// shortened. An empty context returns the input as-is. With a context, the
/// delimited block is appended to an existing leading system message, or
/// inserted (trimmed) as a new leading system message.
pub fn inject_context(
    messages: &[ChatMessage],
    context: &str,
    additional_prompt: Option<&str>,
) -> Vec<ChatMessage> {
    if context.is_empty() {
        return messages.to_vec();
    }

    let block = build_prompt_block(context, additional_prompt);
    let mut out = messages.to_vec();

    match out.first_mut() {
        Some(first) if first.role == Role::System => {
            first.content.push_str(&block);
        }
        _ => {
            out.insert(0, ChatMessage::system(block.trim().to_string()));
        }
    }

    out
}

/// Token counter used to enforce the memory context budget.
pub struct TokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

impl TokenCounter {
    /// Create a new token counter for a specific model
    pub fn new(model: &str) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| Error::config(format!("Failed to load tokenizer for {}: {}", model, e)))?;

        Ok(Self { bpe })
    }

    /// Count tokens in a text
    pub fn count(&self, text: &str) -> u32 {
        self.bpe.encode_with_special_tokens(text).len() as u32
    }

    /// Trim a text to at most `max_tokens` tokens.
    ///
    /// Falls back to a character-based cut if the truncated token sequence
    /// does not decode cleanly.
    pub fn trim(&self, text: &str, max_tokens: u32) -> String {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() as u32 <= max_tokens {
            return text.to_string();
        }
        let truncated = tokens[..max_tokens as usize].to_vec();
        self.bpe
            .decode(truncated)
            .unwrap_or_else(|_| text.chars().take(max_tokens as usize * 4).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_returns_input_unchanged() {
        let messages = vec![ChatMessage::user("Hi")];
        let out = inject_context(&messages, "", None);
        assert_eq!(out, messages);
    }

    #[test]
    fn context_without_system_message_inserts_leading_system() {
        let messages = vec![ChatMessage::user("Hi")];
        let out = inject_context(&messages, "name: John", None);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, Role::System);
        assert!(out[0].content.contains("name: John"));
        assert!(out[0].content.starts_with(PROMPT_BLOCK_OPEN));
        assert!(out[0].content.ends_with(PROMPT_BLOCK_CLOSE));
        assert_eq!(out[1], messages[0]);
    }

    #[test]
    fn context_appends_to_existing_system_message() {
        let messages = vec![ChatMessage::system("Be concise."), ChatMessage::user("Hi")];
        let out = inject_context(&messages, "name: John", None);

        assert_eq!(out.len(), 2);
        assert!(out[0].content.starts_with("Be concise."));
        assert!(out[0].content.contains(PROMPT_BLOCK_OPEN));
        assert!(out[0].content.contains("name: John"));
        // Input sequence untouched
        assert_eq!(messages[0].content, "Be concise.");
    }

    #[test]
    fn additional_prompt_lands_inside_the_block() {
        let block = build_prompt_block("likes rust", Some("Answer briefly."));
        let open = block.find(PROMPT_BLOCK_OPEN).unwrap();
        let ctx = block.find("likes rust").unwrap();
        let extra = block.find("Answer briefly.").unwrap();
        let close = block.find(PROMPT_BLOCK_CLOSE).unwrap();
        assert!(open < ctx && ctx < extra && extra < close);
    }

    #[test]
    fn trim_bounds_token_count() {
        let counter = TokenCounter::new("gpt-4").unwrap();
        let long: String = "memory entry about the user. ".repeat(200);
        let trimmed = counter.trim(&long, 50);
        assert!(counter.count(&trimmed) <= 50);

        let short = "name: John";
        assert_eq!(counter.trim(short, 50), short);
    }
}
