//! Configuration for the memory augmentation layer

/// What to do when the memory store cannot be reached during context fetch.
///
/// Persistence failures are always swallowed and logged; this policy only
/// governs the fetch that sits on the caller's critical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFailurePolicy {
    /// Surface the failure to the caller as `Error::StoreUnavailable`.
    Surface,

    /// Degrade to an empty context and continue the call without memory.
    EmptyContext,
}

/// Configuration for a memory-augmented client
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Maximum size of the injected memory context, in model tokens
    pub max_context_tokens: u32,

    /// Extra instruction text appended after the context inside the
    /// injected block (e.g. "answer in the user's language")
    pub additional_prompt: Option<String>,

    /// Behavior when the context fetch cannot reach the store
    pub context_failure_policy: ContextFailurePolicy,

    /// Upper bound on concurrently running background persistence tasks
    pub max_concurrent_persists: usize,

    /// Model name used to select the tokenizer for context trimming
    pub token_model: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 1000,
            additional_prompt: None,
            context_failure_policy: ContextFailurePolicy::Surface,
            max_concurrent_persists: 8,
            token_model: "gpt-4".to_string(),
        }
    }
}

impl MemoryConfig {
    /// Set the context token budget
    pub fn with_max_context_tokens(mut self, tokens: u32) -> Self {
        self.max_context_tokens = tokens;
        self
    }

    /// Set the extra instruction text included in the injected block
    pub fn with_additional_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.additional_prompt = Some(prompt.into());
        self
    }

    /// Set the context-fetch failure policy
    pub fn with_context_failure_policy(mut self, policy: ContextFailurePolicy) -> Self {
        self.context_failure_policy = policy;
        self
    }

    /// Set the persistence concurrency bound
    pub fn with_max_concurrent_persists(mut self, n: usize) -> Self {
        self.max_concurrent_persists = n;
        self
    }
}
