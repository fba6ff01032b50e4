//! Chat message and exchange types

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender
    pub role: Role,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request
///
/// `user_id` and `max_context_tokens` belong to the memory layer and are
/// stripped before the request reaches the underlying client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to run the completion against
    pub model: String,

    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Raw identifier of the user whose memory should augment this call.
    /// Omitting it reproduces the unwrapped call exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Per-call override of the memory context token budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_context_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            user_id: None,
            max_context_tokens: None,
        }
    }

    /// Attach a user identifier, enabling the memory pipeline for this call
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Override the memory context token budget for this call
    pub fn with_max_context_tokens(mut self, tokens: u32) -> Self {
        self.max_context_tokens = Some(tokens);
        self
    }

    /// Copy of this request with the memory-layer arguments removed,
    /// suitable for handing to the underlying client.
    pub fn sanitized(&self) -> Self {
        let mut req = self.clone();
        req.user_id = None;
        req.max_context_tokens = None;
        req
    }

    /// The last message, if any
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// A non-streaming chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model that produced the completion
    pub model: String,

    /// Assistant reply text
    pub content: String,

    /// When the completion was created
    pub created: DateTime<Utc>,
}

impl ChatResponse {
    /// Create a new response
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            created: Utc::now(),
        }
    }
}

/// One incrementally delivered piece of a streamed completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Role announced by the chunk (usually only on the first one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Incremental content delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,

    /// Whether this is the final chunk of the stream
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    /// Create a content delta chunk
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            role: None,
            delta: Some(content.into()),
            done: false,
        }
    }

    /// Create the terminal chunk
    pub fn finished() -> Self {
        Self {
            role: None,
            delta: None,
            done: true,
        }
    }

    /// The content delta, if non-empty
    pub fn content(&self) -> Option<&str> {
        self.delta.as_deref().filter(|s| !s.is_empty())
    }
}

/// A stream of completion chunks as produced by the underlying client
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// One user turn paired with the assistant reply it produced.
/// The atomic unit handed to the memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    /// The user message that initiated the call
    pub user: ChatMessage,

    /// The full assistant reply
    pub assistant: ChatMessage,

    /// When the exchange completed
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Create a new exchange from the user query and assistant reply text
    pub fn new(user_content: impl Into<String>, assistant_content: impl Into<String>) -> Self {
        Self {
            user: ChatMessage::user(user_content),
            assistant: ChatMessage::assistant(assistant_content),
            created_at: Utc::now(),
        }
    }

    /// The two messages in conversation order
    pub fn messages(&self) -> [&ChatMessage; 2] {
        [&self.user, &self.assistant]
    }
}
