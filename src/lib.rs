//! # memwrap
//!
//! A memory-augmentation layer for chat completion clients.
//!
//! memwrap sits between an application and a chat-completion API and gives
//! an otherwise stateless completion call a durable, per-user long-term
//! memory without changing the call's contract: same inputs (plus one
//! optional user identifier), same output shape, same approximate latency,
//! blocking and streamed responses both supported.
//!
//! ## Architecture
//!
//! Per call, the wrapper:
//! - derives a canonical user id from the caller-supplied string
//! - fetches a token-bounded memory context from the memory store
//! - injects it into the outgoing prompt's system message
//! - forwards the call to the unmodified client
//! - captures the exchange (pass-through for streams) and persists it in
//!   the background, off the caller's latency path
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memwrap::{patch, HttpMemoryStore, MemoryConfig, ChatRequest, ChatMessage};
//!
//! let store = Arc::new(HttpMemoryStore::new("https://memory.example.com", api_key));
//! let client = patch(client, store, MemoryConfig::default())?;
//!
//! // Memory-augmented call
//! let request = ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")])
//!     .with_user_id("alice@example.com");
//! let response = client.complete(request).await?;
//!
//! // Without a user id the call behaves exactly like the unwrapped client
//! let request = ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]);
//! let response = client.complete(request).await?;
//! ```

pub mod augment;
pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod inject;
pub mod message;
pub mod persist;
pub mod store;

pub use augment::{patch, MemoryAugmented};
pub use client::ChatCompletion;
pub use config::{ContextFailurePolicy, MemoryConfig};
pub use error::{Error, Result};
pub use identity::CanonicalUserId;
pub use message::{ChatMessage, ChatRequest, ChatResponse, ChunkStream, Exchange, Role, StreamChunk};
pub use store::{HttpMemoryStore, MemoryStore, ProfileEntry, UserHandle};
