//! The chat completion seam

use async_trait::async_trait;

use crate::error::Result;
use crate::message::{ChatRequest, ChatResponse, ChunkStream};

/// A client capable of running chat completions.
///
/// This is the capability the memory layer wraps: the augmented variant
/// composes an unwrapped implementation by explicit delegation, so the
/// caller-facing contract is identical on both sides of the wrap.
#[async_trait]
pub trait ChatCompletion: Send + Sync + 'static {
    /// Run a blocking completion
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Run a streaming completion
    async fn complete_stream(&self, request: ChatRequest) -> Result<ChunkStream>;

    /// Whether this client already has a memory layer attached.
    ///
    /// Patch marker: set once by the wrapper type, never by plain clients.
    /// `patch` consults it so re-patching a patched client is a no-op.
    fn is_memory_augmented(&self) -> bool {
        false
    }
}
