//! The memory-augmented completion wrapper

use std::sync::Arc;

use async_trait::async_trait;

use crate::capture::CaptureStream;
use crate::client::ChatCompletion;
use crate::config::{ContextFailurePolicy, MemoryConfig};
use crate::error::Result;
use crate::identity::CanonicalUserId;
use crate::inject::{build_prompt_block, inject_context, TokenCounter};
use crate::message::{ChatRequest, ChatResponse, ChunkStream, Exchange, Role};
use crate::persist::PersistenceWorker;
use crate::store::{MemoryStore, ProfileEntry, UserHandle};

/// A chat completion client with per-user long-term memory attached.
///
/// Wraps an unwrapped client by delegation. Calls that carry a `user_id` get
/// the user's memory context injected into the prompt and their finished
/// exchange persisted in the background; calls without one are forwarded
/// with the original arguments and behave exactly like the unwrapped client,
/// in both blocking and streaming modes.
pub struct MemoryAugmented {
    inner: Arc<dyn ChatCompletion>,
    store: Arc<dyn MemoryStore>,
    config: MemoryConfig,
    tokens: TokenCounter,
    worker: PersistenceWorker,
}

/// Attach a memory store to a completion client.
///
/// Idempotent: a client that is already memory-augmented is returned
/// unchanged, so applying `patch` twice never double-injects or
/// double-persists. Patching a client while other tasks are concurrently
/// patching the same instance is not supported; serialize patch calls.
pub fn patch(
    client: Arc<dyn ChatCompletion>,
    store: Arc<dyn MemoryStore>,
    config: MemoryConfig,
) -> Result<Arc<dyn ChatCompletion>> {
    if client.is_memory_augmented() {
        return Ok(client);
    }
    Ok(Arc::new(MemoryAugmented::new(client, store, config)?))
}

impl MemoryAugmented {
    /// Wrap a client with a memory store
    pub fn new(
        inner: Arc<dyn ChatCompletion>,
        store: Arc<dyn MemoryStore>,
        config: MemoryConfig,
    ) -> Result<Self> {
        let tokens = TokenCounter::new(&config.token_model)?;
        let worker = PersistenceWorker::new(store.clone(), config.max_concurrent_persists);
        Ok(Self {
            inner,
            store,
            config,
            tokens,
            worker,
        })
    }

    /// The configuration this wrapper runs with
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// The delimited memory block that would be injected for a user right
    /// now; empty if the user has no memory yet.
    pub async fn preview_prompt(&self, raw_user_id: &str) -> Result<String> {
        let user = CanonicalUserId::derive(raw_user_id)?;
        let context = self
            .fetch_context(user, self.config.max_context_tokens)
            .await?;
        if context.is_empty() {
            return Ok(String::new());
        }
        Ok(build_prompt_block(&context, self.config.additional_prompt.as_deref()))
    }

    /// Current profile entries for a user
    pub async fn profile(&self, raw_user_id: &str) -> Result<Vec<ProfileEntry>> {
        let user = CanonicalUserId::derive(raw_user_id)?;
        let handle = UserHandle::get_or_create(self.store.clone(), user).await?;
        handle.profile().await
    }

    /// Clear all stored memory for a user
    pub async fn flush_memory(&self, raw_user_id: &str) -> Result<()> {
        let user = CanonicalUserId::derive(raw_user_id)?;
        let handle = UserHandle::get_or_create(self.store.clone(), user).await?;
        handle.flush().await
    }

    /// Fetch the user's memory context, bounded to `max_tokens`.
    ///
    /// A store failure is surfaced or degraded to an empty context according
    /// to the configured policy; the policy is applied here and nowhere
    /// else, so both call paths behave the same way.
    async fn fetch_context(&self, user: CanonicalUserId, max_tokens: u32) -> Result<String> {
        let fetched = match UserHandle::get_or_create(self.store.clone(), user).await {
            Ok(handle) => handle.context(max_tokens).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(context) => Ok(self.tokens.trim(&context, max_tokens)),
            Err(e) => match self.config.context_failure_policy {
                ContextFailurePolicy::Surface => Err(e),
                ContextFailurePolicy::EmptyContext => {
                    tracing::warn!(user = %user, error = %e, "context fetch failed; continuing without memory");
                    Ok(String::new())
                }
            },
        }
    }

    /// Resolve the memory pipeline inputs for a request, or `None` when the
    /// pipeline must be bypassed (no user id, or the last turn is not a user
    /// message).
    fn pipeline_inputs(&self, request: &ChatRequest) -> Result<Option<(CanonicalUserId, String)>> {
        let Some(raw_id) = request.user_id.as_deref() else {
            return Ok(None);
        };

        let user_content = match request.last_message() {
            Some(m) if m.role == Role::User => m.content.clone(),
            _ => {
                tracing::warn!("last message is not a user turn; skipping memory augmentation");
                return Ok(None);
            }
        };

        let user = CanonicalUserId::derive(raw_id)?;
        Ok(Some((user, user_content)))
    }

    /// Inject the user's context into a sanitized copy of the request
    async fn augment(&self, request: &ChatRequest, user: CanonicalUserId) -> Result<ChatRequest> {
        let max_tokens = request
            .max_context_tokens
            .unwrap_or(self.config.max_context_tokens);
        let context = self.fetch_context(user, max_tokens).await?;

        let mut forwarded = request.sanitized();
        forwarded.messages = inject_context(
            &forwarded.messages,
            &context,
            self.config.additional_prompt.as_deref(),
        );
        Ok(forwarded)
    }
}

#[async_trait]
impl ChatCompletion for MemoryAugmented {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let (user, user_content) = match self.pipeline_inputs(&request)? {
            Some(inputs) => inputs,
            None if request.user_id.is_none() => {
                // Transparency: forward the original arguments untouched.
                return self.inner.complete(request).await;
            }
            None => {
                return self.inner.complete(request.sanitized()).await;
            }
        };

        let forwarded = self.augment(&request, user).await?;
        let response = self.inner.complete(forwarded).await?;

        // An empty reply is nothing worth remembering; the streaming path
        // skips these too.
        if !response.content.is_empty() {
            let exchange = Exchange::new(user_content, response.content.clone());
            self.worker.dispatch(user, exchange);
        }

        Ok(response)
    }

    async fn complete_stream(&self, request: ChatRequest) -> Result<ChunkStream> {
        let (user, user_content) = match self.pipeline_inputs(&request)? {
            Some(inputs) => inputs,
            None if request.user_id.is_none() => {
                return self.inner.complete_stream(request).await;
            }
            None => {
                return self.inner.complete_stream(request.sanitized()).await;
            }
        };

        let forwarded = self.augment(&request, user).await?;
        let stream = self.inner.complete_stream(forwarded).await?;

        Ok(Box::pin(CaptureStream::new(
            stream,
            user,
            user_content,
            self.worker.clone(),
        )))
    }

    fn is_memory_augmented(&self) -> bool {
        true
    }
}
