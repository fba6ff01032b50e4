//! The memory store collaborator
//!
//! memwrap never decides what to remember; it only ships exchanges to a
//! store and reads back the serialized context the store derives from them.
//! This module is the narrow seam between the two.

mod http;

pub use http::HttpMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::identity::CanonicalUserId;
use crate::message::Exchange;

/// One entry of a user's long-term profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Store-assigned entry id
    pub id: String,

    /// The remembered fact
    pub content: String,

    /// Topic this fact is filed under
    pub topic: String,

    /// Sub-topic within the topic
    pub sub_topic: String,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,
}

/// Backend operations the memory store must provide.
///
/// Implementations own auth, transport, and retry policy; this layer treats
/// every insert as an independent append and performs no retries itself.
#[async_trait]
pub trait MemoryStore: Send + Sync + 'static {
    /// Ensure a user exists in the store
    async fn get_or_create_user(&self, user: CanonicalUserId) -> Result<()>;

    /// Serialized memory context for a user, bounded to `max_tokens`.
    /// Empty string if the user has no memory yet.
    async fn context(&self, user: CanonicalUserId, max_tokens: u32) -> Result<String>;

    /// Append one completed exchange to the user's memory
    async fn insert(&self, user: CanonicalUserId, exchange: &Exchange) -> Result<()>;

    /// The user's current profile entries
    async fn profile(&self, user: CanonicalUserId) -> Result<Vec<ProfileEntry>>;

    /// Clear all stored memory for a user
    async fn flush(&self, user: CanonicalUserId) -> Result<()>;
}

/// Per-user view onto a memory store
#[derive(Clone)]
pub struct UserHandle {
    store: Arc<dyn MemoryStore>,
    user: CanonicalUserId,
}

impl UserHandle {
    /// Look up or create the user, returning a handle scoped to them
    pub async fn get_or_create(store: Arc<dyn MemoryStore>, user: CanonicalUserId) -> Result<Self> {
        store.get_or_create_user(user).await?;
        Ok(Self { store, user })
    }

    /// The canonical id this handle is scoped to
    pub fn user_id(&self) -> CanonicalUserId {
        self.user
    }

    /// Serialized memory context for this user
    pub async fn context(&self, max_tokens: u32) -> Result<String> {
        self.store.context(self.user, max_tokens).await
    }

    /// Append one completed exchange
    pub async fn insert(&self, exchange: &Exchange) -> Result<()> {
        self.store.insert(self.user, exchange).await
    }

    /// The user's current profile entries
    pub async fn profile(&self) -> Result<Vec<ProfileEntry>> {
        self.store.profile(self.user).await
    }

    /// Clear all stored memory for this user
    pub async fn flush(&self) -> Result<()> {
        self.store.flush(self.user).await
    }
}
