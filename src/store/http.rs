//! HTTP-backed memory store client

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::identity::CanonicalUserId;
use crate::message::Exchange;
use crate::store::{MemoryStore, ProfileEntry};

/// Response envelope used by the store API
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_errno")]
    errno: i32,
    #[serde(default)]
    errmsg: String,
    data: Option<T>,
}

fn default_errno() -> i32 {
    0
}

#[derive(Debug, Serialize)]
struct ChatBlob<'a> {
    blob_type: &'static str,
    blob_data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ContextData {
    context: String,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    profiles: Vec<ProfileEntry>,
}

/// Memory store client speaking the store's HTTP API.
///
/// Transport failures surface as `StoreUnavailable`; API-level rejections
/// carry the server's error message.
pub struct HttpMemoryStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMemoryStore {
    /// Create a new store client for a base URL and API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE || status.is_server_error() {
            return Err(Error::store_unavailable(format!(
                "store returned {}",
                status
            )));
        }
        let envelope: Envelope<T> = response.json().await?;
        if envelope.errno != 0 {
            return Err(Error::store_unavailable(format!(
                "store error {}: {}",
                envelope.errno, envelope.errmsg
            )));
        }
        Ok(envelope.data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::store_unavailable(e.to_string()))?;
        self.unwrap_envelope(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Option<T>> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::store_unavailable(e.to_string()))?;
        self.unwrap_envelope(response).await
    }
}

#[async_trait]
impl MemoryStore for HttpMemoryStore {
    async fn get_or_create_user(&self, user: CanonicalUserId) -> Result<()> {
        let body = json!({ "id": user.as_uuid() });
        self.post::<serde_json::Value>("/users", &body).await?;
        Ok(())
    }

    async fn context(&self, user: CanonicalUserId, max_tokens: u32) -> Result<String> {
        let data: Option<ContextData> = self
            .get(
                &format!("/users/context/{}", user),
                &[("max_token_size", max_tokens.to_string())],
            )
            .await?;
        Ok(data.map(|d| d.context).unwrap_or_default())
    }

    async fn insert(&self, user: CanonicalUserId, exchange: &Exchange) -> Result<()> {
        let messages: Vec<_> = exchange
            .messages()
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();
        let blob = ChatBlob {
            blob_type: "chat",
            blob_data: json!({ "messages": messages }),
            fields: None,
        };
        let body = serde_json::to_value(&blob)?;
        self.post::<serde_json::Value>(&format!("/blobs/insert/{}", user), &body)
            .await?;
        Ok(())
    }

    async fn profile(&self, user: CanonicalUserId) -> Result<Vec<ProfileEntry>> {
        let data: Option<ProfileData> = self
            .get(&format!("/users/profile/{}", user), &[])
            .await?;
        Ok(data.map(|d| d.profiles).unwrap_or_default())
    }

    async fn flush(&self, user: CanonicalUserId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/users/{}", user)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::store_unavailable(e.to_string()))?;
        self.unwrap_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}
