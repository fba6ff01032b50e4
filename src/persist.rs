//! Background persistence of completed exchanges

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::identity::CanonicalUserId;
use crate::message::Exchange;
use crate::store::MemoryStore;

/// Fire-and-forget writer of exchanges to the memory store.
///
/// Each dispatch runs on its own tokio task; a semaphore bounds how many
/// store round-trips are in flight at once. Failures are logged and
/// swallowed, since persistence is a best-effort enhancement and never part
/// of the completion contract. Distinct exchanges for the same user may land
/// out of order; the store treats each insert as an independent append.
#[derive(Clone)]
pub struct PersistenceWorker {
    store: Arc<dyn MemoryStore>,
    permits: Arc<Semaphore>,
}

impl PersistenceWorker {
    /// Create a worker bounded to `max_concurrent` in-flight inserts
    pub fn new(store: Arc<dyn MemoryStore>, max_concurrent: usize) -> Self {
        Self {
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Persist an exchange without blocking the caller.
    ///
    /// Returns immediately; the insert happens on a background task once a
    /// permit is available.
    pub fn dispatch(&self, user: CanonicalUserId, exchange: Exchange) {
        let store = self.store.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            if let Err(e) = store.insert(user, &exchange).await {
                tracing::warn!(user = %user, error = %e, "failed to persist exchange");
            } else {
                tracing::debug!(user = %user, "persisted exchange");
            }
        });
    }
}
