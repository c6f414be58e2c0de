//! Provider Manager: terminal-id -> live [`Provider`] instance,
//! with lazy rehydration from the Metadata Store on cache miss.
//!
//! A double-checked-locking registry: a miss under the read path takes the
//! write lock, re-checks, and only then rehydrates from the store, so
//! concurrent lookups for the same terminal don't race to rebuild it twice.

use crate::error::CoreResult;
use crate::model::Terminal;
use crate::provider::{build_provider, rehydrate_provider, Provider};
use crate::store::MetadataStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Shared handle to one live provider, serializing calls that mutate it
/// (`initialize`, `cleanup`) while still allowing concurrent holders.
pub type ProviderHandle = Arc<AsyncMutex<Box<dyn Provider>>>;

pub struct ProviderManager {
    store: Arc<MetadataStore>,
    providers: Mutex<HashMap<String, ProviderHandle>>,
}

impl ProviderManager {
    pub fn new(store: Arc<MetadataStore>) -> Self {
        Self { store, providers: Mutex::new(HashMap::new()) }
    }

    /// Explicit insertion path used during terminal creation, once the
    /// caller has already built and initialized a provider.
    pub fn create_provider(&self, id: &str, provider: Box<dyn Provider>) -> ProviderHandle {
        let handle: ProviderHandle = Arc::new(AsyncMutex::new(provider));
        self.providers.lock().insert(id.to_string(), handle.clone());
        handle
    }

    /// Cached lookup, falling back to rehydration from the Metadata Store.
    /// Concurrent calls for the same unseen id produce exactly one instance
    /// (double-checked under the registry lock).
    pub fn get_provider(&self, id: &str) -> CoreResult<ProviderHandle> {
        if let Some(handle) = self.providers.lock().get(id).cloned() {
            return Ok(handle);
        }

        // Miss: resolve stored metadata outside the lock (it may block on
        // I/O), then re-check before inserting.
        let terminal: Terminal = self.store.get_terminal(id)?;

        let mut providers = self.providers.lock();
        if let Some(handle) = providers.get(id).cloned() {
            return Ok(handle);
        }
        let provider = rehydrate_provider(&terminal.provider_kind);
        let handle: ProviderHandle = Arc::new(AsyncMutex::new(provider));
        providers.insert(id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Build a fresh, uninitialized provider for `kind` without registering
    /// it — the caller drives `initialize()` and then calls
    /// [`Self::create_provider`] once it succeeds.
    pub fn new_provider(&self, kind: &crate::model::ProviderKind) -> Box<dyn Provider> {
        build_provider(kind)
    }

    /// Removes the cached instance and calls [`Provider::cleanup`] on it.
    pub async fn cleanup_provider(&self, id: &str) {
        let handle = self.providers.lock().remove(id);
        if let Some(handle) = handle {
            handle.lock().await.cleanup();
        }
    }
}

#[cfg(test)]
#[path = "provider_manager_tests.rs"]
mod tests;
