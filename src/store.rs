//! Monitored-Entity and Session Store Seams
//!
//! The monitor configuration (monitored SKUs, alert recipients, the single
//! global stock threshold) and shop session state are owned by an external
//! system; the pipeline only reads them. These traits are the seam, and
//! [`InMemoryStore`] backs development and tests.
//!
//! The threshold is a single global record — not per-SKU — mirroring the
//! upstream data model (a lone row upserted under a fixed identity).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// Read access to the monitor configuration
#[async_trait]
pub trait MonitorStore: Send + Sync + 'static {
    /// The set of SKUs the operator cares about
    async fn monitored_skus(&self) -> HashSet<String>;

    /// The configured minimum stock, if any
    async fn threshold(&self) -> Option<i64>;

    /// Alert recipient addresses
    async fn recipients(&self) -> Vec<String>;
}

/// Shop session state, used to establish webhook authentication context
/// and to clean up on uninstall
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Whether the shop has an installed session
    async fn shop_exists(&self, shop: &str) -> bool;

    /// Remove all session state for the shop; idempotent.
    ///
    /// Returns the number of sessions removed (0 on an already-clean shop).
    async fn purge_shop(&self, shop: &str) -> usize;
}

#[derive(Debug, Default)]
struct InMemoryInner {
    skus: HashSet<String>,
    recipients: Vec<String>,
    threshold: Option<i64>,
    /// shop domain -> live session count
    sessions: HashMap<String, usize>,
}

/// In-memory store backing development mode and tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<InMemoryInner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitored SKU; duplicates are ignored
    pub async fn add_sku(&self, sku: impl Into<String>) {
        self.inner.write().await.skus.insert(sku.into());
    }

    /// Add an alert recipient; duplicates are ignored
    pub async fn add_recipient(&self, email: impl Into<String>) {
        let email = email.into();
        let mut inner = self.inner.write().await;
        if !inner.recipients.contains(&email) {
            inner.recipients.push(email);
        }
    }

    /// Upsert the single global threshold
    pub async fn set_threshold(&self, min_stock: i64) {
        self.inner.write().await.threshold = Some(min_stock);
    }

    /// Register a shop session (install)
    pub async fn register_shop(&self, shop: impl Into<String>) {
        *self
            .inner
            .write()
            .await
            .sessions
            .entry(shop.into())
            .or_insert(0) += 1;
    }
}

#[async_trait]
impl MonitorStore for InMemoryStore {
    async fn monitored_skus(&self) -> HashSet<String> {
        self.inner.read().await.skus.clone()
    }

    async fn threshold(&self) -> Option<i64> {
        self.inner.read().await.threshold
    }

    async fn recipients(&self) -> Vec<String> {
        self.inner.read().await.recipients.clone()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn shop_exists(&self, shop: &str) -> bool {
        self.inner.read().await.sessions.contains_key(shop)
    }

    async fn purge_shop(&self, shop: &str) -> usize {
        let removed = self
            .inner
            .write()
            .await
            .sessions
            .remove(shop)
            .unwrap_or(0);
        if removed > 0 {
            info!(shop, sessions = removed, "Purged shop sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_monitor_store_reads() {
        let store = InMemoryStore::new();
        store.add_sku("ABC123").await;
        store.add_sku("ABC123").await;
        store.add_recipient("a@x.com").await;
        store.add_recipient("a@x.com").await;
        store.set_threshold(10).await;

        assert_eq!(store.monitored_skus().await.len(), 1);
        assert_eq!(store.recipients().await, vec!["a@x.com".to_string()]);
        assert_eq!(store.threshold().await, Some(10));
    }

    #[tokio::test]
    async fn test_threshold_upsert_overwrites() {
        let store = InMemoryStore::new();
        assert_eq!(store.threshold().await, None);
        store.set_threshold(10).await;
        store.set_threshold(20).await;
        assert_eq!(store.threshold().await, Some(20));
    }

    #[tokio::test]
    async fn test_purge_shop_is_idempotent() {
        let store = InMemoryStore::new();
        store.register_shop("test.myshopify.com").await;
        assert!(store.shop_exists("test.myshopify.com").await);

        assert_eq!(store.purge_shop("test.myshopify.com").await, 1);
        assert!(!store.shop_exists("test.myshopify.com").await);

        // Second purge on an already-clean shop is a no-op
        assert_eq!(store.purge_shop("test.myshopify.com").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_shop_does_not_exist() {
        let store = InMemoryStore::new();
        assert!(!store.shop_exists("nobody.myshopify.com").await);
    }
}
