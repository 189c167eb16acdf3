//! SKU Resolution
//!
//! A webhook carries the platform-internal inventory item identifier, not
//! the operator-facing SKU. Resolving one to the other takes a remote
//! lookup against the platform Admin API. Any failure along the way —
//! network error, non-success status, missing `variant`/`sku` nesting —
//! collapses to "cannot resolve", which skips evaluation for the delivery
//! rather than failing it.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ResolverError;

/// Maps a platform inventory item identifier to a SKU string
#[async_trait]
pub trait SkuResolver: Send + Sync + 'static {
    /// Resolve an inventory item identifier to its SKU.
    ///
    /// `Ok(None)` means the platform answered but no SKU exists at the
    /// expected nesting; `Err` means the lookup itself failed. Callers
    /// treat both as "cannot resolve".
    async fn resolve_sku(&self, inventory_item_id: &str) -> Result<Option<String>, ResolverError>;
}

/// Resolver backed by the commerce platform Admin API
pub struct PlatformSkuResolver {
    base_url: Url,
    access_token: String,
    client: reqwest::Client,
}

impl PlatformSkuResolver {
    /// Create a resolver for the given Admin API base URL and access token
    pub fn new(base_url: Url, access_token: String) -> Self {
        Self {
            base_url,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    fn item_url(&self, inventory_item_id: &str) -> Result<Url, ResolverError> {
        self.base_url
            .join(&format!("inventory_items/{inventory_item_id}.json"))
            .map_err(|e| ResolverError::RequestFailed(e.to_string()))
    }
}

/// Pull `variant.sku` out of a platform response, tolerating absence of
/// any nesting level. The platform has shipped both `{variant: {sku}}`
/// and a bare `{sku}` shape across API versions.
fn extract_sku(body: &Value) -> Option<String> {
    let sku = body
        .pointer("/variant/sku")
        .or_else(|| body.get("sku"))
        .and_then(Value::as_str)?;
    if sku.is_empty() {
        return None;
    }
    Some(sku.to_string())
}

#[async_trait]
impl SkuResolver for PlatformSkuResolver {
    async fn resolve_sku(&self, inventory_item_id: &str) -> Result<Option<String>, ResolverError> {
        let url = self.item_url(inventory_item_id)?;

        let response = self
            .client
            .get(url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .send()
            .await
            .map_err(|e| ResolverError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ResolverError::MalformedResponse(e.to_string()))?;

        match extract_sku(&body) {
            Some(sku) => {
                debug!(inventory_item_id, sku = %sku, "Resolved SKU");
                Ok(Some(sku))
            }
            None => {
                warn!(inventory_item_id, "Platform response has no variant/sku");
                Ok(None)
            }
        }
    }
}

/// Fixed-map resolver for tests and offline development
#[derive(Debug, Default)]
pub struct StaticSkuResolver {
    mapping: std::collections::HashMap<String, String>,
}

impl StaticSkuResolver {
    /// Create an empty resolver that resolves nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed identifier -> SKU mapping
    pub fn with_mapping(mut self, inventory_item_id: impl Into<String>, sku: impl Into<String>) -> Self {
        self.mapping.insert(inventory_item_id.into(), sku.into());
        self
    }
}

#[async_trait]
impl SkuResolver for StaticSkuResolver {
    async fn resolve_sku(&self, inventory_item_id: &str) -> Result<Option<String>, ResolverError> {
        Ok(self.mapping.get(inventory_item_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_sku_nested_variant() {
        let body = json!({"variant": {"sku": "ABC123", "id": 42}});
        assert_eq!(extract_sku(&body), Some("ABC123".to_string()));
    }

    #[test]
    fn test_extract_sku_flat_shape() {
        let body = json!({"sku": "ABC123"});
        assert_eq!(extract_sku(&body), Some("ABC123".to_string()));
    }

    #[test]
    fn test_extract_sku_missing_nesting() {
        assert_eq!(extract_sku(&json!({})), None);
        assert_eq!(extract_sku(&json!({"variant": {}})), None);
        assert_eq!(extract_sku(&json!({"variant": null})), None);
        assert_eq!(extract_sku(&json!({"variant": {"sku": null}})), None);
    }

    #[test]
    fn test_extract_sku_wrong_type() {
        assert_eq!(extract_sku(&json!({"variant": {"sku": 123}})), None);
        assert_eq!(extract_sku(&json!({"variant": {"sku": ""}})), None);
    }

    #[test]
    fn test_item_url() {
        let resolver = PlatformSkuResolver::new(
            Url::parse("https://test.myshopify.com/admin/api/2024-01/").unwrap(),
            "token".to_string(),
        );
        let url = resolver.item_url("999").unwrap();
        assert_eq!(
            url.as_str(),
            "https://test.myshopify.com/admin/api/2024-01/inventory_items/999.json"
        );
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticSkuResolver::new().with_mapping("999", "ABC123");
        assert_eq!(
            resolver.resolve_sku("999").await.unwrap(),
            Some("ABC123".to_string())
        );
        assert_eq!(resolver.resolve_sku("1000").await.unwrap(), None);
    }
}
