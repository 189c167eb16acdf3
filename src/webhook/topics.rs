//! Webhook Topic Types
//!
//! Strongly-typed classification of commerce platform webhook topics.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Webhook topics we handle
///
/// Topics arrive either in canonical `SCREAMING_SNAKE` form or in the
/// platform's `family/event` header form; both parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookTopic {
    /// App removed from the shop; session state must be purged
    AppUninstalled,

    /// Inventory level changed for an item; drives the alert pipeline
    InventoryLevelsUpdate,

    /// Product created (log-only)
    ProductsCreate,
    /// Product deleted (log-only)
    ProductsDelete,

    /// Customer data access request (acknowledged, no action)
    CustomersDataRequest,
    /// Customer data erasure request (acknowledged, no action)
    CustomersRedact,
    /// Shop data erasure request (acknowledged, no action)
    ShopRedact,

    /// Catch-all for topics we don't explicitly handle
    #[serde(other)]
    Unknown,
}

impl FromStr for WebhookTopic {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "APP_UNINSTALLED" | "app/uninstalled" => Self::AppUninstalled,
            "INVENTORY_LEVELS_UPDATE" | "inventory_levels/update" => Self::InventoryLevelsUpdate,
            "PRODUCTS_CREATE" | "products/create" => Self::ProductsCreate,
            "PRODUCTS_DELETE" | "products/delete" => Self::ProductsDelete,
            "CUSTOMERS_DATA_REQUEST" | "customers/data_request" => Self::CustomersDataRequest,
            "CUSTOMERS_REDACT" | "customers/redact" => Self::CustomersRedact,
            "SHOP_REDACT" | "shop/redact" => Self::ShopRedact,
            _ => Self::Unknown,
        })
    }
}

impl WebhookTopic {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppUninstalled => "APP_UNINSTALLED",
            Self::InventoryLevelsUpdate => "INVENTORY_LEVELS_UPDATE",
            Self::ProductsCreate => "PRODUCTS_CREATE",
            Self::ProductsDelete => "PRODUCTS_DELETE",
            Self::CustomersDataRequest => "CUSTOMERS_DATA_REQUEST",
            Self::CustomersRedact => "CUSTOMERS_REDACT",
            Self::ShopRedact => "SHOP_REDACT",
            Self::Unknown => "unknown",
        }
    }

    /// Check if this is a known topic
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Check if this is a privacy/compliance topic that is acknowledged
    /// without further action
    pub fn is_redaction(&self) -> bool {
        matches!(
            self,
            Self::CustomersDataRequest | Self::CustomersRedact | Self::ShopRedact
        )
    }
}

impl std::fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
