//! Webhook Ingestion Module
//!
//! This module provides the inbound side of the alerting service:
//!
//! - **Topic Classification**: strongly-typed topic parsing with a
//!   catch-all for topics we acknowledge but do not act on
//! - **Tolerant Normalization**: webhook bodies may be JSON text,
//!   pre-decoded structures, or garbage; malformed input is dropped and
//!   logged, never propagated
//! - **Topic Routing**: shop-context authentication, per-topic dispatch,
//!   and a catch-all error boundary so a bad delivery can never crash the
//!   host process
//!
//! # Architecture
//!
//! ```text
//! Request -> Shop Auth -> Topic Switch -> Inventory Pipeline -> Ack (200)
//!                |             |                  |
//!                v             v                  v
//!              404      uninstall/redact    normalize -> resolve
//!                          side effects      -> evaluate -> notify
//! ```

pub mod handler;
pub mod payload;
pub mod topics;

// Re-export commonly used items
pub use handler::{webhook_handler, webhook_router, WebhookAck, WebhookState};
pub use payload::{normalize, InventoryLevelChange, RawPayload};
pub use topics::WebhookTopic;
