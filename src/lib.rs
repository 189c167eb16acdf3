//! Stockwatch - Low-Stock Alert Service for Commerce Platform Webhooks
//!
//! This crate provides a production-ready webhook service that turns
//! inventory-change deliveries into low-stock email alerts.
//!
//! # Features
//!
//! - **Topic Routing**: shop-authenticated webhook dispatch with a
//!   never-crash error boundary
//! - **Tolerant Normalization**: JSON text, pre-decoded, or malformed
//!   bodies all handled without propagating parse errors
//! - **SKU Resolution**: remote platform lookup from inventory item id to
//!   operator-facing SKU, defensive at every nesting level
//! - **Threshold Evaluation**: pure, deterministic strictly-less-than
//!   comparison against a single global minimum-stock record
//! - **Email Dispatch**: one delivery to all recipients, at-most-once
//!
//! # Architecture
//!
//! ```text
//! Platform ──▶ Topic Router ──▶ Payload Normalizer ──▶ SKU Resolver
//!                  │                                        │
//!                  ▼                                        ▼
//!            uninstall/redact                      Threshold Evaluator
//!              side effects                                 │
//!                                                           ▼
//!                                                 Notification Dispatcher
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockwatch::notify::ConsoleMailer;
//! use stockwatch::pipeline::{run_inventory_pipeline, PipelineDeps};
//! use stockwatch::resolver::StaticSkuResolver;
//! use stockwatch::store::InMemoryStore;
//! use stockwatch::webhook::RawPayload;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(InMemoryStore::new());
//!     store.add_sku("ABC123").await;
//!     store.set_threshold(10).await;
//!     store.add_recipient("ops@example.com").await;
//!
//!     let deps = PipelineDeps {
//!         store,
//!         resolver: Arc::new(StaticSkuResolver::new().with_mapping("999", "ABC123")),
//!         mailer: Arc::new(ConsoleMailer),
//!         from_email: "alerts@example.com".to_string(),
//!     };
//!
//!     let raw = RawPayload::Text(r#"{"inventory_item_id": 999, "available": 5}"#.into());
//!     let outcome = run_inventory_pipeline(raw, &deps).await;
//!     println!("{outcome:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod evaluate;
pub mod handlers;
pub mod notify;
pub mod pipeline;
pub mod resolver;
pub mod store;
pub mod webhook;

// Re-exports for convenience
pub use error::{Error, Result};
pub use evaluate::{evaluate, AlertDecision, Evaluation};
pub use pipeline::{run_inventory_pipeline, PipelineDeps, PipelineOutcome, SkipReason};
pub use webhook::{WebhookState, WebhookTopic};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
