//! Webhook Topic Router
//!
//! The HTTP entry point for platform webhook deliveries. A delivery is
//! authenticated by establishing its shop context (a missing or
//! uninstalled shop is a 404, mirroring the platform SDK behavior), then
//! routed by topic:
//!
//! - `APP_UNINSTALLED` purges the shop's session state (idempotent)
//! - `INVENTORY_LEVELS_UPDATE` runs the full alert pipeline
//! - data-request/redaction topics are acknowledged without action
//! - anything else is acknowledged as unhandled, never an error
//!
//! Errors from the pipeline never surface here: a failed alert must not
//! keep the platform redelivering the event. Anything genuinely
//! unexpected is caught at this boundary and answered with a generic 500.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::AppState;
use crate::pipeline::{run_inventory_pipeline, PipelineDeps, PipelineOutcome};
use crate::store::SessionStore;
use crate::webhook::payload::RawPayload;
use crate::webhook::topics::WebhookTopic;

/// Shop domain header set by the platform on every delivery
const SHOP_HEADER: &str = "x-shopify-shop-domain";
/// Topic header set by the platform on every delivery
const TOPIC_HEADER: &str = "x-shopify-topic";
/// Delivery id header, used for log correlation when present
const DELIVERY_ID_HEADER: &str = "x-shopify-webhook-id";

/// Shared state for the webhook route
pub struct WebhookState {
    /// Shop session lookups and uninstall cleanup
    pub sessions: Arc<dyn SessionStore>,
    /// Collaborators for the inventory pipeline
    pub pipeline: PipelineDeps,
    /// Service metrics
    pub metrics: Arc<AppState>,
}

/// Acknowledgment body returned for processed deliveries
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Whether the delivery was accepted
    pub success: bool,
    /// Whether the topic mapped to an action
    pub handled: bool,
    /// The classified topic
    pub topic: String,
    /// Pipeline outcome tag for inventory deliveries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

/// Webhook endpoint handler.
///
/// # Route
/// `POST /webhooks`
///
/// # Response
/// - `200 OK` for every topic the router understands, including
///   deliberately-no-op topics and unhandled ones
/// - `404 Not Found` when no shop context can be established
/// - `500 Internal Server Error` for unexpected failures (generic body,
///   no internal detail)
#[instrument(skip_all, fields(delivery_id))]
pub async fn webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    state.metrics.record_webhook();

    let delivery_id = headers
        .get(DELIVERY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    tracing::Span::current().record("delivery_id", delivery_id.as_str());

    // Establish the authentication context: both identifying headers and a
    // live shop session are required before any topic processing.
    let Some(shop) = header_str(&headers, SHOP_HEADER) else {
        warn!("Webhook delivery missing shop header");
        return not_found();
    };
    let Some(topic_raw) = header_str(&headers, TOPIC_HEADER) else {
        warn!(shop = %shop, "Webhook delivery missing topic header");
        return not_found();
    };

    if !state.sessions.shop_exists(&shop).await {
        warn!(shop = %shop, "Webhook for unknown or uninstalled shop");
        return (StatusCode::NOT_FOUND, "Shop not found or uninstalled").into_response();
    }

    // Unrecognized topics parse to WebhookTopic::Unknown, never an error
    let topic = WebhookTopic::from_str(&topic_raw).unwrap_or(WebhookTopic::Unknown);

    let response = match process_topic(&state, topic, &shop, &body).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => {
            state.metrics.record_error();
            error!(shop = %shop, topic = %topic, error = %e, "Error processing webhook");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    state.metrics.record_latency(started.elapsed());
    response
}

/// Perform the per-topic action. Pipeline short-circuits are not errors;
/// only genuinely unexpected failures propagate to the 500 boundary.
async fn process_topic(
    state: &WebhookState,
    topic: WebhookTopic,
    shop: &str,
    body: &Bytes,
) -> Result<WebhookAck> {
    match topic {
        WebhookTopic::AppUninstalled => {
            let removed = state.sessions.purge_shop(shop).await;
            info!(shop, sessions_removed = removed, "App uninstalled, sessions purged");
            Ok(ack(topic, None))
        }
        WebhookTopic::InventoryLevelsUpdate => {
            let raw = RawPayload::from_bytes(body);
            let outcome = run_inventory_pipeline(raw, &state.pipeline).await;
            match &outcome {
                PipelineOutcome::Notified(decision) => {
                    state.metrics.record_alert();
                    info!(shop, sku = %decision.sku, "Low-stock alert dispatched");
                }
                PipelineOutcome::Skipped(reason) => {
                    info!(shop, reason = reason.as_str(), "Inventory delivery skipped");
                }
                PipelineOutcome::Failed(cause) => {
                    // Alert lost; the delivery is still acknowledged.
                    state.metrics.record_pipeline_failure();
                    warn!(shop, cause = %cause, "Alert delivery failed");
                }
            }
            Ok(ack(topic, Some(outcome_tag(&outcome))))
        }
        WebhookTopic::ProductsCreate => {
            info!(shop, "Product created");
            Ok(ack(topic, None))
        }
        WebhookTopic::ProductsDelete => {
            info!(shop, "Product deleted");
            Ok(ack(topic, None))
        }
        topic if topic.is_redaction() => {
            // No PII is held by this service beyond operator-entered
            // config; acknowledge and move on.
            info!(shop, topic = %topic, "Compliance topic acknowledged");
            Ok(ack(topic, None))
        }
        _ => {
            info!(shop, topic = %topic, "Unhandled webhook topic acknowledged");
            Ok(WebhookAck {
                success: true,
                handled: false,
                topic: topic.as_str().to_string(),
                outcome: None,
            })
        }
    }
}

fn ack(topic: WebhookTopic, outcome: Option<String>) -> WebhookAck {
    WebhookAck {
        success: true,
        handled: true,
        topic: topic.as_str().to_string(),
        outcome,
    }
}

fn outcome_tag(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Notified(_) => "notified".to_string(),
        PipelineOutcome::Skipped(reason) => format!("skipped:{}", reason.as_str()),
        PipelineOutcome::Failed(_) => "failed".to_string(),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Create the webhook router.
///
/// # Routes
/// - `POST /webhooks` - platform webhook deliveries
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/webhooks", post(webhook_handler))
        .with_state(state)
}
