//! Inventory Alert Pipeline
//!
//! Runs one webhook delivery through normalize -> resolve -> evaluate ->
//! notify, strictly in that order, each stage awaiting the previous one.
//! Expected short-circuits (malformed payload, unresolvable SKU, missing
//! config) are modeled as explicit [`SkipReason`] variants rather than
//! errors: a skipped delivery is still an acknowledged delivery.
//!
//! There is no deduplication of concurrent or repeated deliveries for the
//! same inventory item; two near-simultaneous deliveries crossing the
//! threshold may both alert.

use std::sync::Arc;

use tracing::{info, warn};

use crate::evaluate::{evaluate, AlertDecision, Evaluation};
use crate::notify::{dispatch_alert, Mailer};
use crate::resolver::SkuResolver;
use crate::store::MonitorStore;
use crate::webhook::payload::{normalize, InventoryLevelChange, RawPayload};

/// Why a delivery produced no alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No payload was delivered
    EmptyPayload,
    /// Payload could not be decoded or lacked required fields
    MalformedPayload,
    /// The inventory item identifier could not be resolved to a SKU
    UnresolvedSku,
    /// The resolved SKU is not in the monitored set
    NotMonitored,
    /// No stock threshold has been configured yet
    NoThreshold,
    /// Stock is at or above the threshold
    StockSufficient,
    /// No alert recipients are configured
    NoRecipients,
}

impl SkipReason {
    /// Short tag for logs and the ack body
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "empty_payload",
            Self::MalformedPayload => "malformed_payload",
            Self::UnresolvedSku => "unresolved_sku",
            Self::NotMonitored => "not_monitored",
            Self::NoThreshold => "no_threshold",
            Self::StockSufficient => "stock_sufficient",
            Self::NoRecipients => "no_recipients",
        }
    }
}

/// Outcome of one delivery through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// An alert email went out
    Notified(AlertDecision),
    /// The delivery was processed but warranted no alert
    Skipped(SkipReason),
    /// The alert was warranted but the transport failed; the alert is lost
    Failed(String),
}

/// Collaborators the pipeline reads from and writes to
#[derive(Clone)]
pub struct PipelineDeps {
    /// Monitor configuration reads
    pub store: Arc<dyn MonitorStore>,
    /// Remote SKU lookup
    pub resolver: Arc<dyn SkuResolver>,
    /// Email transport
    pub mailer: Arc<dyn Mailer>,
    /// Sender address for alert emails
    pub from_email: String,
}

/// Run one `INVENTORY_LEVELS_UPDATE` delivery through the pipeline.
///
/// Never returns an error: every failure mode maps to a `Skipped` or
/// `Failed` outcome so the webhook can be acknowledged regardless.
pub async fn run_inventory_pipeline(raw: RawPayload, deps: &PipelineDeps) -> PipelineOutcome {
    let absent = matches!(raw, RawPayload::Absent);

    // Normalize; a None here stops everything before any remote call.
    let Some(value) = normalize(raw) else {
        let reason = if absent {
            SkipReason::EmptyPayload
        } else {
            SkipReason::MalformedPayload
        };
        warn!(reason = reason.as_str(), "Inventory webhook dropped before resolution");
        return PipelineOutcome::Skipped(reason);
    };

    let Some(change) = InventoryLevelChange::from_value(&value) else {
        warn!("Inventory webhook payload failed validation");
        return PipelineOutcome::Skipped(SkipReason::MalformedPayload);
    };

    // Resolve before evaluating; an unresolvable SKU skips the store reads.
    let sku = match deps.resolver.resolve_sku(&change.inventory_item_id).await {
        Ok(Some(sku)) => sku,
        Ok(None) => {
            warn!(
                inventory_item_id = %change.inventory_item_id,
                "No SKU found for inventory item, skipping evaluation"
            );
            return PipelineOutcome::Skipped(SkipReason::UnresolvedSku);
        }
        Err(e) => {
            warn!(
                inventory_item_id = %change.inventory_item_id,
                error = %e,
                "SKU lookup failed, skipping evaluation"
            );
            return PipelineOutcome::Skipped(SkipReason::UnresolvedSku);
        }
    };

    // Membership gate first so an unmonitored SKU never touches the
    // threshold record.
    let monitored = deps.store.monitored_skus().await;
    if !monitored.contains(&sku) {
        info!(sku = %sku, "SKU not monitored, no alert");
        return PipelineOutcome::Skipped(SkipReason::NotMonitored);
    }

    let threshold = deps.store.threshold().await;
    let decision = match evaluate(&monitored, threshold, &sku, change.available) {
        Evaluation::NotMonitored => {
            // Unreachable given the membership gate above; keep the mapping
            // total anyway.
            return PipelineOutcome::Skipped(SkipReason::NotMonitored);
        }
        Evaluation::NoThreshold => {
            warn!(sku = %sku, "No stock threshold configured, cannot evaluate");
            return PipelineOutcome::Skipped(SkipReason::NoThreshold);
        }
        Evaluation::InStock(decision) => {
            info!(
                sku = %sku,
                available = decision.available,
                threshold = decision.threshold,
                "Stock at or above threshold, no alert"
            );
            return PipelineOutcome::Skipped(SkipReason::StockSufficient);
        }
        Evaluation::Alert(decision) => decision,
    };

    let recipients = deps.store.recipients().await;
    match dispatch_alert(deps.mailer.as_ref(), &deps.from_email, recipients, &decision).await {
        Ok(true) => PipelineOutcome::Notified(decision),
        Ok(false) => PipelineOutcome::Skipped(SkipReason::NoRecipients),
        Err(e) => {
            warn!(sku = %decision.sku, error = %e, "Alert delivery failed, alert lost");
            PipelineOutcome::Failed(e.to_string())
        }
    }
}
