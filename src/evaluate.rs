//! Threshold Evaluation
//!
//! The alert decision is a pure function of the monitored SKU set, the
//! configured threshold, and the inventory change. Keeping it free of I/O
//! makes it the natural unit-test boundary of the pipeline: the store reads
//! happen in the caller, the decision happens here.
//!
//! Gates, in order, each short-circuiting to "no alert, no error":
//! 1. unmonitored SKUs never alert, regardless of quantity;
//! 2. a missing threshold is a configuration gap, not a failure;
//! 3. the comparison is strictly `available < min_stock` — equality does
//!    not alert, and negative quantities get no special treatment.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The decision derived for a single inventory change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDecision {
    /// The resolved, operator-facing SKU
    pub sku: String,
    /// Quantity available after the change
    pub available: i64,
    /// Configured minimum stock
    pub threshold: i64,
    /// Whether an alert is warranted
    pub should_notify: bool,
}

/// Outcome of evaluating an inventory change against the monitor config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The SKU is not monitored; nothing to do
    NotMonitored,
    /// No threshold has been configured yet
    NoThreshold,
    /// Stock fell strictly below the threshold
    Alert(AlertDecision),
    /// Stock is at or above the threshold
    InStock(AlertDecision),
}

/// Evaluate an inventory change.
///
/// Deterministic and side-effect free. `threshold` is `None` when the
/// operator has not configured a minimum stock yet.
pub fn evaluate(
    monitored: &HashSet<String>,
    threshold: Option<i64>,
    sku: &str,
    available: i64,
) -> Evaluation {
    if !monitored.contains(sku) {
        return Evaluation::NotMonitored;
    }

    let Some(min_stock) = threshold else {
        return Evaluation::NoThreshold;
    };

    let decision = AlertDecision {
        sku: sku.to_string(),
        available,
        threshold: min_stock,
        should_notify: available < min_stock,
    };

    if decision.should_notify {
        Evaluation::Alert(decision)
    } else {
        Evaluation::InStock(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitored(skus: &[&str]) -> HashSet<String> {
        skus.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_below_threshold_alerts() {
        let eval = evaluate(&monitored(&["ABC123"]), Some(10), "ABC123", 5);
        match eval {
            Evaluation::Alert(d) => {
                assert_eq!(d.sku, "ABC123");
                assert_eq!(d.available, 5);
                assert_eq!(d.threshold, 10);
                assert!(d.should_notify);
            }
            other => panic!("expected Alert, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_to_threshold_does_not_alert() {
        let eval = evaluate(&monitored(&["ABC123"]), Some(10), "ABC123", 10);
        match eval {
            Evaluation::InStock(d) => assert!(!d.should_notify),
            other => panic!("expected InStock, got {other:?}"),
        }
    }

    #[test]
    fn test_above_threshold_does_not_alert() {
        let eval = evaluate(&monitored(&["ABC123"]), Some(10), "ABC123", 25);
        assert!(matches!(eval, Evaluation::InStock(_)));
    }

    #[test]
    fn test_negative_available_alerts() {
        let eval = evaluate(&monitored(&["ABC123"]), Some(0), "ABC123", -3);
        assert!(matches!(eval, Evaluation::Alert(_)));
    }

    #[test]
    fn test_unmonitored_sku_never_alerts() {
        let eval = evaluate(&monitored(&["OTHER"]), Some(1000), "ABC123", -999);
        assert_eq!(eval, Evaluation::NotMonitored);
    }

    #[test]
    fn test_empty_monitored_set_never_alerts() {
        let eval = evaluate(&HashSet::new(), Some(10), "ABC123", 0);
        assert_eq!(eval, Evaluation::NotMonitored);
    }

    #[test]
    fn test_missing_threshold_is_config_gap() {
        let eval = evaluate(&monitored(&["ABC123"]), None, "ABC123", 0);
        assert_eq!(eval, Evaluation::NoThreshold);
    }

    #[test]
    fn test_monitored_gate_precedes_threshold_gate() {
        // Unmonitored wins over missing threshold
        let eval = evaluate(&monitored(&["OTHER"]), None, "ABC123", 0);
        assert_eq!(eval, Evaluation::NotMonitored);
    }
}
