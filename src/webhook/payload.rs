//! Tolerant Webhook Payload Normalization
//!
//! Webhook bodies arrive in whatever shape the platform (or a proxy in
//! between) produced: a JSON text body, an already-decoded structure, or
//! nothing at all. Normalization collapses these into `Option<Value>` —
//! a decode failure is a logged diagnostic, never a propagated error,
//! because a malformed delivery must still be acknowledged.

use serde_json::Value;
use tracing::warn;

/// A webhook body as delivered, before normalization
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Body arrived as text (the common case over HTTP)
    Text(String),
    /// Body was already decoded upstream
    Structured(Value),
    /// No body was delivered
    Absent,
}

impl RawPayload {
    /// Build a payload from raw body bytes.
    ///
    /// Empty bodies map to `Absent`. Non-UTF8 bodies are lossily decoded;
    /// the strict JSON parse in [`normalize`] rejects them downstream.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Absent;
        }
        Self::Text(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Normalize a raw webhook body into a structured value.
///
/// Rules:
/// - `Text` is strictly JSON-decoded; on failure the result is `None` and
///   the failure is logged.
/// - `Structured` passes through unchanged (normalization is idempotent).
/// - `Absent` is `None`.
///
/// A `None` result short-circuits the rest of the pipeline; no resolver or
/// evaluator call may happen on it.
pub fn normalize(raw: RawPayload) -> Option<Value> {
    match raw {
        RawPayload::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Webhook payload is not valid JSON, dropping");
                None
            }
        },
        RawPayload::Structured(value) => Some(value),
        RawPayload::Absent => None,
    }
}

/// Normalized inventory change record extracted from an
/// `INVENTORY_LEVELS_UPDATE` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLevelChange {
    /// Platform-internal inventory item identifier (not the SKU)
    pub inventory_item_id: String,
    /// Quantity currently available; negative values are valid
    pub available: i64,
}

impl InventoryLevelChange {
    /// Extract an inventory change record from a normalized payload.
    ///
    /// `inventory_item_id` may arrive as a JSON string or number.
    /// `available` must be a JSON integer; a missing, non-numeric, or
    /// fractional value invalidates the whole record.
    pub fn from_value(value: &Value) -> Option<Self> {
        let inventory_item_id = match value.get("inventory_item_id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                warn!("Webhook payload missing usable inventory_item_id");
                return None;
            }
        };

        let available = match value.get("available") {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => v,
                None => {
                    warn!(value = %n, "Webhook available quantity is not an integer");
                    return None;
                }
            },
            other => {
                warn!(value = ?other, "Webhook payload missing integer available quantity");
                return None;
            }
        };

        Some(Self {
            inventory_item_id,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text_json() {
        let raw = RawPayload::Text(r#"{"inventory_item_id": 999, "available": 5}"#.to_string());
        let value = normalize(raw).unwrap();
        assert_eq!(value["available"], 5);
    }

    #[test]
    fn test_normalize_malformed_text_yields_none() {
        let raw = RawPayload::Text("{not json at all".to_string());
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn test_normalize_structured_is_identity() {
        let value = json!({"inventory_item_id": "999", "available": 3});
        let raw = RawPayload::Structured(value.clone());
        assert_eq!(normalize(raw), Some(value));
    }

    #[test]
    fn test_normalize_absent_yields_none() {
        assert!(normalize(RawPayload::Absent).is_none());
    }

    #[test]
    fn test_from_bytes_empty_is_absent() {
        assert!(matches!(RawPayload::from_bytes(b""), RawPayload::Absent));
    }

    #[test]
    fn test_from_bytes_non_utf8_fails_normalization() {
        let raw = RawPayload::from_bytes(&[0xff, 0xfe, 0x01]);
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn test_extract_numeric_item_id() {
        let value = json!({"inventory_item_id": 999, "available": 5});
        let change = InventoryLevelChange::from_value(&value).unwrap();
        assert_eq!(change.inventory_item_id, "999");
        assert_eq!(change.available, 5);
    }

    #[test]
    fn test_extract_string_item_id() {
        let value = json!({"inventory_item_id": "item-42", "available": 0});
        let change = InventoryLevelChange::from_value(&value).unwrap();
        assert_eq!(change.inventory_item_id, "item-42");
        assert_eq!(change.available, 0);
    }

    #[test]
    fn test_extract_negative_available_is_valid() {
        let value = json!({"inventory_item_id": 1, "available": -4});
        let change = InventoryLevelChange::from_value(&value).unwrap();
        assert_eq!(change.available, -4);
    }

    #[test]
    fn test_extract_missing_available_is_invalid() {
        let value = json!({"inventory_item_id": 1});
        assert!(InventoryLevelChange::from_value(&value).is_none());
    }

    #[test]
    fn test_extract_non_numeric_available_is_invalid() {
        let value = json!({"inventory_item_id": 1, "available": "5"});
        assert!(InventoryLevelChange::from_value(&value).is_none());
    }

    #[test]
    fn test_extract_fractional_available_is_invalid() {
        let value = json!({"inventory_item_id": 1, "available": 5.5});
        assert!(InventoryLevelChange::from_value(&value).is_none());
    }

    #[test]
    fn test_extract_missing_item_id_is_invalid() {
        let value = json!({"available": 5});
        assert!(InventoryLevelChange::from_value(&value).is_none());
    }
}
