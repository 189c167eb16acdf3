//! Notification Dispatch
//!
//! Composes and sends the low-stock alert email. All recipients go out in
//! one delivery rather than individually addressed messages. An empty
//! recipient set is a no-op, not an error, and a transport failure is
//! reported without retry — alert delivery is at-most-once, best-effort.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::evaluate::AlertDecision;

/// A composed email ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Sender address
    pub from: String,
    /// All recipients, delivered together as one message
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text_body: String,
    /// HTML body
    pub html_body: String,
}

/// Email transport seam
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send one message to all of its recipients
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Compose the alert email for a decision
pub fn compose_alert(decision: &AlertDecision, from: &str, recipients: Vec<String>) -> EmailMessage {
    let subject = format!(
        "Low stock alert: {} has {} left",
        decision.sku, decision.available
    );
    let text_body = format!(
        "Stock for SKU {} dropped to {}, below the configured minimum of {}.\n\
         Restock soon to avoid selling out.",
        decision.sku, decision.available, decision.threshold
    );
    let html_body = format!(
        "<p>Stock for SKU <strong>{}</strong> dropped to <strong>{}</strong>, \
         below the configured minimum of {}.</p>\
         <p>Restock soon to avoid selling out.</p>",
        decision.sku, decision.available, decision.threshold
    );

    EmailMessage {
        from: from.to_string(),
        to: recipients,
        subject,
        text_body,
        html_body,
    }
}

/// Send an alert to the recipient set.
///
/// Returns `Ok(false)` when the recipient set is empty (nothing sent,
/// success), `Ok(true)` when the message went out.
pub async fn dispatch_alert(
    mailer: &dyn Mailer,
    from: &str,
    recipients: Vec<String>,
    decision: &AlertDecision,
) -> Result<bool, NotifyError> {
    if recipients.is_empty() {
        info!(sku = %decision.sku, "No alert recipients configured, skipping send");
        return Ok(false);
    }

    let message = compose_alert(decision, from, recipients);
    mailer.send(&message).await?;
    info!(
        sku = %decision.sku,
        available = decision.available,
        recipients = message.to.len(),
        "Low-stock alert sent"
    );
    Ok(true)
}

/// Mailer backed by the SendGrid v3 API
pub struct SendGridMailer {
    api_key: String,
    client: reqwest::Client,
}

impl SendGridMailer {
    /// SendGrid v3 mail send endpoint
    const ENDPOINT: &'static str = "https://api.sendgrid.com/v3/mail/send";

    /// Create a mailer with the given API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        // One personalization carrying every recipient keeps this a single
        // delivery rather than per-recipient messages.
        let to: Vec<_> = message.to.iter().map(|email| json!({"email": email})).collect();
        let payload = json!({
            "personalizations": [{
                "to": to,
                "subject": message.subject
            }],
            "from": {"email": message.from},
            "content": [
                {"type": "text/plain", "value": message.text_body},
                {"type": "text/html", "value": message.html_body}
            ]
        });

        let response = self
            .client
            .post(Self::ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(error = %error_text, "SendGrid rejected alert email");
            Err(NotifyError::SendFailed(format!(
                "SendGrid API error: {error_text}"
            )))
        }
    }
}

/// Mailer that logs messages instead of sending them (development mode)
#[derive(Debug, Default, Clone)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!(
            to = ?message.to,
            subject = %message.subject,
            body = %message.text_body,
            "EMAIL (console mailer, not delivered)"
        );
        Ok(())
    }
}
