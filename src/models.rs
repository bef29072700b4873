use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

pub const ORDER_APPROVED_EVENT: &str = "CHECKOUT.ORDER.APPROVED";

// ═══════════════════════════════════════════════════════════════════════════════
// GATEWAY REQUESTS / RESPONSES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    /// ISO 4217 code, passed to PayPal unchecked.
    pub currency: String,
    pub amount: Decimal,
    #[serde(default)]
    pub service_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLink {
    pub approval_url: String,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhookQuery {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteWebhookQuery {
    pub webhook_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRegistration {
    pub webhook_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Query PayPal appends to the return URL once the payer approves.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureQuery {
    pub token: String,
    #[serde(rename = "PayerID")]
    pub payer_id: String,
}

/// The two fields read out of an inbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub order_id: Option<String>,
    pub status: Option<String>,
}

impl WebhookEvent {
    /// Reads `resource.id` and `event_type`. Absent or `null` fields come back as `None`;
    /// anything else of the wrong JSON type is a payload error.
    pub fn from_body(body: &[u8]) -> Result<Self, GatewayError> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|e| GatewayError::Payload(e.to_string()))?;
        let payload = payload
            .as_object()
            .ok_or_else(|| GatewayError::Payload("webhook payload must be a JSON object".into()))?;

        let order_id = match payload.get("resource") {
            None => None,
            Some(Value::Object(resource)) => string_field(resource.get("id"), "resource.id")?,
            Some(_) => {
                return Err(GatewayError::Payload(
                    "webhook resource must be a JSON object".into(),
                ))
            }
        };
        let status = string_field(payload.get("event_type"), "event_type")?;

        Ok(Self { order_id, status })
    }

    pub fn is_order_approved(&self) -> bool {
        self.status.as_deref() == Some(ORDER_APPROVED_EVENT)
    }
}

fn string_field(value: Option<&Value>, name: &str) -> Result<Option<String>, GatewayError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GatewayError::Payload(format!(
            "webhook {name} must be a string, got {other}"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYPAL WIRE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDescription {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

impl Order {
    /// `approve` link, or `payer-action` when the order was created with a payment source.
    pub fn approval_url(&self) -> Option<&str> {
        ["approve", "payer-action"].iter().find_map(|rel| {
            self.links
                .iter()
                .find(|link| link.rel == *rel)
                .map(|link| link.href.as_str())
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
    pub id: String,
}
