use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::Redirect,
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::models::{
    CaptureQuery, CreateWebhookQuery, DeleteWebhookQuery, MessageResponse, OrderStatus,
    PaymentLink, PaymentRequest, WebhookEvent, WebhookRegistration,
};
use crate::paypal::PayPalState;

// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENTS
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn create_payment_link(
    State(state): State<Arc<PayPalState>>,
    payment: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentLink>, GatewayError> {
    let Json(payment) = payment?;
    let return_url = state.config.return_url(payment.service_id.as_deref());
    tracing::info!(
        currency = %payment.currency,
        amount = %payment.amount,
        service_id = ?payment.service_id,
        return_url = ?return_url,
        "Creating payment link"
    );

    let order = state.create_order(&payment, return_url.as_deref()).await?;
    let approval_url = order.approval_url().map(String::from).ok_or_else(|| {
        tracing::error!(order_id = %order.id, "No approval link in PayPal response");
        GatewayError::upstream(None, "Approval URL not found in PayPal response")
    })?;

    Ok(Json(PaymentLink {
        approval_url,
        order_id: order.id,
        return_url,
    }))
}

/// Return-URL target: captures the approved order and sends the payer on.
pub async fn capture_payment(
    State(state): State<Arc<PayPalState>>,
    service_id: Result<Path<String>, PathRejection>,
    query: Result<Query<CaptureQuery>, QueryRejection>,
) -> Result<Redirect, GatewayError> {
    let Path(service_id) = service_id?;
    let Query(query) = query?;
    tracing::info!(%service_id, token = %query.token, "Capturing approved payment");
    state.capture_order(&query.token, &query.payer_id).await?;
    Ok(Redirect::temporary(&state.config.capture_redirect_url))
}

pub async fn check_payment_status(
    State(state): State<Arc<PayPalState>>,
    order_id: Result<Path<String>, PathRejection>,
) -> Result<Json<OrderStatus>, GatewayError> {
    let Path(order_id) = order_id?;
    let order = state.get_order(&order_id).await?;
    Ok(Json(OrderStatus {
        order_id,
        status: order.status,
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// WEBHOOKS
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn create_webhook(
    State(state): State<Arc<PayPalState>>,
    query: Result<Query<CreateWebhookQuery>, QueryRejection>,
) -> Result<Json<WebhookRegistration>, GatewayError> {
    let Query(query) = query?;
    let webhook_url = query.webhook_url.trim();
    if webhook_url.is_empty() {
        return Err(GatewayError::Validation("webhook_url must not be blank".into()));
    }

    let webhook = state.create_webhook(webhook_url).await?;
    Ok(Json(WebhookRegistration {
        webhook_id: webhook.id,
        message: "Webhook created successfully!".into(),
    }))
}

pub async fn list_webhooks(
    State(state): State<Arc<PayPalState>>,
) -> Result<Json<Value>, GatewayError> {
    Ok(Json(state.list_webhooks().await?))
}

pub async fn delete_webhook(
    State(state): State<Arc<PayPalState>>,
    query: Result<Query<DeleteWebhookQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let Query(query) = query?;
    let webhook_id = query.webhook_id.trim();
    if webhook_id.is_empty() {
        return Err(GatewayError::Validation("webhook_id must not be blank".into()));
    }

    state.delete_webhook(webhook_id).await?;
    Ok(Json(MessageResponse {
        message: "Webhook deleted successfully!".into(),
    }))
}

/// Inbound PayPal notifications.
///
/// No signature verification: whoever reaches this route can post any
/// `order_id`/`status` pair. Parse errors are returned to the caller as-is.
pub async fn webhook_listener(body: Bytes) -> Result<Json<WebhookEvent>, GatewayError> {
    let event = WebhookEvent::from_body(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable webhook payload");
        e
    })?;

    if event.is_order_approved() {
        tracing::info!(order_id = ?event.order_id, "Order approved");
    } else {
        tracing::info!(event_type = ?event.status, order_id = ?event.order_id, "Webhook event ignored");
    }

    Ok(Json(event))
}
