use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    capture_payment, check_payment_status, create_payment_link, create_webhook, delete_webhook,
    list_webhooks, webhook_listener,
};
use crate::paypal::PayPalState;

pub fn create_router(state: Arc<PayPalState>) -> Router {
    Router::new()
        .route("/create-payment-link/", post(create_payment_link))
        .route("/paypal_payment_capture/:service_id", get(capture_payment))
        .route("/check-payment-status/:order_id", get(check_payment_status))
        .route("/create-webhook/", post(create_webhook))
        .route("/list-webhooks", get(list_webhooks))
        .route("/delete-webhook/", delete(delete_webhook))
        .route("/webhook-listener/", post(webhook_listener))
        .route("/health", get(|| async { "OK" }))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
