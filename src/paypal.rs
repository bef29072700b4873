// PayPal REST client: OAuth exchange, orders and webhook subscriptions.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::error::{upstream_message, ConfigError, GatewayError};
use crate::models::{Order, PaymentRequest, TokenResponse, Webhook};

// ═══════════════════════════════════════════════════════════════════════════════
// PAYPAL STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared, read-only after construction. Every call exchanges credentials afresh.
pub struct PayPalState {
    pub config: GatewayConfig,
    pub http_client: Client,
}

impl PayPalState {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let http_client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// PayPal endpoint from path segments. Each segment is percent-encoded on its own,
    /// so a caller-supplied id can never climb out of the resource it names.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(s.trim(), "" | "." | ".."))
        {
            return Err(GatewayError::Validation(format!(
                "invalid PayPal resource id {bad:?}"
            )));
        }

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GatewayError::upstream(None, format!("Invalid PayPal base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::upstream(None, "PayPal base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Client-credentials exchange for a bearer token.
    pub async fn get_access_token(&self) -> Result<String, GatewayError> {
        let auth_str = format!("{}:{}", self.config.client_id, self.config.client_secret);
        let auth_basic = STANDARD.encode(auth_str);
        let params = [("grant_type", "client_credentials")];

        let request = self
            .http_client
            .post(self.url(&["v1", "oauth2", "token"])?)
            .header("Authorization", format!("Basic {}", auth_basic))
            .form(&params);

        let token: TokenResponse = read_json(send(request, "oauth2 token").await?).await?;
        Ok(token.access_token)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self.get_access_token().await?;
        Ok(request.bearer_auth(token))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ORDERS
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn create_order(
        &self,
        payment: &PaymentRequest,
        return_url: Option<&str>,
    ) -> Result<Order, GatewayError> {
        let mut payload = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": payment.currency,
                    "value": payment.amount.to_string(),
                }
            }],
        });
        if let Some(return_url) = return_url {
            payload["payment_source"] = json!({
                "paypal": { "experience_context": { "return_url": return_url } }
            });
        }

        let request = self
            .authorized(self.http_client.post(self.url(&["v2", "checkout", "orders"])?))
            .await?
            .json(&payload);
        let order: Order = read_json(send(request, "create order").await?).await?;

        tracing::info!(order_id = %order.id, status = %order.status, "PayPal order created");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, GatewayError> {
        let request = self
            .authorized(
                self.http_client
                    .get(self.url(&["v2", "checkout", "orders", order_id])?),
            )
            .await?;

        let response = match send(request, "get order").await {
            Ok(response) => response,
            Err(GatewayError::Upstream {
                status: Some(404), ..
            }) => return Err(GatewayError::NotFound(order_id.to_string())),
            Err(e) => return Err(e),
        };
        let order: Order = read_json(response).await?;

        tracing::info!(order_id = %order.id, status = %order.status, "PayPal order fetched");
        Ok(order)
    }

    pub async fn capture_order(&self, order_id: &str, payer_id: &str) -> Result<Value, GatewayError> {
        let request = self
            .authorized(
                self.http_client
                    .post(self.url(&["v2", "checkout", "orders", order_id, "capture"])?),
            )
            .await?
            .json(&json!({ "payer": { "payer_id": payer_id } }));
        let body: Value = read_json(send(request, "capture order").await?).await?;

        tracing::info!(order_id, payer_id, status = ?body["status"], "PayPal payment captured");
        Ok(body)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WEBHOOK SUBSCRIPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn create_webhook(&self, webhook_url: &str) -> Result<Webhook, GatewayError> {
        let event_types: Vec<Value> = self
            .config
            .webhook_events
            .iter()
            .map(|name| json!({ "name": name }))
            .collect();

        let request = self
            .authorized(self.http_client.post(self.url(&["v1", "notifications", "webhooks"])?))
            .await?
            .json(&json!({ "url": webhook_url, "event_types": event_types }));
        let webhook: Webhook = read_json(send(request, "create webhook").await?).await?;

        tracing::info!(webhook_id = %webhook.id, webhook_url, "PayPal webhook registered");
        Ok(webhook)
    }

    pub async fn list_webhooks(&self) -> Result<Value, GatewayError> {
        let request = self
            .authorized(self.http_client.get(self.url(&["v1", "notifications", "webhooks"])?))
            .await?;
        read_json(send(request, "list webhooks").await?).await
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), GatewayError> {
        let request = self
            .authorized(
                self.http_client
                    .delete(self.url(&["v1", "notifications", "webhooks", webhook_id])?),
            )
            .await?;
        send(request, "delete webhook").await?;

        tracing::info!(webhook_id, "PayPal webhook deleted");
        Ok(())
    }
}

/// Sends the request; any non-2xx answer becomes an upstream error carrying PayPal's message.
async fn send(request: RequestBuilder, action: &str) -> Result<Response, GatewayError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(action, error = %e, "PayPal unreachable");
        GatewayError::from(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(action, status = status.as_u16(), error = %e, "Failed to read PayPal error body");
            String::new()
        }
    };
    let message = upstream_message(status.as_u16(), &body);
    tracing::error!(action, status = status.as_u16(), %message, "PayPal rejected request");
    Err(GatewayError::upstream(Some(status.as_u16()), message))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let body = response.text().await?;
    tracing::debug!(%body, "PayPal response");
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::upstream(None, format!("Invalid PayPal response: {e}")))
}
