#![allow(dead_code)]

use axum_test::TestServer;
use paypal_gateway::{create_router, GatewayConfig, PayPalState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const ACCESS_TOKEN: &str = "A21AAFake-Access-Token";

/// Gateway config pointed at the mock, plus any extra keys.
pub fn test_config(base_url: &str, extra: &[(&str, &str)]) -> GatewayConfig {
    let mut env: HashMap<String, String> = HashMap::from([
        ("PAYPAL_CLIENT_ID".to_string(), CLIENT_ID.to_string()),
        ("PAYPAL_CLIENT_SECRET".to_string(), CLIENT_SECRET.to_string()),
        ("PAYPAL_BASE_URL".to_string(), base_url.to_string()),
    ]);
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    GatewayConfig::from_lookup(|key| env.get(key).cloned()).expect("valid test config")
}

pub fn test_server(mock_server: &MockServer, extra: &[(&str, &str)]) -> TestServer {
    test_server_at(&mock_server.uri(), extra)
}

pub fn test_server_at(base_url: &str, extra: &[(&str, &str)]) -> TestServer {
    let state = PayPalState::new(test_config(base_url, extra)).expect("http client");
    TestServer::new(create_router(Arc::new(state))).expect("test server")
}

/// Mounts the OAuth client-credentials exchange.
pub async fn mount_token(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scope": "https://uri.paypal.com/services/payments/payment",
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "app_id": "APP-80W284485P519543T",
            "expires_in": 32400
        })))
        .mount(mock_server)
        .await;
}

pub fn order_body(order_id: &str, status: &str) -> Value {
    json!({
        "id": order_id,
        "status": status,
        "links": [
            {
                "href": format!("https://api-m.sandbox.paypal.com/v2/checkout/orders/{order_id}"),
                "rel": "self",
                "method": "GET"
            },
            {
                "href": format!("https://www.sandbox.paypal.com/checkoutnow?token={order_id}"),
                "rel": "approve",
                "method": "GET"
            },
            {
                "href": format!("https://api-m.sandbox.paypal.com/v2/checkout/orders/{order_id}/capture"),
                "rel": "capture",
                "method": "POST"
            }
        ]
    })
}
