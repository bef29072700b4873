use reqwest::Url;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WEBHOOK_EVENT: &str = "CHECKOUT.ORDER.APPROVED";
pub const DEFAULT_CAPTURE_REDIRECT_URL: &str = "https://www.example.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 3000;

/// Immutable gateway settings, read once at startup.
#[derive(Clone)]
pub struct GatewayConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Sandbox (`https://api-m.sandbox.paypal.com`) or live (`https://api-m.paypal.com`).
    pub base_url: String,
    /// `RETURN_BASE` + `RETURN_ENDPOINT`, only when both are set.
    pub return_prefix: Option<String>,
    pub capture_redirect_url: String,
    pub webhook_events: Vec<String>,
    pub http_timeout: Duration,
    pub port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let client_id = required("PAYPAL_CLIENT_ID")?;
        let client_secret = required("PAYPAL_CLIENT_SECRET")?;

        let base_url = required("PAYPAL_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::Invalid {
                    key: "PAYPAL_BASE_URL",
                    reason: format!("expected an http(s) URL, got {base_url:?}"),
                })
            }
        }

        let return_prefix = match (optional("RETURN_BASE"), optional("RETURN_ENDPOINT")) {
            (Some(base), Some(endpoint)) => Some(format!("{base}{endpoint}")),
            _ => None,
        };

        let capture_redirect_url = optional("CAPTURE_REDIRECT_URL")
            .unwrap_or_else(|| DEFAULT_CAPTURE_REDIRECT_URL.to_string());

        let webhook_events = optional("PAYPAL_WEBHOOK_EVENTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|events| !events.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_WEBHOOK_EVENT.to_string()]);

        let timeout_secs = match optional("PAYPAL_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PAYPAL_HTTP_TIMEOUT_SECS",
                        reason: format!("expected a positive number of seconds, got {raw:?}"),
                    })
                }
            },
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let port = match optional("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            client_id,
            client_secret,
            base_url,
            return_prefix,
            capture_redirect_url,
            webhook_events,
            http_timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }

    /// Where PayPal sends the payer back after approval.
    pub fn return_url(&self, service_id: Option<&str>) -> Option<String> {
        match (&self.return_prefix, service_id) {
            (Some(prefix), Some(id)) if !id.is_empty() => Some(format!("{prefix}{id}")),
            _ => None,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("return_prefix", &self.return_prefix)
            .field("capture_redirect_url", &self.capture_redirect_url)
            .field("webhook_events", &self.webhook_events)
            .field("http_timeout", &self.http_timeout)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| env.get(key).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("PAYPAL_CLIENT_ID", "client"),
        ("PAYPAL_CLIENT_SECRET", "secret"),
        ("PAYPAL_BASE_URL", "https://api-m.sandbox.paypal.com/"),
    ];

    #[test]
    fn loads_required_keys_with_defaults() {
        let config = load(&BASE).unwrap();
        assert_eq!(config.client_id, "client");
        assert_eq!(config.base_url, "https://api-m.sandbox.paypal.com");
        assert_eq!(config.webhook_events, vec!["CHECKOUT.ORDER.APPROVED"]);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.port, 3000);
        assert_eq!(config.capture_redirect_url, "https://www.example.com");
        assert!(config.return_prefix.is_none());
    }

    #[test]
    fn each_required_key_is_fatal_when_missing() {
        for skip in 0..BASE.len() {
            let pairs: Vec<_> = BASE
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| *p)
                .collect();
            match load(&pairs) {
                Err(ConfigError::Missing(key)) => assert_eq!(key, BASE[skip].0),
                other => panic!("expected missing {}, got {other:?}", BASE[skip].0),
            }
        }
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[1] = ("PAYPAL_CLIENT_SECRET", "   ");
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Missing("PAYPAL_CLIENT_SECRET"))
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("PAYPAL_BASE_URL", "api-m.paypal.com");
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid { key: "PAYPAL_BASE_URL", .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PAYPAL_HTTP_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid { key: "PAYPAL_HTTP_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn parses_webhook_event_list() {
        let mut pairs = BASE.to_vec();
        pairs.push((
            "PAYPAL_WEBHOOK_EVENTS",
            "CHECKOUT.ORDER.APPROVED, PAYMENT.CAPTURE.COMPLETED,",
        ));
        let config = load(&pairs).unwrap();
        assert_eq!(
            config.webhook_events,
            vec!["CHECKOUT.ORDER.APPROVED", "PAYMENT.CAPTURE.COMPLETED"]
        );
    }

    #[test]
    fn return_url_needs_prefix_and_service_id() {
        let mut pairs = BASE.to_vec();
        pairs.push(("RETURN_BASE", "https://shop.example"));
        pairs.push(("RETURN_ENDPOINT", "/paypal_payment_capture/"));
        let config = load(&pairs).unwrap();
        assert_eq!(
            config.return_url(Some("svc-1")).as_deref(),
            Some("https://shop.example/paypal_payment_capture/svc-1")
        );
        assert_eq!(config.return_url(None), None);

        let bare = load(&BASE).unwrap();
        assert_eq!(bare.return_url(Some("svc-1")), None);
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = load(&BASE).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
