//! HTTP front for the PayPal REST API: payment links, order status,
//! webhook subscriptions and an inbound notification listener.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod paypal;

pub use app::create_router;
pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use paypal::PayPalState;
