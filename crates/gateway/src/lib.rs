//! HTTP client for the third-party payment gateway.
//!
//! Talks to a Razorpay-compatible REST API (orders, payments, refunds) using
//! HTTP basic auth with the merchant key pair, and implements
//! [`PaymentGatewayTrait`](spendquest_core::payments::PaymentGatewayTrait) so
//! the core payment service never sees transport details.

mod client;
mod error;

pub use client::{GatewayClient, GatewayConfig, DEFAULT_GATEWAY_URL};
pub use error::GatewayError;
