use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GatewayError;
use spendquest_core::errors::Result;
use spendquest_core::payments::{
    GatewayOrder, GatewayPayment, GatewayRefund, OrderRequest, PaymentGatewayTrait,
};

/// Default timeout for gateway requests. Order creation has its own, shorter
/// deadline in the payment service.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_GATEWAY_URL: &str = "https://api.razorpay.com/v1";

/// Connection settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            key_id: String::new(),
            key_secret: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Upstream error body: {"error": {"code": "...", "description": "..."}}
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefundBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<i64>,
}

/// REST client for orders, payments and refunds.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> std::result::Result<Self, GatewayError> {
        if config.base_url.trim().is_empty() {
            return Err(GatewayError::Config("gateway base URL is empty".to_string()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id,
            key_secret: config.key_secret,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, GatewayError> {
        let url = self.url(path);
        debug!("[Gateway] GET {}", url);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, GatewayError> {
        let url = self.url(path);
        debug!("[Gateway] POST {}", url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }
}

/// Turns a non-2xx response into [`GatewayError::Api`] with the upstream
/// description when one is present.
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(err) => err
                .error
                .description
                .or(err.error.code)
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => body.chars().take(200).collect(),
        };
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl PaymentGatewayTrait for GatewayClient {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        Ok(self.post("/orders", &request).await?)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment> {
        Ok(self.get(&format!("/payments/{}", payment_id)).await?)
    }

    async fn refund(&self, payment_id: &str, amount: Option<i64>) -> Result<GatewayRefund> {
        let path = format!("/payments/{}/refund", payment_id);
        Ok(self.post(&path, &RefundBody { amount }).await?)
    }
}
