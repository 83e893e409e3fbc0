use spendquest_core::errors::{Error, PaymentError};
use thiserror::Error;

/// Failures talking to the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid gateway configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// HTTP status reported upstream; 502 when the gateway never answered.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::Api { status, .. } => *status,
            GatewayError::Transport(e) => e.status().map(|s| s.as_u16()).unwrap_or(502),
            GatewayError::Decode(_) | GatewayError::Config(_) => 502,
        }
    }
}

impl From<GatewayError> for Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(msg) => Error::Unexpected(msg),
            GatewayError::Api { status, message } => PaymentError::gateway(status, message).into(),
            other => PaymentError::gateway(other.status(), other.to_string()).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_upstream_status() {
        let err: Error = GatewayError::Api {
            status: 400,
            message: "The amount must be at least INR 1.00".to_string(),
        }
        .into();
        match err {
            Error::Payment(PaymentError::Gateway { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("at least INR 1.00"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_maps_to_bad_gateway() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = GatewayError::from(decode).into();
        assert!(matches!(
            err,
            Error::Payment(PaymentError::Gateway { status: 502, .. })
        ));
    }
}
