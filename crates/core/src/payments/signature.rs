//! Gateway callback signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed by `secret`.
/// An empty secret is refused: anyone could compute its digests.
pub fn sign_payment(order_id: &str, payment_id: &str, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(Error::Unexpected("Payment signing secret is empty".to_string()));
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Unexpected(format!("Invalid HMAC secret: {}", e)))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// True iff `signature` is exactly the expected digest. Case and length
/// must match; there is no prefix or case-insensitive match.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    match sign_payment(order_id, payment_id, secret) {
        Ok(expected) => expected == signature,
        Err(_) => false,
    }
}
