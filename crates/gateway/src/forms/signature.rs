//! Webhook signature verification.
//!
//! Deployments that enable signing on the form service side set
//! `FORMS_WEBHOOK_SECRET`; the service then sends
//! `X-Webhook-Timestamp` and `X-Webhook-Signature` headers, the latter being
//! `v0=` followed by the hex HMAC-SHA256 of `v0:{timestamp}:{body}`.
//! Deployments without a secret skip verification entirely (the original
//! handlers were unauthenticated).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

/// Maximum allowed clock skew between the timestamp header and now.
const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

/// Signature verification failures.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid timestamp header")]
    InvalidTimestamp,
    #[error("request timestamp too old")]
    TimestampTooOld,
    #[error("signature mismatch")]
    Mismatch,
    #[error("invalid signing key")]
    InvalidKey,
}

/// Verify a webhook signature against the raw request body.
///
/// # Arguments
///
/// * `secret` - The shared signing secret
/// * `timestamp` - The `X-Webhook-Timestamp` header value (unix seconds)
/// * `body` - The raw request body
/// * `signature` - The `X-Webhook-Signature` header value
///
/// # Errors
///
/// Returns `SignatureError` when the timestamp is unparseable or outside the
/// replay window, or the signature does not match.
pub fn verify_signature(
    secret: &SecretString,
    timestamp: &str,
    body: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    // Bound the replay window before doing any crypto
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;

    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|_| SignatureError::InvalidTimestamp)?
        .as_secs();
    let now = i64::try_from(now_secs).map_err(|_| SignatureError::InvalidTimestamp)?;

    if (now - ts).abs() > MAX_TIMESTAMP_SKEW_SECS {
        return Err(SignatureError::TimestampTooOld);
    }

    let sig_basestring = format!("v0:{timestamp}:{body}");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(sig_basestring.as_bytes());

    let expected = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

    if !constant_time_compare(&expected, signature) {
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("fq2o8urgl4jq0m1xnzke")
    }

    fn now_timestamp() -> String {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before epoch")
            .as_secs()
            .to_string()
    }

    fn sign(timestamp: &str, body: &str) -> String {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(secret().expose_secret().as_bytes()).unwrap();
        mac.update(format!("v0:{timestamp}:{body}").as_bytes());
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature() {
        let timestamp = now_timestamp();
        let body = r#"{"name":"Ada"}"#;
        let signature = sign(&timestamp, body);

        assert!(verify_signature(&secret(), &timestamp, body, &signature).is_ok());
    }

    #[test]
    fn test_tampered_body() {
        let timestamp = now_timestamp();
        let signature = sign(&timestamp, r#"{"name":"Ada"}"#);

        let result = verify_signature(&secret(), &timestamp, r#"{"name":"Eve"}"#, &signature);
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn test_invalid_timestamp() {
        let result = verify_signature(&secret(), "not-a-number", "body", "v0=sig");
        assert!(matches!(result, Err(SignatureError::InvalidTimestamp)));
    }

    #[test]
    fn test_old_timestamp() {
        let old = (std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            - 600)
            .to_string();
        let body = "body";
        let signature = sign(&old, body);

        let result = verify_signature(&secret(), &old, body, &signature);
        assert!(matches!(result, Err(SignatureError::TimestampTooOld)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }
}
