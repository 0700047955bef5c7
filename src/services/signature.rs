use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Headers the generation service may carry its signature in, in lookup order.
pub const SIGNATURE_HEADERS: [&str; 2] = ["x-fal-signature", "x-webhook-signature"];

const SIGNATURE_PREFIX: &str = "sha256=";

/// Authenticates webhook bodies before they are trusted.
pub trait SignatureVerifier: Send + Sync {
    /// `signature` is the hex digest taken from the request header.
    fn verify(&self, payload: &[u8], signature: &str) -> bool;
}

/// HMAC-SHA256 over the raw request body with a shared secret.
pub struct HmacVerifier {
    secret: Vec<u8>,
}

impl HmacVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Hex-encoded signature for `payload`.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl SignatureVerifier for HmacVerifier {
    fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(payload);
        // Constant-time comparison
        mac.verify_slice(&expected).is_ok()
    }
}

/// Signature from the first signature header present, `sha256=` prefix stripped.
pub fn extract_signature(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix(SIGNATURE_PREFIX).unwrap_or(value))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const BODY: &[u8] = br#"{"job_id":"j1","status":"completed"}"#;

    #[test]
    fn test_sign_then_verify() {
        let verifier = HmacVerifier::new("my-secret");
        let sig = verifier.sign(BODY);
        assert_eq!(sig.len(), 64);
        assert!(verifier.verify(BODY, &sig));
        assert!(verifier.verify(BODY, &sig.to_uppercase()));
    }

    #[test]
    fn test_rejects_tampered_body() {
        let verifier = HmacVerifier::new("my-secret");
        let sig = verifier.sign(BODY);
        assert!(!verifier.verify(br#"{"job_id":"j2","status":"completed"}"#, &sig));
    }

    #[test]
    fn test_rejects_other_secret_and_garbage() {
        let sig = HmacVerifier::new("other").sign(BODY);
        let verifier = HmacVerifier::new("my-secret");
        assert!(!verifier.verify(BODY, &sig));
        assert!(!verifier.verify(BODY, "not-hex"));
        assert!(!verifier.verify(BODY, ""));
        assert!(!verifier.verify(BODY, "abcd"));
    }

    #[test]
    fn test_extract_signature() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_signature(&headers), None);

        headers.insert("x-webhook-signature", HeaderValue::from_static("def456"));
        assert_eq!(extract_signature(&headers), Some("def456"));

        headers.insert("x-fal-signature", HeaderValue::from_static("sha256=abc123"));
        assert_eq!(extract_signature(&headers), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-signature", HeaderValue::from_static("sha256="));
        assert_eq!(extract_signature(&headers), None);
    }
}
