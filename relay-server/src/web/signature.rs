//! Inbound webhook signature verification.
//!
//! Senders sign the exact raw request body with HMAC-SHA256 keyed by the
//! shared secret and put the hex digest in a header. The digest may carry a
//! `sha256=` prefix.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_PREFIX: &str = "sha256=";

/// Outcome of the signature gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerdict {
    /// A signature was presented and matches the body.
    Verified,
    /// No signature was presented and the policy lets it through.
    Unsigned,
    /// No signature was presented and the policy requires one.
    Missing,
    /// A signature was presented and does not match (or cannot be checked).
    Invalid,
}

impl SignatureVerdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Verified | Self::Unsigned)
    }
}

/// Compute the lowercase hex HMAC-SHA256 of `body` keyed by `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature of the raw body.
///
/// # Arguments
///
/// * `secret` - Shared webhook secret
/// * `body` - Exact request bytes, before any parsing
/// * `signature` - Presented hex digest, optionally prefixed with `sha256=`
///
/// # Returns
///
/// `true` only if the digest decodes and matches. A blank secret, empty
/// token or non-hex token yields `false`.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let signature = signature.trim();
    let signature = signature.strip_prefix(DIGEST_PREFIX).unwrap_or(signature);

    if secret.trim().is_empty() || signature.is_empty() {
        warn!(
            has_secret = !secret.trim().is_empty(),
            has_signature = !signature.is_empty(),
            "signature_missing_fields"
        );
        return false;
    }

    let presented = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, signature_length = signature.len(), "signature_not_hex");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("signature_invalid_key");
            return false;
        }
    };
    mac.update(body);

    // verify_slice compares in constant time
    match mac.verify_slice(&presented) {
        Ok(()) => true,
        Err(_) => {
            warn!(
                body_length = body.len(),
                signature_length = presented.len(),
                "signature_mismatch"
            );
            false
        }
    }
}

/// Apply the signature policy to one request.
///
/// A presented signature is always checked, even when the secret is not
/// configured (in which case it fails). An absent signature is rejected
/// only when `require_signature` is set.
pub fn check_signature(
    secret: Option<&str>,
    body: &[u8],
    presented: Option<&str>,
    require_signature: bool,
) -> SignatureVerdict {
    match presented {
        Some(signature) => {
            let secret = secret.unwrap_or_default();
            if verify_signature(secret, body, signature) {
                SignatureVerdict::Verified
            } else {
                SignatureVerdict::Invalid
            }
        }
        None if require_signature => {
            warn!("signature_required_but_absent");
            SignatureVerdict::Missing
        }
        None => {
            warn!(
                secret_configured = is_signature_verification_enabled(secret),
                "signature_absent_passing_through"
            );
            SignatureVerdict::Unsigned
        }
    }
}

/// Check if a usable webhook secret is configured.
pub fn is_signature_verification_enabled(secret: Option<&str>) -> bool {
    secret.map(|k| !k.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-webhook-secret";

    #[test]
    fn test_sign_matches_known_digest() {
        // RFC 4231 test case 2
        let digest = sign("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_signature_valid() {
        let body = br#"{"meetingTitle":"Sync"}"#;
        let signature = sign(SECRET, body).unwrap();

        assert!(verify_signature(SECRET, body, &signature));
        assert!(verify_signature(SECRET, body, &signature.to_uppercase()));
        assert!(verify_signature(SECRET, body, &format!("sha256={}", signature)));
    }

    #[test]
    fn test_verify_signature_rejects_body_bit_flips() {
        let body = b"{\"meetingTitle\":\"Sync\"}".to_vec();
        let signature = sign(SECRET, &body).unwrap();

        for byte in 0..body.len() {
            for bit in 0..8 {
                let mut mutated = body.clone();
                mutated[byte] ^= 1 << bit;
                assert!(
                    !verify_signature(SECRET, &mutated, &signature),
                    "accepted body with bit {} of byte {} flipped",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_verify_signature_rejects_signature_bit_flips() {
        let body = b"payload";
        let signature = sign(SECRET, body).unwrap();
        let raw = hex::decode(&signature).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut mutated = raw.clone();
                mutated[byte] ^= 1 << bit;
                assert!(!verify_signature(SECRET, body, &hex::encode(&mutated)));
            }
        }
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        let signature = sign(SECRET, b"body").unwrap();
        assert!(!verify_signature("", b"body", &signature));
        assert!(!verify_signature("   ", b"body", &signature));
        assert!(!verify_signature(SECRET, b"body", ""));
        assert!(!verify_signature(SECRET, b"body", "sha256="));
    }

    #[test]
    fn test_verify_signature_not_hex() {
        assert!(!verify_signature(SECRET, b"body", "not-hex-at-all"));
        assert!(!verify_signature(SECRET, b"body", "abc"));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = sign("other-secret", b"body").unwrap();
        assert!(!verify_signature(SECRET, b"body", &signature));
    }

    #[test]
    fn test_check_signature_policy() {
        let body = b"body";
        let good = sign(SECRET, body).unwrap();

        assert_eq!(
            check_signature(Some(SECRET), body, Some(&good), true),
            SignatureVerdict::Verified
        );
        assert_eq!(
            check_signature(Some(SECRET), body, Some("deadbeef"), false),
            SignatureVerdict::Invalid
        );
        assert_eq!(
            check_signature(Some(SECRET), body, None, true),
            SignatureVerdict::Missing
        );
        assert_eq!(
            check_signature(Some(SECRET), body, None, false),
            SignatureVerdict::Unsigned
        );
        // Presented signature with no secret configured cannot be verified
        assert_eq!(
            check_signature(None, body, Some(&good), false),
            SignatureVerdict::Invalid
        );
    }

    #[test]
    fn test_verdict_acceptance() {
        assert!(SignatureVerdict::Verified.is_accepted());
        assert!(SignatureVerdict::Unsigned.is_accepted());
        assert!(!SignatureVerdict::Missing.is_accepted());
        assert!(!SignatureVerdict::Invalid.is_accepted());
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(None));
        assert!(!is_signature_verification_enabled(Some("")));
        assert!(!is_signature_verification_enabled(Some("   ")));
        assert!(is_signature_verification_enabled(Some("key123")));
    }
}
