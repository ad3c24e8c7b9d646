//! HMAC-SHA256 webhook signature check.
use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the signature header value (`sha256=<hex digest>`).
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies that a webhook body was signed with the shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Returns `true` iff `signature` is `sha256=<hex>` and the digest matches
    /// the HMAC of `body`. The digest comparison is constant-time.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Some(hex_digest) = signature.trim().strip_prefix(SIGNATURE_PREFIX) else {
            return false;
        };
        let Ok(expected) = hex::decode(hex_digest) else {
            return false;
        };

        self.mac(body).verify_slice(&expected).is_ok()
    }

    /// Signature header value for `body`; what a sender would attach.
    pub fn sign(&self, body: &[u8]) -> String {
        let digest = self.mac(body).finalize().into_bytes();
        format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
    }

    fn mac(&self, body: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(body);
        mac
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"ref":"refs/heads/master","after":"abc123"}"#;

    #[test]
    fn accepts_correct_signature() {
        let v = SignatureVerifier::new("It's a Secret to Everybody");
        let sig = v.sign(BODY);

        assert!(sig.starts_with("sha256="));
        assert!(v.verify(BODY, &sig));
        assert!(v.verify(BODY, &sig.to_uppercase().replace("SHA256=", "sha256=")));
    }

    #[test]
    fn matches_known_vector() {
        // Example from GitHub's webhook validation docs.
        let v = SignatureVerifier::new("It's a Secret to Everybody");
        assert!(v.verify(
            b"Hello, World!",
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        ));
    }

    #[test]
    fn rejects_tampered_body_or_wrong_secret() {
        let v = SignatureVerifier::new("secret");
        let sig = v.sign(BODY);

        assert!(!v.verify(b"{\"ref\":\"refs/heads/evil\"}", &sig));
        assert!(!SignatureVerifier::new("other").verify(BODY, &sig));
    }

    #[test]
    fn rejects_malformed_headers() {
        let v = SignatureVerifier::new("secret");
        let sig = v.sign(BODY);
        let bare_hex = sig.trim_start_matches(SIGNATURE_PREFIX).to_string();
        let truncated = &sig[..sig.len() - 2];

        let bad = [
            "",
            "sha256=",
            "sha256=zz",
            "sha1=abcdef",
            bare_hex.as_str(),
            truncated,
        ];

        for header in bad {
            assert!(!v.verify(BODY, header), "expected {header:?} to be rejected");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let v = SignatureVerifier::new("hunter2");
        assert!(!format!("{v:?}").contains("hunter2"));
    }
}
