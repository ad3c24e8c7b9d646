use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use uuid::Uuid;

/// Opaque one-time confirmation token embedded in a deploy link.
///
/// Freshly generated tokens are two v4 UUIDs (244 random bits from the OS
/// source; the version and variant bits are fixed) encoded as 43 characters
/// of unpadded URL-safe base64.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConfirmationToken(String);

impl ConfirmationToken {
    /// Generate a new unguessable token.
    pub fn generate() -> Self {
        let mut raw = [0u8; 32];
        raw[..16].copy_from_slice(Uuid::new_v4().as_bytes());
        raw[16..].copy_from_slice(Uuid::new_v4().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConfirmationToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConfirmationToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are bearer secrets; keep them out of debug logs.
impl fmt::Debug for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "ConfirmationToken({prefix}…)")
    }
}
