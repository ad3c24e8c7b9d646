use std::time::Duration;

use tokio::time::Instant;

use crate::{CommitId, ConfirmationToken};

/// Identity of a pending confirmation: the token alone is not enough,
/// it must be presented together with the commit it was minted for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfirmationKey {
    pub token: ConfirmationToken,
    pub commit: CommitId,
}

impl ConfirmationKey {
    pub fn new(token: ConfirmationToken, commit: CommitId) -> Self {
        Self { token, commit }
    }
}

/// One outstanding, unconsumed deploy approval.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    key: ConfirmationKey,
    created_at: Instant,
    validity: Duration,
}

impl PendingConfirmation {
    /// Create a confirmation that starts its validity window now.
    pub fn new(key: ConfirmationKey, validity: Duration) -> Self {
        Self {
            key,
            created_at: Instant::now(),
            validity,
        }
    }

    pub fn key(&self) -> &ConfirmationKey {
        &self.key
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Point in time after which the confirmation can no longer be used.
    ///
    /// `None` when the window reaches past what the clock can represent;
    /// such a confirmation never expires on its own.
    pub fn expires_at(&self) -> Option<Instant> {
        self.created_at.checked_add(self.validity)
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ConfirmationKey {
        ConfirmationKey::new(
            ConfirmationToken::from("tok"),
            CommitId::new("abc123").unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_validity_window() {
        let p = PendingConfirmation::new(key(), Duration::from_secs(120));

        assert_eq!(
            p.expires_at(),
            Some(p.created_at() + Duration::from_secs(120))
        );
        assert!(!p.is_expired_at(Instant::now()));

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(!p.is_expired_at(Instant::now()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(p.is_expired_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_window_never_expires() {
        let p = PendingConfirmation::new(key(), Duration::from_secs(u64::MAX));

        assert_eq!(p.expires_at(), None);
        assert!(!p.is_expired_at(Instant::now()));

        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert!(!p.is_expired_at(Instant::now()));
    }

    #[test]
    fn key_equality_needs_both_parts() {
        let a = key();
        let b = ConfirmationKey::new(
            ConfirmationToken::from("tok"),
            CommitId::new("def456").unwrap(),
        );

        assert_ne!(a, b);
        assert_eq!(a, key());
    }
}
