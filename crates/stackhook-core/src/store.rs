//! Registry of outstanding confirmation tokens.
//!
//! Every mutation goes through one `Mutex` and removes entries by key, never
//! by position, so `try_consume` and `expire` can race freely: whichever
//! reaches the lock first removes the entry, the other sees it absent.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use stackhook_model::{CommitId, ConfirmationKey, ConfirmationToken, PendingConfirmation};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, trace};

/// Concurrency-safe store of pending confirmations.
#[derive(Debug)]
pub struct TokenStore {
    validity: Duration,
    pending: Mutex<HashMap<ConfirmationKey, PendingConfirmation>>,
}

impl TokenStore {
    pub fn new(validity: Duration) -> Self {
        Self {
            validity,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// How long a freshly inserted confirmation stays usable.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Mint a token for `commit` and register the pair.
    pub fn insert(&self, commit: CommitId) -> ConfirmationToken {
        let mut pending = self.lock();
        let key = loop {
            let key = ConfirmationKey::new(ConfirmationToken::generate(), commit.clone());
            if !pending.contains_key(&key) {
                break key;
            }
        };

        let entry = PendingConfirmation::new(key, self.validity);
        let token = entry.key().token.clone();
        pending.insert(entry.key().clone(), entry);
        trace!(commit = %commit, pending = pending.len(), "confirmation registered");
        token
    }

    /// Remove the pair if it is present and still within its validity window.
    ///
    /// Returns `true` for exactly one caller per registered pair.
    pub fn try_consume(&self, token: &ConfirmationToken, commit: &CommitId) -> bool {
        match self.remove(token, commit) {
            Some(entry) if entry.is_expired_at(Instant::now()) => {
                debug!(commit = %commit, "confirmation found past its validity window");
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Drop the pair if nobody consumed it yet. Returns whether it was still pending.
    pub fn expire(&self, token: &ConfirmationToken, commit: &CommitId) -> bool {
        self.remove(token, commit).is_some()
    }

    /// Non-consuming presence check.
    pub fn contains(&self, token: &ConfirmationToken, commit: &CommitId) -> bool {
        let key = ConfirmationKey::new(token.clone(), commit.clone());
        self.lock()
            .get(&key)
            .is_some_and(|entry| !entry.is_expired_at(Instant::now()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Spawn a one-shot task that expires the pair after the validity window.
    ///
    /// There is no way to cancel it; if the pair is consumed first, the
    /// expiry simply finds nothing to remove.
    pub fn schedule_expiry(
        self: &Arc<Self>,
        token: ConfirmationToken,
        commit: CommitId,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(store.validity).await;
            if store.expire(&token, &commit) {
                debug!(commit = %commit, "confirmation expired unused");
            } else {
                trace!(commit = %commit, "expiry found confirmation already consumed");
            }
        })
    }

    fn remove(&self, token: &ConfirmationToken, commit: &CommitId) -> Option<PendingConfirmation> {
        let key = ConfirmationKey::new(token.clone(), commit.clone());
        self.lock().remove(&key)
    }

    // Every critical section is a single map operation, so a panic elsewhere
    // cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConfirmationKey, PendingConfirmation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
