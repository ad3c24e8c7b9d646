//! Webhook and confirmation flows.
//!
//! Lock order: the deploy slot is always taken before the token store's
//! mutex, and the store's mutex is never held while waiting for the slot or
//! for any network call.
use std::sync::Arc;

use stackhook_model::{Branch, CommitId, ConfirmationToken, PushEvent};
use tracing::{debug, info, instrument, warn};

use crate::{
    deploy::{DeploySlot, Deployer},
    error::GatewayError,
    message::Messages,
    notify::{InlineLink, Notifier},
    signature::SignatureVerifier,
    store::TokenStore,
};

/// Label of the button attached to the confirmation message.
const DEPLOY_BUTTON: &str = "Deploy";

/// Static settings of the single managed stack.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Only pushes to this branch start a confirmation.
    pub branch: Branch,
    /// Public base URL deploy links are built on.
    pub public_url: String,
    /// Stack name shown in notifications.
    pub stack_name: String,
}

/// Result of an accepted webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A confirmation was registered and announced.
    Registered {
        token: ConfirmationToken,
        commit: CommitId,
        link: String,
    },
    /// Push to another branch; nothing to do.
    IgnoredBranch { git_ref: String },
}

/// Result of a confirmation that ran a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed { commit: CommitId },
}

pub struct Gateway {
    settings: GatewaySettings,
    messages: Messages,
    verifier: SignatureVerifier,
    store: Arc<TokenStore>,
    notifier: Arc<dyn Notifier>,
    deployer: Arc<dyn Deployer>,
    slot: DeploySlot,
}

impl Gateway {
    pub fn new(
        settings: GatewaySettings,
        verifier: SignatureVerifier,
        store: Arc<TokenStore>,
        notifier: Arc<dyn Notifier>,
        deployer: Arc<dyn Deployer>,
    ) -> Self {
        let messages = Messages::new(settings.stack_name.clone(), settings.branch.clone());
        Self {
            settings,
            messages,
            verifier,
            store,
            notifier,
            deployer,
            slot: DeploySlot::new(),
        }
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Link that confirms `commit` with `token`.
    pub fn deploy_link(&self, token: &ConfirmationToken, commit: &CommitId) -> String {
        format!(
            "{}/deploy/{}/{}",
            self.settings.public_url.trim_end_matches('/'),
            token,
            commit
        )
    }

    /// Handle one webhook delivery.
    ///
    /// The signature is checked against the raw body before anything is parsed.
    #[instrument(level = "debug", skip_all, fields(body_len = body.len()))]
    pub async fn handle_push(
        &self,
        signature: Option<&str>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<PushOutcome, GatewayError> {
        let Some(signature) = signature else {
            info!("webhook without signature rejected");
            return Err(GatewayError::MissingSignature);
        };
        if !self.verifier.verify(body, signature) {
            info!("webhook with invalid signature rejected");
            return Err(GatewayError::InvalidSignature);
        }

        let push = PushEvent::from_body(content_type, body)
            .and_then(PushEvent::validate)
            .inspect_err(|e| info!(error = %e, "webhook payload rejected"))?;

        if !self.settings.branch.matches_ref(&push.git_ref) {
            info!(git_ref = %push.git_ref, branch = %self.settings.branch, "push to another branch ignored");
            return Ok(PushOutcome::IgnoredBranch {
                git_ref: push.git_ref,
            });
        }

        let token = self.store.insert(push.commit.clone());
        self.store
            .schedule_expiry(token.clone(), push.commit.clone());

        let link = self.deploy_link(&token, &push.commit);
        info!(
            commit = %push.commit,
            valid_for_secs = self.store.validity().as_secs(),
            "confirmation registered"
        );

        let text = self.messages.confirmation(&push.commit, &push.commits);
        self.notify(&text, Some(&InlineLink::new(DEPLOY_BUTTON, link.clone())))
            .await;

        Ok(PushOutcome::Registered {
            token,
            commit: push.commit,
            link,
        })
    }

    /// Handle a click on a deploy link.
    ///
    /// Every lookup failure maps to [`GatewayError::NotFound`] so callers
    /// cannot tell unknown, mismatched, consumed and expired links apart.
    #[instrument(level = "debug", skip_all, fields(commit = %commit))]
    pub async fn handle_confirmation(
        &self,
        token: &str,
        commit: &str,
    ) -> Result<DeployOutcome, GatewayError> {
        if token.is_empty() {
            return Err(GatewayError::NotFound);
        }
        let Ok(commit) = CommitId::new(commit) else {
            debug!("malformed commit in deploy link");
            return Err(GatewayError::NotFound);
        };
        let token = ConfirmationToken::from(token);

        // Cheap rejection of dead links without queueing behind a running deploy.
        if !self.store.contains(&token, &commit) {
            info!("deploy link not pending");
            return Err(GatewayError::NotFound);
        }

        let _slot = self.slot.acquire().await;
        if !self.store.try_consume(&token, &commit) {
            info!("deploy link consumed or expired while waiting");
            return Err(GatewayError::NotFound);
        }

        info!("deploy confirmed");
        self.notify(&self.messages.deploying(&commit), None).await;

        match self.deployer.deploy(&commit).await {
            Ok(()) => {
                info!("deploy succeeded");
                self.notify(&self.messages.deployed(&commit), None).await;
                Ok(DeployOutcome::Deployed { commit })
            }
            Err(e) => {
                warn!(error = %e, "deploy failed");
                self.notify(&self.messages.failed(&commit, &e.to_string()), None)
                    .await;
                Err(GatewayError::Deploy(e))
            }
        }
    }

    async fn notify(&self, text: &str, link: Option<&InlineLink>) {
        if let Err(e) = self.notifier.send_message(text, link).await {
            warn!(error = %e, "notification failed");
        }
    }
}
