use stackhook_model::ModelError;
use thiserror::Error;

/// Why a webhook delivery or confirmation request was not carried out.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("signature does not match payload")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ModelError),

    /// Unknown token, wrong commit, already consumed or expired.
    #[error("no pending confirmation for this link")]
    NotFound,

    #[error("deploy failed: {0}")]
    Deploy(#[from] DeployError),
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("copying deploy script failed: {0}")]
    Copy(String),

    #[error("remote command failed: {0}")]
    Remote(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by messaging API (status {status}): {description}")]
    Rejected { status: u16, description: String },
}
