use async_trait::async_trait;
use axum::body::Bytes;

use crate::error::ApiError;

/// Raw webhook delivery as received on the wire.
#[derive(Debug, Clone)]
pub struct PushDelivery {
    /// Value of the signature header, if present.
    pub signature: Option<String>,
    pub content_type: Option<String>,
    /// Unparsed body; the signature is computed over these exact bytes.
    pub body: Bytes,
}

/// Backend behind the HTTP routes.
///
/// Lets the routes be exercised without a real gateway, and lets embedders
/// wrap the gateway with extra policy.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Verify and act on a push webhook.
    async fn receive_push(&self, delivery: PushDelivery) -> Result<(), ApiError>;

    /// Consume a deploy link and run the deploy.
    async fn confirm_deploy(&self, token: &str, commit: &str) -> Result<(), ApiError>;
}
