use std::sync::Arc;

use async_trait::async_trait;
use stackhook_core::Gateway;

use crate::{
    error::ApiError,
    handler::{ApiHandler, PushDelivery},
};

/// [`ApiHandler`] that delegates to a [`Gateway`].
pub struct GatewayApiAdapter {
    gateway: Arc<Gateway>,
}

impl GatewayApiAdapter {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ApiHandler for GatewayApiAdapter {
    async fn receive_push(&self, delivery: PushDelivery) -> Result<(), ApiError> {
        self.gateway
            .handle_push(
                delivery.signature.as_deref(),
                delivery.content_type.as_deref(),
                &delivery.body,
            )
            .await
            .map(|_| ())
            .map_err(ApiError::from)
    }

    async fn confirm_deploy(&self, token: &str, commit: &str) -> Result<(), ApiError> {
        self.gateway
            .handle_confirmation(token, commit)
            .await
            .map(|_| ())
            .map_err(ApiError::from)
    }
}
