use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};

use crate::{
    error::ApiError,
    handler::{ApiHandler, PushDelivery},
};

/// Header carrying the webhook HMAC (`sha256=<hex>`).
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(health))
            .route("/hook", post(receive_hook::<H>))
            .route("/deploy/{token}/{commit}", get(confirm_deploy::<H>))
            .with_state(self.handler)
    }
}

/// GET /
async fn health() -> StatusCode {
    StatusCode::OK
}

/// POST /hook
async fn receive_hook<H>(
    State(handler): State<Arc<H>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    H: ApiHandler,
{
    // A header that is not visible ASCII cannot be a valid signature either.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().unwrap_or_default().to_string());
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    handler
        .receive_push(PushDelivery {
            signature,
            content_type,
            body,
        })
        .await?;

    Ok(StatusCode::OK)
}

/// GET /deploy/{token}/{commit}
async fn confirm_deploy<H>(
    State(handler): State<Arc<H>>,
    Path((token, commit)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    H: ApiHandler,
{
    handler.confirm_deploy(&token, &commit).await?;
    Ok(StatusCode::OK)
}
