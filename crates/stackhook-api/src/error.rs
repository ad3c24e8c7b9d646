use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stackhook_core::GatewayError;
use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced to HTTP callers. The status code is the only signal they get.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotFound => ApiError::NotFound,
            GatewayError::Deploy(_) => ApiError::Internal(e.to_string()),
            GatewayError::MissingSignature
            | GatewayError::InvalidSignature
            | GatewayError::InvalidPayload(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            info!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use stackhook_core::DeployError;

    use super::*;

    #[test]
    fn gateway_errors_map_to_statuses() {
        let cases = [
            (GatewayError::MissingSignature, StatusCode::BAD_REQUEST),
            (GatewayError::InvalidSignature, StatusCode::BAD_REQUEST),
            (GatewayError::NotFound, StatusCode::NOT_FOUND),
            (
                GatewayError::Deploy(DeployError::Remote("exit 1".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn response_carries_status() {
        let resp = ApiError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
