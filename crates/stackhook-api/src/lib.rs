//! HTTP surface of the deploy gateway.
//!
//! Routes:
//! - `GET /` - liveness
//! - `POST /hook` - signed push webhook
//! - `GET /deploy/{token}/{commit}` - one-time deploy confirmation
mod adapter;
pub use adapter::GatewayApiAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::{ApiHandler, PushDelivery};

mod http;
pub use http::{HttpApi, SIGNATURE_HEADER};
