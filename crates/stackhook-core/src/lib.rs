//! Confirmation workflow between a push webhook and a remote deployment.
//!
//! - [`SignatureVerifier`] authenticates inbound webhook bodies.
//! - [`TokenStore`] holds single-use confirmation tokens with expiry.
//! - [`DeployExecutor`] drives a [`RemoteTransport`] behind a process-wide [`DeploySlot`].
//! - [`Gateway`] wires the above into the webhook and confirmation flows.
pub mod deploy;
pub mod error;
pub mod gateway;
pub mod message;
pub mod notify;
pub mod signature;
pub mod store;

pub use deploy::{
    DeployExecutor, DeployPlan, DeploySlot, Deployer, RemoteScript, RemoteStep, RemoteTransport,
};
pub use error::{DeployError, GatewayError, NotifyError};
pub use gateway::{DeployOutcome, Gateway, GatewaySettings, PushOutcome};
pub use notify::{InlineLink, Notifier};
pub use signature::{SIGNATURE_PREFIX, SignatureVerifier};
pub use store::TokenStore;
