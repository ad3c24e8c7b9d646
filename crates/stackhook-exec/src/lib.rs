//! Remote-shell transport for `stackhook_core::RemoteTransport`.
//!
//! Spawns `scp`/`ssh` via `tokio::process::Command` with every argument
//! passed separately; the one string that must reach the remote shell is
//! assembled with POSIX quoting in [`quote`].
mod error;
pub use error::ExecError;

mod output;
pub use output::OutputLogConfig;

pub mod quote;

mod runner;
pub use runner::run_program;

pub mod ssh;
pub use ssh::{SshTarget, SshTransport};
