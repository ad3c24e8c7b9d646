//! Deployment over a remote-shell transport.
//!
//! The executor knows *what* to run on the target host; the transport knows
//! *how* to get there. Commands are kept as program + argument lists all the
//! way down so that commit ids and branch names are never spliced into a
//! command line as text.
mod plan;
pub use plan::{DeployPlan, RemoteScript, RemoteStep};

mod slot;
pub use slot::{DeploySlot, DeploySlotGuard};

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use stackhook_model::CommitId;
use tracing::{info, instrument};

use crate::error::DeployError;

/// Secure copy + remote command execution on the deployment target.
#[async_trait]
pub trait RemoteTransport: Send + Sync + 'static {
    /// Copy a local file into `remote_dir` on the target host.
    async fn copy_file(&self, local: &Path, remote_dir: &str) -> Result<(), DeployError>;

    /// Run `script` on the target host; a non-zero exit is an error.
    async fn run(&self, script: &RemoteScript) -> Result<(), DeployError>;
}

/// Deploys one commit. Callers serialize calls through a [`DeploySlot`].
#[async_trait]
pub trait Deployer: Send + Sync + 'static {
    async fn deploy(&self, commit: &CommitId) -> Result<(), DeployError>;
}

/// Copies the stack script to the target and runs the deploy sequence.
pub struct DeployExecutor {
    plan: DeployPlan,
    transport: Arc<dyn RemoteTransport>,
}

impl DeployExecutor {
    pub fn new(plan: DeployPlan, transport: Arc<dyn RemoteTransport>) -> Self {
        Self { plan, transport }
    }
}

#[async_trait]
impl Deployer for DeployExecutor {
    #[instrument(level = "info", skip(self), fields(commit = %commit, stack = %self.plan.stack_name))]
    async fn deploy(&self, commit: &CommitId) -> Result<(), DeployError> {
        self.transport
            .copy_file(&self.plan.script, &self.plan.stack_dir)
            .await?;

        let script = self.plan.script_for(commit);
        self.transport.run(&script).await?;

        info!("deploy finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Mutex};

    use stackhook_model::Branch;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Copy(PathBuf, String),
        Run(RemoteScript),
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<Call>>,
        fail_copy: bool,
        fail_run: bool,
    }

    #[async_trait]
    impl RemoteTransport for RecordingTransport {
        async fn copy_file(&self, local: &Path, remote_dir: &str) -> Result<(), DeployError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Copy(local.to_path_buf(), remote_dir.to_string()));
            if self.fail_copy {
                return Err(DeployError::Copy("scp exited with code 1".into()));
            }
            Ok(())
        }

        async fn run(&self, script: &RemoteScript) -> Result<(), DeployError> {
            self.calls.lock().unwrap().push(Call::Run(script.clone()));
            if self.fail_run {
                return Err(DeployError::Remote("ssh exited with code 1".into()));
            }
            Ok(())
        }
    }

    fn plan() -> DeployPlan {
        DeployPlan::new("/srv/stack", "web", Branch::default(), "./stack.sh")
    }

    #[tokio::test]
    async fn copies_script_then_runs_sequence() {
        let transport = Arc::new(RecordingTransport::default());
        let executor = DeployExecutor::new(plan(), transport.clone());
        let commit = CommitId::new("abc123").unwrap();

        executor.deploy(&commit).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::Copy(PathBuf::from("./stack.sh"), "/srv/stack".to_string())
        );
        assert_eq!(calls[1], Call::Run(plan().script_for(&commit)));
    }

    #[tokio::test]
    async fn copy_failure_skips_remote_command() {
        let transport = Arc::new(RecordingTransport {
            fail_copy: true,
            ..Default::default()
        });
        let executor = DeployExecutor::new(plan(), transport.clone());

        let err = executor
            .deploy(&CommitId::new("abc123").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::Copy(_)));
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remote_failure_is_reported() {
        let transport = Arc::new(RecordingTransport {
            fail_run: true,
            ..Default::default()
        });
        let executor = DeployExecutor::new(plan(), transport);

        let err = executor
            .deploy(&CommitId::new("abc123").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::Remote(_)));
    }
}
