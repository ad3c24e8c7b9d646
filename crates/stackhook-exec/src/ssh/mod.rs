//! `scp` + `ssh` backed [`RemoteTransport`].
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stackhook_core::{DeployError, RemoteScript, RemoteTransport};
use tracing::{debug, instrument};

use crate::{ExecError, output::OutputLogConfig, quote::render_script, runner::run_program};

/// Where and as whom to connect.
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub user: String,
    pub port: u16,
    /// Private key passed with `-i`.
    pub identity_file: PathBuf,
}

impl SshTarget {
    /// Reject values `ssh`/`scp` could parse as options or host lists.
    pub fn validate(&self) -> Result<(), ExecError> {
        for (name, value) in [("host", &self.host), ("user", &self.user)] {
            if value.is_empty()
                || value.starts_with('-')
                || value.contains(|c: char| c.is_whitespace() || c == '@' || c == ':')
            {
                return Err(ExecError::InvalidTarget(format!("{name} {value:?}")));
            }
        }
        if self.port == 0 {
            return Err(ExecError::InvalidTarget("port 0".into()));
        }
        Ok(())
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Options shared by `ssh` and `scp`: no user config, no host-key prompts, only our key.
    fn common_args(&self) -> Vec<String> {
        vec![
            "-F".into(),
            "/dev/null".into(),
            "-o".into(),
            "StrictHostKeyChecking=no".into(),
            "-o".into(),
            "IdentitiesOnly=yes".into(),
            "-o".into(),
            "BatchMode=yes".into(),
            "-i".into(),
            self.identity_file.to_string_lossy().into_owned(),
        ]
    }

    pub(crate) fn scp_args(&self, local: &Path, remote_dir: &str) -> Vec<String> {
        let mut args = self.common_args();
        args.extend([
            "-P".into(),
            self.port.to_string(),
            "--".into(),
            local.to_string_lossy().into_owned(),
            format!("{}:{}/", self.destination(), remote_dir.trim_end_matches('/')),
        ]);
        args
    }

    pub(crate) fn ssh_args(&self, command_line: String) -> Vec<String> {
        let mut args = self.common_args();
        args.extend([
            "-p".into(),
            self.port.to_string(),
            "--".into(),
            self.destination(),
            command_line,
        ]);
        args
    }
}

/// Runs deploy steps on the target host over OpenSSH.
#[derive(Debug, Clone)]
pub struct SshTransport {
    target: SshTarget,
    ssh_program: String,
    scp_program: String,
    log_cfg: OutputLogConfig,
}

impl SshTransport {
    pub fn new(target: SshTarget) -> Result<Self, ExecError> {
        target.validate()?;
        Ok(Self {
            target,
            ssh_program: "ssh".into(),
            scp_program: "scp".into(),
            log_cfg: OutputLogConfig::default(),
        })
    }

    /// Use different `ssh`/`scp` binaries (e.g. absolute paths).
    pub fn with_programs(mut self, ssh: impl Into<String>, scp: impl Into<String>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    #[instrument(level = "debug", skip(self), fields(host = %self.target.host))]
    async fn copy_file(&self, local: &Path, remote_dir: &str) -> Result<(), DeployError> {
        let args = self.target.scp_args(local, remote_dir);
        run_program(&self.scp_program, &args, &self.log_cfg)
            .await
            .map_err(|e| DeployError::Copy(e.to_string()))?;

        debug!("script copied");
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(host = %self.target.host))]
    async fn run(&self, script: &RemoteScript) -> Result<(), DeployError> {
        let command_line = render_script(script);
        debug!(command = %command_line, "running remote command");

        let args = self.target.ssh_args(command_line);
        run_program(&self.ssh_program, &args, &self.log_cfg)
            .await
            .map_err(|e| DeployError::Remote(e.to_string()))
    }
}
