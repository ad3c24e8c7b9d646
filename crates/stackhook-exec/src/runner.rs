use std::{ffi::OsStr, process::Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::{
    ExecError,
    output::{OutputLogConfig, Stream},
};

/// Run `program` with `args` to completion, logging its output.
///
/// Succeeds only on a zero exit status.
pub async fn run_program<I, S>(
    program: &str,
    args: I,
    log_cfg: &OutputLogConfig,
) -> Result<(), ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    trace!(program, cmd = ?cmd.as_std(), "spawning process");

    let output = cmd.output().await.map_err(|source| ExecError::Spawn {
        program: program.to_string(),
        source,
    })?;

    log_cfg.log(program, Stream::Stdout, &output.stdout);
    log_cfg.log(program, Stream::Stderr, &output.stderr);

    if output.status.success() {
        debug!(program, "process exited successfully");
        return Ok(());
    }
    match output.status.code() {
        Some(code) => Err(ExecError::NonZeroExit {
            program: program.to_string(),
            code,
        }),
        None => Err(ExecError::Signaled {
            program: program.to_string(),
        }),
    }
}
