use std::path::PathBuf;

use stackhook_model::{Branch, CommitId};

/// One program invocation on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStep {
    pub program: String,
    pub args: Vec<String>,
    /// Run this step to completion, then feed its stdout to `program`.
    /// A failure of either side fails the step.
    pub pipe_into: Option<String>,
}

impl RemoteStep {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            pipe_into: None,
        }
    }

    pub fn piped_into(mut self, program: impl Into<String>) -> Self {
        self.pipe_into = Some(program.into());
        self
    }
}

/// Steps run in `cwd`, each only if the previous one succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    pub cwd: String,
    pub steps: Vec<RemoteStep>,
}

/// Fixed deployment sequence for the single managed stack.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    /// Directory on the target host holding the stack checkout.
    pub stack_dir: String,
    pub stack_name: String,
    pub branch: Branch,
    /// Local path of the stack script copied to `stack_dir` before each deploy.
    pub script: PathBuf,
}

impl DeployPlan {
    pub fn new(
        stack_dir: impl Into<String>,
        stack_name: impl Into<String>,
        branch: Branch,
        script: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stack_dir: stack_dir.into(),
            stack_name: stack_name.into(),
            branch,
            script: script.into(),
        }
    }

    /// Name of the script once copied into `stack_dir`.
    pub fn remote_script_name(&self) -> String {
        self.script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stack.sh".to_string())
    }

    /// Fetch the branch, merge `commit`, and apply the stack.
    ///
    /// The stack script prints the commands that bring the stack up; its
    /// output is executed by `sh`.
    pub fn script_for(&self, commit: &CommitId) -> RemoteScript {
        let script = format!("./{}", self.remote_script_name());

        RemoteScript {
            cwd: self.stack_dir.clone(),
            steps: vec![
                RemoteStep::new("git", ["fetch", "origin", self.branch.as_str()]),
                RemoteStep::new("git", ["merge", commit.as_str()]),
                RemoteStep::new(
                    "sh",
                    [script.as_str(), self.stack_name.as_str(), "up", "-d"],
                )
                .piped_into("sh"),
            ],
        }
    }
}
