use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with non-zero code: {code}")]
    NonZeroExit { program: String, code: i32 },

    #[error("'{program}' terminated by signal")]
    Signaled { program: String },

    #[error("invalid ssh target: {0}")]
    InvalidTarget(String),
}
