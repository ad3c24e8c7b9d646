mod domain;
pub use domain::{Branch, CommitId, ConfirmationToken, DEFAULT_BRANCH};

mod error;
pub use error::{ModelError, ModelResult};

mod event;
pub use event::{CommitSummary, PushEvent, ValidatedPush};

mod pending;
pub use pending::{ConfirmationKey, PendingConfirmation};
