mod push;
pub use push::{CommitSummary, PushEvent, ValidatedPush};
