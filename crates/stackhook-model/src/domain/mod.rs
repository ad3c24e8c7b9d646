mod branch;
pub use branch::{Branch, DEFAULT_BRANCH};

mod commit;
pub use commit::CommitId;

mod token;
pub use token::ConfirmationToken;
