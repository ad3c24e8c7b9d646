use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Branch deployed when none is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Characters git refuses in ref names.
const FORBIDDEN: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

/// Name of the branch this instance deploys from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct Branch(String);

impl Branch {
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified ref as sent in push events (`refs/heads/<branch>`).
    pub fn ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Returns `true` if the pushed ref points at this branch.
    pub fn matches_ref(&self, git_ref: &str) -> bool {
        git_ref
            .strip_prefix("refs/heads/")
            .is_some_and(|name| name == self.0)
    }
}

impl Default for Branch {
    fn default() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }
}

impl TryFrom<String> for Branch {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let invalid = s.is_empty()
            || s.starts_with('-')
            || s.starts_with('/')
            || s.ends_with('/')
            || s.contains("..")
            || s.chars().any(|c| c.is_whitespace() || c.is_control())
            || s.contains(FORBIDDEN);

        if invalid {
            Err(ModelError::InvalidBranch(s))
        } else {
            Ok(Self(s))
        }
    }
}

impl FromStr for Branch {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<Branch> for String {
    fn from(b: Branch) -> Self {
        b.0
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
