use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Longest accepted commit identifier (SHA-256 object ids are 64 hex chars).
const MAX_COMMIT_LEN: usize = 64;

/// Identifier of a commit to deploy.
///
/// Only ASCII hex digits are accepted, so a `CommitId` can be passed to
/// `git` on the remote host without being mistaken for an option or a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Validate and wrap a commit identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let well_formed = !s.is_empty()
            && s.len() <= MAX_COMMIT_LEN
            && s.bytes().all(|b| b.is_ascii_hexdigit());

        if well_formed {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidCommit(s))
        }
    }
}

impl FromStr for CommitId {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<CommitId> for String {
    fn from(c: CommitId) -> Self {
        c.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CommitId;

    #[test]
    fn accepts_hex_ids() {
        let ok = [
            "abc123",
            "0123456789abcdef0123456789abcdef01234567",
            "DEADBEEF",
        ];

        for id in ok {
            assert!(CommitId::new(id).is_ok(), "expected {id:?} to be accepted");
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        let long = "a".repeat(65);
        let bad = [
            "",
            " ",
            "abc 123",
            "--upload-pack=evil",
            "abc;rm -rf /",
            "HEAD",
            "g123",
            long.as_str(),
        ];

        for id in bad {
            assert!(CommitId::new(id).is_err(), "expected {id:?} to be rejected");
        }
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: CommitId = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(ok.as_str(), "abc123");

        let bad = serde_json::from_str::<CommitId>(r#""not a commit""#);
        assert!(bad.is_err());
    }
}
