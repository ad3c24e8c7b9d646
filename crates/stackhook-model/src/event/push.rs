use serde::{Deserialize, Serialize};

use crate::{CommitId, ModelError, ModelResult};

/// Form field that carries the JSON document for `application/x-www-form-urlencoded` deliveries.
const FORM_PAYLOAD_FIELD: &str = "payload";

/// Push event as delivered by the source-control webhook.
///
/// Only the fields the gateway looks at are modelled; everything else in the
/// payload is ignored. Required fields are optional here so that their absence
/// is reported by [`PushEvent::validate`] instead of a generic parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Pushed ref, e.g. `refs/heads/master`.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Commit the ref points at after the push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Commits included in the push, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<CommitSummary>,
}

/// One commit listed in a push event. Used only for notification text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitSummary {
    pub id: String,
    pub message: String,
    pub url: String,
}

/// Push event whose required fields are present and well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPush {
    pub git_ref: String,
    pub commit: CommitId,
    pub commits: Vec<CommitSummary>,
}

impl PushEvent {
    /// Parse a raw JSON body.
    pub fn from_json(body: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(body).map_err(|e| ModelError::InvalidPayload(e.to_string()))
    }

    /// Parse a form-encoded body whose `payload` field holds the JSON document.
    pub fn from_form(body: &[u8]) -> ModelResult<Self> {
        let payload = url::form_urlencoded::parse(body)
            .find(|(key, _)| key == FORM_PAYLOAD_FIELD)
            .map(|(_, value)| value.into_owned())
            .ok_or(ModelError::MissingField(FORM_PAYLOAD_FIELD))?;

        Self::from_json(payload.as_bytes())
    }

    /// Parse a body according to its declared content type.
    ///
    /// Form-encoded bodies are unwrapped first; anything else is treated as JSON.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> ModelResult<Self> {
        let is_form = content_type
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| {
                mime.trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            });

        if is_form {
            Self::from_form(body)
        } else {
            Self::from_json(body)
        }
    }

    /// Check that `ref` and `after` are present and well-formed.
    pub fn validate(self) -> ModelResult<ValidatedPush> {
        let git_ref = self
            .git_ref
            .filter(|r| !r.trim().is_empty())
            .ok_or(ModelError::MissingField("ref"))?;
        let after = self.after.ok_or(ModelError::MissingField("after"))?;
        let commit = CommitId::new(after)?;

        Ok(ValidatedPush {
            git_ref,
            commit,
            commits: self.commits,
        })
    }
}
