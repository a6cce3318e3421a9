//! Medical record model

use serde::{Deserialize, Serialize};

use super::context::{CallContext, Principal, Timestamp};
use crate::storage::{StorageError, StorageResult};

/// User-supplied fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub title: String,
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
}

impl RecordPayload {
    pub fn new(title: impl Into<String>, attachment_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            attachment_url: attachment_url.into(),
        }
    }
}

/// A medical record owned by the principal that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
    pub creator_id: Principal,
    pub created_at: Timestamp,
    /// Absent until the first update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Record {
    /// Builds a fresh record owned by the context's caller.
    pub fn new(id: String, payload: RecordPayload, ctx: &CallContext) -> Self {
        Self {
            id,
            title: payload.title,
            attachment_url: payload.attachment_url,
            creator_id: ctx.caller.clone(),
            created_at: ctx.now,
            updated_at: None,
        }
    }

    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.creator_id == *principal
    }

    /// Replaces the user-supplied fields and stamps `updated_at`.
    ///
    /// `id`, `creator_id` and `created_at` carry over untouched.
    pub fn revised(self, payload: RecordPayload, now: Timestamp) -> Self {
        Self {
            title: payload.title,
            attachment_url: payload.attachment_url,
            updated_at: Some(now),
            ..self
        }
    }

    pub(crate) fn encode(&self) -> StorageResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| StorageError::encoding(format!("Failed to encode record {}: {}", self.id, e)))
    }

    pub(crate) fn decode(bytes: &[u8]) -> StorageResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| StorageError::encoding(format!("Failed to decode stored record: {}", e)))
    }
}
