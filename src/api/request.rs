//! API request types
//!
//! One JSON object per request:
//!
//! ```text
//! {"op": "update", "caller": "alice", "id": "...", "payload": {"title": "...", "attachmentURL": "..."}}
//! ```

use serde::Deserialize;

use super::errors::{ApiError, ApiResult};
use crate::records::{Principal, RecordPayload};

/// Operation and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListOwned,
    GetById { id: String },
    GetCaller,
    GetCreatorOf { id: String },
    Create { payload: RecordPayload },
    Update { id: String, payload: RecordPayload },
    Delete { id: String },
}

impl Operation {
    /// Wire name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListOwned => "listOwned",
            Operation::GetById { .. } => "getById",
            Operation::GetCaller => "getCaller",
            Operation::GetCreatorOf { .. } => "getCreatorOf",
            Operation::Create { .. } => "create",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }
}

/// A parsed request: who is calling and what they ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub caller: Principal,
    pub operation: Operation,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    caller: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    payload: Option<RecordPayload>,
}

impl Request {
    /// Parse a request from a JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;

        let caller = match raw.caller {
            Some(caller) if !caller.is_empty() => Principal::new(caller),
            _ => return Err(ApiError::invalid_request("Missing caller")),
        };

        let id = raw.id;
        let payload = raw.payload;
        let require_id = || id.clone().ok_or_else(|| ApiError::invalid_request("Missing id"));
        let require_payload = || {
            payload
                .clone()
                .ok_or_else(|| ApiError::invalid_request("Missing payload"))
        };

        let operation = match raw.op.as_str() {
            "listOwned" => Operation::ListOwned,
            "getById" => Operation::GetById { id: require_id()? },
            "getCaller" => Operation::GetCaller,
            "getCreatorOf" => Operation::GetCreatorOf { id: require_id()? },
            "create" => Operation::Create {
                payload: require_payload()?,
            },
            "update" => Operation::Update {
                id: require_id()?,
                payload: require_payload()?,
            },
            "delete" => Operation::Delete { id: require_id()? },
            other => return Err(ApiError::unknown_operation(other)),
        };

        Ok(Self { caller, operation })
    }
}
