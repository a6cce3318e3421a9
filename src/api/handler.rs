//! API Handler
//!
//! Turns one request line into one response. The handler plays the host's
//! part for the store: it resolves the caller from the request envelope and
//! stamps the call with its clock before dispatching.

use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, warn};

use super::errors::{ApiError, ApiResult};
use super::request::{Operation, Request};
use super::response::Response;
use crate::records::{CallContext, Clock, IdGenerator, RecordStore};
use crate::storage::MapBackend;

/// Request dispatcher owning the store and the clock.
pub struct ApiHandler<B, G, C> {
    store: RecordStore<B, G>,
    clock: C,
}

impl<B: MapBackend, G: IdGenerator, C: Clock> ApiHandler<B, G, C> {
    pub fn new(store: RecordStore<B, G>, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &RecordStore<B, G> {
        &self.store
    }

    pub fn into_store(self) -> RecordStore<B, G> {
        self.store
    }

    /// Handle a raw JSON request string
    pub fn handle(&mut self, json_request: &str) -> Response {
        let request = match Request::parse(json_request) {
            Ok(r) => r,
            Err(e) => {
                warn!(code = e.code(), error = %e.message(), "rejected request");
                return Response::error(&e);
            }
        };

        match self.dispatch(request) {
            Ok(data) => Response::success(data),
            Err(e) => Response::error(&e),
        }
    }

    /// Execute a parsed request
    pub fn dispatch(&mut self, request: Request) -> ApiResult<Value> {
        let ctx = CallContext::at(request.caller, &self.clock);
        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            op = request.operation.name(),
        );
        let _entered = span.enter();

        match request.operation {
            Operation::ListOwned => to_data(self.store.list_owned(&ctx)?),
            Operation::GetById { id } => to_data(self.store.get_by_id(&ctx, &id)?),
            Operation::GetCaller => to_data(self.store.get_caller(&ctx)?),
            Operation::GetCreatorOf { id } => to_data(self.store.get_creator_of(&ctx, &id)?),
            Operation::Create { payload } => to_data(self.store.create(&ctx, payload)?),
            Operation::Update { id, payload } => {
                to_data(self.store.update(&ctx, &id, payload)?)
            }
            Operation::Delete { id } => to_data(self.store.delete(&ctx, &id)?),
        }
    }
}

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("Failed to serialize response: {}", e)))
}
