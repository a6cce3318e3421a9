//! API Layer for medvault
//!
//! Parses request envelopes, dispatches them to the record store and
//! formats one response per request.
//!
//! # Supported Operations
//!
//! - listOwned
//! - getById
//! - getCaller
//! - getCreatorOf
//! - create
//! - update
//! - delete

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult};
pub use handler::ApiHandler;
pub use request::{Operation, Request};
pub use response::{ErrorResponse, Response, SuccessResponse};
