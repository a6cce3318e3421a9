//! # Medical Records
//!
//! Creator-owned records kept in a durable map.
//!
//! Caller identity and the current time arrive through [`CallContext`];
//! ids come from an injected [`IdGenerator`]. The store itself holds no
//! ambient state beyond its backend.

mod context;
mod errors;
mod id_gen;
mod record;
mod store;

pub use context::{CallContext, Clock, Principal, SystemClock, Timestamp};
pub use errors::{Action, RecordError, RecordResult};
pub use id_gen::{IdGenerator, RandomIdGenerator, DEFAULT_ID_LENGTH, ID_ALPHABET};
pub use record::{Record, RecordPayload};
pub use store::RecordStore;
