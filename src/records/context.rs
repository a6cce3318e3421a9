//! Call context
//!
//! Identity and time reach the store as explicit values instead of ambient
//! host state. The host resolves the caller, reads its clock once, and hands
//! both to each operation inside a [`CallContext`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of the calling principal.
///
/// Two principals are the same caller exactly when their tokens are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Principal {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the current time. Readings never go backwards.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock, clamped so successive readings are non-decreasing.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0);
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        Timestamp(previous.max(wall))
    }
}

/// Everything an operation needs to know about who is calling and when.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Correlates log lines for one invocation
    pub request_id: Uuid,
    pub caller: Principal,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, now: Timestamp) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            caller: caller.into(),
            now,
        }
    }

    /// Context stamped with the clock's current reading.
    pub fn at(caller: impl Into<Principal>, clock: &impl Clock) -> Self {
        Self::new(caller, clock.now())
    }
}
