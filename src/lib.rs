//! medvault - an owner-gated store of medical records
//!
//! Records are kept in a durable string-keyed map. Each record belongs to the
//! principal that created it, and only that principal may read, update or
//! delete it.
//!
//! - `storage`: map backends and the checksummed record log
//! - `records`: the record model and `RecordStore`
//! - `api`: JSON request envelopes and dispatch
//! - `cli`: the `medvault` host binary

pub mod api;
pub mod cli;
pub mod records;
pub mod storage;
