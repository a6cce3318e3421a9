//! # Record Store
//!
//! Policy layer over a [`MapBackend`]: records keyed by id, single-record
//! access gated on the record's creator.
//!
//! Reads take `&self` and mutations take `&mut self`, so one store serves one
//! invocation at a time to completion. Every path that is refused (missing
//! record, wrong owner) returns before the backend is written.

use tracing::{debug, error, info, instrument, warn};

use super::context::{CallContext, Principal};
use super::errors::{Action, RecordError, RecordResult};
use super::id_gen::{IdGenerator, RandomIdGenerator};
use super::record::{Record, RecordPayload};
use crate::storage::MapBackend;

/// Owner-gated record store.
pub struct RecordStore<B, G = RandomIdGenerator> {
    backend: B,
    ids: G,
}

impl<B: MapBackend> RecordStore<B> {
    /// Store with 30-character random ids.
    pub fn new(backend: B) -> Self {
        Self::with_id_generator(backend, RandomIdGenerator::new())
    }
}

impl<B: MapBackend, G: IdGenerator> RecordStore<B, G> {
    pub fn with_id_generator(backend: B, ids: G) -> Self {
        Self { backend, ids }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// All records created by the caller, in backend order.
    ///
    /// Records of other principals are skipped, never refused.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller))]
    pub fn list_owned(&self, ctx: &CallContext) -> RecordResult<Vec<Record>> {
        const OPERATION: &str = "retrieve records";

        let values = self
            .backend
            .values()
            .map_err(RecordError::backend(OPERATION))
            .inspect_err(log_backend_failure)?;

        let mut owned = Vec::new();
        for bytes in values {
            let record = Record::decode(&bytes)
                .map_err(RecordError::backend(OPERATION))
                .inspect_err(log_backend_failure)?;
            if record.is_owned_by(&ctx.caller) {
                owned.push(record);
            }
        }

        debug!(count = owned.len(), "listed owned records");
        Ok(owned)
    }

    /// The record under `id`, if the caller created it.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller, id = %id))]
    pub fn get_by_id(&self, ctx: &CallContext, id: &str) -> RecordResult<Record> {
        let record = self.fetch(id, "retrieve the record")?;
        authorize(&record, ctx, Action::Read)?;
        Ok(record)
    }

    /// The identity the call is made under.
    pub fn get_caller(&self, ctx: &CallContext) -> RecordResult<Principal> {
        Ok(ctx.caller.clone())
    }

    /// The creator of the record under `id`; any caller may ask.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller, id = %id))]
    pub fn get_creator_of(&self, ctx: &CallContext, id: &str) -> RecordResult<Principal> {
        self.fetch(id, "retrieve the creatorId")
            .map(|record| record.creator_id)
    }

    /// Stores a new record owned by the caller.
    ///
    /// The fresh id is not checked against existing keys; if it collides the
    /// stored record is overwritten.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller))]
    pub fn create(&mut self, ctx: &CallContext, payload: RecordPayload) -> RecordResult<Record> {
        const OPERATION: &str = "add the record";

        let record = Record::new(self.ids.next_id(), payload, ctx);
        let replaced = self.put(&record, OPERATION)?;
        if replaced {
            warn!(id = %record.id, "generated id collided with a stored record; overwritten");
        }

        debug!(id = %record.id, "record created");
        Ok(record)
    }

    /// Replaces title and attachment of a record the caller created.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller, id = %id))]
    pub fn update(
        &mut self,
        ctx: &CallContext,
        id: &str,
        payload: RecordPayload,
    ) -> RecordResult<Record> {
        const OPERATION: &str = "update the record";

        let record = self.fetch(id, OPERATION)?;
        authorize(&record, ctx, Action::Update)?;

        let updated = record.revised(payload, ctx.now);
        self.put(&updated, OPERATION)?;

        debug!("record updated");
        Ok(updated)
    }

    /// Removes a record the caller created, returning its last version.
    #[instrument(level = "debug", skip_all, fields(request_id = %ctx.request_id, caller = %ctx.caller, id = %id))]
    pub fn delete(&mut self, ctx: &CallContext, id: &str) -> RecordResult<Record> {
        const OPERATION: &str = "delete the record";

        let record = self.fetch(id, OPERATION)?;
        authorize(&record, ctx, Action::Delete)?;

        self.backend
            .remove(id)
            .map_err(RecordError::backend(OPERATION))
            .inspect_err(log_backend_failure)?;

        debug!("record deleted");
        Ok(record)
    }

    fn fetch(&self, id: &str, operation: &'static str) -> RecordResult<Record> {
        let bytes = self
            .backend
            .get(id)
            .map_err(RecordError::backend(operation))
            .inspect_err(log_backend_failure)?
            .ok_or_else(|| RecordError::not_found(id))?;

        Record::decode(&bytes)
            .map_err(RecordError::backend(operation))
            .inspect_err(log_backend_failure)
    }

    /// Writes `record` under its id; returns whether a value was replaced.
    fn put(&mut self, record: &Record, operation: &'static str) -> RecordResult<bool> {
        let bytes = record
            .encode()
            .map_err(RecordError::backend(operation))
            .inspect_err(log_backend_failure)?;

        let previous = self
            .backend
            .insert(&record.id, bytes)
            .map_err(RecordError::backend(operation))
            .inspect_err(log_backend_failure)?;

        Ok(previous.is_some())
    }
}

fn authorize(record: &Record, ctx: &CallContext, action: Action) -> RecordResult<()> {
    if record.is_owned_by(&ctx.caller) {
        return Ok(());
    }
    info!(%action, owner = %record.creator_id, "access denied: caller is not the creator");
    Err(RecordError::Forbidden { action })
}

fn log_backend_failure(err: &RecordError) {
    error!(code = err.code(), error = %err, "backend failure");
}
