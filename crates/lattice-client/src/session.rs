//! Prepared-insert binding session.
//!
//! An `InsertSession` orchestrates one prepared INSERT template over a
//! transport: parameters are bound one at a time, and finalized rows are
//! either dispatched immediately (`execute`) or accumulated and flushed
//! as a batch (`add_batch` / `execute_batch`). The two modes do not mix:
//! once a batch row has been added, `execute` is refused until the batch
//! is flushed.
//!
//! A session exclusively owns its slot set and pending batch. It is
//! `Send` but carries no internal lock; hand it off by move to cross a
//! thread boundary, or wrap it in a mutex externally.

use std::sync::Arc;

use lattice_codec::{Placeholder, RowBinder, RowBuffer};
use lattice_common::{SchemaRef, Value};
use tracing::{debug, trace};

use crate::error::{ClientError, ClientResult};
use crate::template::InsertTemplate;
use crate::transport::{Ack, Transport};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Accepting binds and dispatches.
    Open,
    /// Terminal; every operation except `close` is refused.
    Closed,
}

/// A prepared INSERT with incremental parameter binding and batching.
pub struct InsertSession {
    template: Arc<InsertTemplate>,
    transport: Arc<dyn Transport>,
    binder: RowBinder,
    pending: Vec<RowBuffer>,
    state: SessionState,
    batch_engaged: bool,
    auto_close: bool,
}

impl InsertSession {
    /// Creates a session for an analyzed template.
    pub fn new(template: Arc<InsertTemplate>, transport: Arc<dyn Transport>) -> Self {
        let binder = template.binder();
        Self {
            template,
            transport,
            binder,
            pending: Vec::new(),
            state: SessionState::Open,
            batch_engaged: false,
            auto_close: false,
        }
    }

    /// Closes the session automatically after a successful `execute`.
    pub fn with_auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Returns the target table name.
    pub fn table(&self) -> &str {
        self.template.table()
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &SchemaRef {
        self.template.schema()
    }

    /// Returns the number of parameters in the template.
    pub fn param_count(&self) -> usize {
        self.template.param_count()
    }

    /// Returns the declared metadata of one parameter: target column
    /// name, row position, and type. Queryable before any binding.
    pub fn parameter(&self, index: usize) -> Option<&Placeholder> {
        self.template.placeholders().get(index)
    }

    /// Returns the number of rows accumulated for the next batch flush.
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    // =========================================================================
    // Binding and dispatch
    // =========================================================================

    /// Binds a value to the parameter at `index` (0-based, template
    /// order).
    ///
    /// Type and nullability are checked against the target column
    /// before the slot is touched; a failed bind leaves the slot in its
    /// previous state.
    pub fn bind(&mut self, index: usize, value: impl Into<Value>) -> ClientResult<()> {
        self.ensure_open()?;
        let value = value.into();
        trace!(table = self.table(), index, %value, "bind parameter");
        self.binder.bind(index, value)?;
        Ok(())
    }

    /// Finalizes the current slot set and dispatches it as a single row.
    ///
    /// Refused with `BatchPending` once any batch row has been added.
    /// On success the slot set is reset for the next row; on dispatch
    /// failure both the slot set and any pending batch are left exactly
    /// as they were.
    pub fn execute(&mut self) -> ClientResult<Ack> {
        self.ensure_open()?;
        if self.batch_engaged {
            return Err(ClientError::BatchPending);
        }
        let row = self.binder.finalize()?;
        debug!(table = self.table(), bytes = row.len(), "dispatch insert");
        let ack = self.transport.dispatch_insert(self.template.table(), &row)?;
        self.binder.reset();
        if self.auto_close {
            self.close();
        }
        Ok(ack)
    }

    /// Finalizes the current slot set into the pending batch and
    /// engages batch mode.
    ///
    /// Fails with `IncompleteParameters` if any slot is unbound; the
    /// slot set is left intact in that case.
    pub fn add_batch(&mut self) -> ClientResult<()> {
        self.ensure_open()?;
        let row = self.binder.finalize()?;
        self.pending.push(row);
        self.binder.reset();
        self.batch_engaged = true;
        trace!(
            table = self.table(),
            pending = self.pending.len(),
            "row added to batch"
        );
        Ok(())
    }

    /// Appends a fully-literal statement's row to the pending batch.
    ///
    /// The statement must target the session's table and contain no
    /// placeholders; one with `?` markers is refused with
    /// `StatementRequiresBinding`. The current slot set is not touched.
    pub fn add_batch_sql(&mut self, sql: &str) -> ClientResult<()> {
        self.ensure_open()?;
        let template = InsertTemplate::analyze(self.template.schema().clone(), sql)?;
        if !template.table().eq_ignore_ascii_case(self.template.table()) {
            return Err(ClientError::TableMismatch {
                expected: self.template.table().to_string(),
                found: template.table().to_string(),
            });
        }
        let row = template.literal_row()?;
        self.pending.push(row);
        self.batch_engaged = true;
        Ok(())
    }

    /// Dispatches the pending batch as one logical unit.
    ///
    /// On success the batch is cleared and batch mode disengaged; on
    /// failure the pending rows are left byte-for-byte intact so the
    /// flush can be retried by the caller.
    pub fn execute_batch(&mut self) -> ClientResult<Ack> {
        self.ensure_open()?;
        debug!(
            table = self.table(),
            rows = self.pending.len(),
            "dispatch batch"
        );
        let ack = self
            .transport
            .dispatch_batch(self.template.table(), &self.pending)?;
        self.pending.clear();
        self.batch_engaged = false;
        Ok(ack)
    }

    /// Closes the session, discarding any unflushed batch and partially
    /// bound slots. Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        debug!(
            table = self.table(),
            discarded = self.pending.len(),
            "session closed"
        );
        self.pending.clear();
        self.binder.reset();
        self.batch_engaged = false;
        self.state = SessionState::Closed;
    }

    fn ensure_open(&self) -> ClientResult<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(ClientError::SessionClosed),
        }
    }
}

impl std::fmt::Debug for InsertSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertSession")
            .field("table", &self.template.table())
            .field("params", &self.param_count())
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .finish()
    }
}
