//! Client façade.
//!
//! `Client` ties the schema registry and transport together behind the
//! three entry points callers use: preparing a parameterized insert,
//! running a literal insert in one shot, and issuing a query that
//! returns a decoding cursor.

use std::sync::Arc;

use lattice_codec::ResultCursor;
use tracing::debug;

use crate::catalog::SchemaRegistry;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::session::InsertSession;
use crate::template::{self, InsertTemplate};
use crate::transport::{Ack, Transport};

/// Entry point for prepared inserts and queries.
///
/// Cheap to clone; sessions created by one clone are independent of the
/// others.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    registry: Arc<dyn SchemaRegistry>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client over a schema registry and transport.
    pub fn new(
        config: ClientConfig,
        registry: Arc<dyn SchemaRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            registry,
            transport,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Analyzes an INSERT statement against the target table's schema
    /// and opens a binding session for it.
    ///
    /// The statement may mix `?` placeholders and literals in any
    /// combination; a fully-literal statement yields a session with
    /// zero parameters whose `execute` dispatches immediately.
    pub fn prepare_insert(&self, sql: &str) -> ClientResult<InsertSession> {
        let table = template::table_of(sql)?;
        let schema = self.registry.schema_of(&table)?;
        let parsed = InsertTemplate::analyze(schema, sql)?;
        debug!(
            table = parsed.table(),
            params = parsed.param_count(),
            "insert prepared"
        );
        Ok(InsertSession::new(Arc::new(parsed), self.transport.clone()))
    }

    /// Encodes and dispatches a fully-literal INSERT statement without
    /// opening a session.
    ///
    /// A statement containing `?` placeholders is refused with
    /// `StatementRequiresBinding`; use [`Client::prepare_insert`] for
    /// those.
    pub fn execute_insert(&self, sql: &str) -> ClientResult<Ack> {
        let table = template::table_of(sql)?;
        let schema = self.registry.schema_of(&table)?;
        let parsed = InsertTemplate::analyze(schema, sql)?;
        let row = parsed.literal_row()?;
        self.transport.dispatch_insert(parsed.table(), &row)
    }

    /// Runs a query against `table` and wraps the returned rows in a
    /// forward-only cursor.
    pub fn execute_query(&self, table: &str, sql: &str) -> ClientResult<ResultCursor> {
        let (schema, rows) = self.transport.dispatch_query(table, sql)?;
        debug!(table, rows = rows.len(), "query dispatched");
        Ok(ResultCursor::new(schema, rows)?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
