//! Transport interface to the storage engine.
//!
//! The binding layer treats the network as a collaborator behind the
//! [`Transport`] trait: it dispatches finalized row buffers and receives
//! query results, and it never retries: remote failures are surfaced
//! verbatim to the caller. Dispatch is a blocking call from the caller's
//! point of view; wrapping it in an async task is a caller decision.
//!
//! [`MemoryTransport`] is the in-process implementation used by tests
//! and embedded setups: it appends dispatched rows to per-table vectors
//! and serves whole-table scans back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lattice_codec::RowBuffer;
use lattice_common::SchemaRef;
use parking_lot::RwLock;

use crate::catalog::{Catalog, SchemaRegistry};
use crate::error::{ClientError, ClientResult};

/// Acknowledgement of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Rows accepted by the engine.
    pub rows_affected: u64,
}

/// Dispatch interface to the storage engine.
pub trait Transport: Send + Sync {
    /// Dispatches one encoded row for insertion.
    fn dispatch_insert(&self, table: &str, row: &RowBuffer) -> ClientResult<Ack>;

    /// Dispatches an ordered batch of encoded rows as one logical unit.
    fn dispatch_batch(&self, table: &str, rows: &[RowBuffer]) -> ClientResult<Ack>;

    /// Executes a query and returns the result schema with the row
    /// buffers it produced.
    fn dispatch_query(&self, table: &str, sql: &str)
        -> ClientResult<(SchemaRef, Vec<RowBuffer>)>;
}

/// In-memory transport backed by a [`Catalog`].
///
/// Queries ignore everything in the SQL beyond the table and return a
/// full scan in insertion order. `fail_next` injects a single remote
/// failure, which tests use to verify that sessions leave their pending
/// state untouched on dispatch errors.
pub struct MemoryTransport {
    catalog: Arc<Catalog>,
    tables: RwLock<HashMap<String, Vec<RowBuffer>>>,
    /// Batch dispatch log: (table, batch size) per call.
    batches: RwLock<Vec<(String, usize)>>,
    fail_next: AtomicBool,
}

impl MemoryTransport {
    /// Creates a transport over the given catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            tables: RwLock::new(HashMap::new()),
            batches: RwLock::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next dispatch fail with a remote error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Returns the rows stored for a table, in insertion order.
    pub fn stored_rows(&self, table: &str) -> Vec<RowBuffer> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    /// Returns the sizes of the batches dispatched to a table.
    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.batches
            .read()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, n)| *n)
            .collect()
    }

    fn check_fault(&self) -> ClientResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Remote("injected failure".to_string()));
        }
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn dispatch_insert(&self, table: &str, row: &RowBuffer) -> ClientResult<Ack> {
        self.check_fault()?;
        self.catalog.schema_of(table)?;
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(Ack { rows_affected: 1 })
    }

    fn dispatch_batch(&self, table: &str, rows: &[RowBuffer]) -> ClientResult<Ack> {
        self.check_fault()?;
        self.catalog.schema_of(table)?;
        let mut tables = self.tables.write();
        let stored = tables.entry(table.to_string()).or_default();
        stored.extend(rows.iter().cloned());
        self.batches.write().push((table.to_string(), rows.len()));
        Ok(Ack {
            rows_affected: rows.len() as u64,
        })
    }

    fn dispatch_query(
        &self,
        table: &str,
        _sql: &str,
    ) -> ClientResult<(SchemaRef, Vec<RowBuffer>)> {
        self.check_fault()?;
        let schema = self.catalog.schema_of(table)?;
        Ok((schema, self.stored_rows(table)))
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("tables", &self.tables.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_codec::encode_row;
    use lattice_common::{Column, DataType, Schema, Value};

    fn setup() -> (Arc<Catalog>, MemoryTransport) {
        let catalog = Arc::new(Catalog::new());
        catalog.register(
            "t",
            Schema::new(vec![Column::not_null("id", DataType::BigInt)]),
        );
        let transport = MemoryTransport::new(catalog.clone());
        (catalog, transport)
    }

    fn row(catalog: &Catalog, id: i64) -> RowBuffer {
        let schema = catalog.schema_of("t").unwrap();
        encode_row(&schema, &[Value::BigInt(id)]).unwrap()
    }

    #[test]
    fn test_insert_and_query() {
        let (catalog, transport) = setup();
        let ack = transport.dispatch_insert("t", &row(&catalog, 1)).unwrap();
        assert_eq!(ack.rows_affected, 1);

        let (schema, rows) = transport.dispatch_query("t", "select * from t").unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_batch_ordering() {
        let (catalog, transport) = setup();
        let batch: Vec<_> = (0..4).map(|i| row(&catalog, i)).collect();
        transport.dispatch_batch("t", &batch).unwrap();

        assert_eq!(transport.stored_rows("t"), batch);
        assert_eq!(transport.batch_sizes("t"), vec![4]);
    }

    #[test]
    fn test_unknown_table() {
        let (catalog, transport) = setup();
        let err = transport
            .dispatch_insert("missing", &row(&catalog, 1))
            .unwrap_err();
        assert_eq!(err, ClientError::TableNotFound("missing".to_string()));
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let (catalog, transport) = setup();
        transport.fail_next();
        assert!(matches!(
            transport.dispatch_insert("t", &row(&catalog, 1)),
            Err(ClientError::Remote(_))
        ));
        assert!(transport.dispatch_insert("t", &row(&catalog, 1)).is_ok());
    }
}
