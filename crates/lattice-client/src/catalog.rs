//! Schema registry interface and in-memory catalog.
//!
//! The binding layer never fetches schemas itself; it consumes whatever
//! implements [`SchemaRegistry`]. The in-memory [`Catalog`] backs tests
//! and embedded use. Schemas are immutable once registered: a prepared
//! session keeps the `SchemaRef` it was built with, so re-registering a
//! table mid-session has no effect on that session.

use std::collections::HashMap;
use std::sync::Arc;

use lattice_common::{Schema, SchemaRef};
use parking_lot::RwLock;

use crate::error::{ClientError, ClientResult};

/// Source of table schemas.
pub trait SchemaRegistry: Send + Sync {
    /// Returns the schema for a table, or `TableNotFound`.
    fn schema_of(&self, table: &str) -> ClientResult<SchemaRef>;
}

/// In-memory schema catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<String, SchemaRef>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table schema, replacing any previous registration.
    pub fn register(&self, table: impl Into<String>, schema: Schema) {
        self.tables.write().insert(table.into(), Arc::new(schema));
    }

    /// Removes a table.
    pub fn drop_table(&self, table: &str) -> ClientResult<()> {
        self.tables
            .write()
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| ClientError::TableNotFound(table.to_string()))
    }

    /// Returns true if the table is registered.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    /// Lists all registered table names.
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }
}

impl SchemaRegistry for Catalog {
    fn schema_of(&self, table: &str) -> ClientResult<SchemaRef> {
        self.tables
            .read()
            .get(table)
            .cloned()
            .ok_or_else(|| ClientError::TableNotFound(table.to_string()))
    }
}
