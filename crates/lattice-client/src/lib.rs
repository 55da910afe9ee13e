//! # lattice-client
//!
//! Client SDK for LatticeDB.
//!
//! This crate provides the client-facing half of the row codec stack:
//!
//! - **Template analysis**: extracting the placeholder schema from a
//!   parameterized INSERT statement
//! - **Binding sessions**: incremental, type-checked parameter binding
//!   with single-execute and batch-accumulate modes
//! - **Schema registry and transport interfaces**: the collaborators a
//!   session dispatches through, with in-memory implementations for
//!   tests and embedding
//! - **Query cursors**: decoding returned row buffers via the
//!   forward-only `ResultCursor`
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use lattice_client::{Catalog, Client, ClientConfig, MemoryTransport};
//! use lattice_common::{Column, DataType, Schema};
//!
//! # fn main() -> Result<(), lattice_client::ClientError> {
//! let catalog = Arc::new(Catalog::new());
//! catalog.register(
//!     "trades",
//!     Schema::new(vec![
//!         Column::not_null("id", DataType::BigInt),
//!         Column::nullable("symbol", DataType::Varchar),
//!     ]),
//! );
//! let transport = Arc::new(MemoryTransport::new(catalog.clone()));
//! let client = Client::new(ClientConfig::default(), catalog, transport);
//!
//! let mut session = client.prepare_insert("insert into trades values (?, ?)")?;
//! session.bind(0, 1001i64)?;
//! session.bind(1, "world")?;
//! session.execute()?;
//!
//! let mut cursor = client.execute_query("trades", "select * from trades")?;
//! assert!(cursor.advance());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;

/// Client configuration.
pub mod config;

/// Schema registry interface and in-memory catalog.
pub mod catalog;

/// Transport interface and in-memory implementation.
pub mod transport;

/// INSERT template analysis.
pub mod template;

/// Prepared-insert binding session.
pub mod session;

/// Client façade.
pub mod client;

// Re-exports
pub use catalog::{Catalog, SchemaRegistry};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use lattice_codec::{Placeholder, ResultCursor, RowBuffer};
pub use session::InsertSession;
pub use template::InsertTemplate;
pub use transport::{Ack, MemoryTransport, Transport};
