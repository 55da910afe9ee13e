//! # lattice-common
//!
//! Common types for LatticeDB client components.
//!
//! This crate provides the foundational types shared by the row codec and
//! the client SDK:
//!
//! - **Schema**: `DataType`, `Column`, and `Schema` describing table layout
//! - **Values**: the closed `Value` variant type bound into rows
//!
//! ## Example
//!
//! ```rust
//! use lattice_common::{Column, DataType, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Column::not_null("id", DataType::BigInt),
//!     Column::nullable("name", DataType::Varchar),
//! ]);
//! assert_eq!(schema.len(), 2);
//! assert!(Value::BigInt(1).matches(DataType::BigInt));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod schema;
pub mod value;

pub use schema::{Column, DataType, Schema, SchemaRef};
pub use value::Value;
