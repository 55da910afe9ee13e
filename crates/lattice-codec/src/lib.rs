//! # lattice-codec
//!
//! Schema-driven binary row codec for LatticeDB.
//!
//! This crate converts between typed column values and the storage
//! engine's binary row format. It implements:
//!
//! - **Layout**: deterministic per-schema field offsets (`RowLayout`)
//! - **Encoding**: complete rows to immutable buffers (`encode_row`)
//! - **Binding**: incremental, type-checked parameter binding for
//!   prepared inserts (`RowBinder`)
//! - **Decoding**: single-row reads (`RowReader`) and forward-only
//!   iteration over query results (`ResultCursor`)
//!
//! # Row Format
//!
//! ```text
//! ┌────────────────┬─────────────┬──────────────────┬─────────────────┐
//! │ header (6 B)   │ null bitmap │   fixed region   │   var region    │
//! │ ver, rsv, size │ 1 bit/col   │ values / offsets │ string payloads │
//! └────────────────┴─────────────┴──────────────────┴─────────────────┘
//! ```
//!
//! Fixed-width columns store their value directly in the fixed region;
//! variable-length columns store a `u32` absolute offset and `u32`
//! length pointing into the var region of the same buffer. Null columns
//! have their bitmap bit set and a zeroed fixed slot. The same input
//! values always produce byte-identical output.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binder;
pub mod cursor;
pub mod error;
pub mod layout;
pub mod row;

pub use binder::{Placeholder, RowBinder};
pub use cursor::ResultCursor;
pub use error::{CodecError, CodecResult};
pub use layout::RowLayout;
pub use row::{encode_row, RowBuffer, RowReader};
