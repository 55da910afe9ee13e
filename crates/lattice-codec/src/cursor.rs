//! Forward-only cursor over query result rows.
//!
//! A `ResultCursor` owns a snapshot of the row buffers a query returned,
//! together with the result schema, and decodes columns on demand. The
//! cursor starts before the first row; `advance` must return `true`
//! before any column is read.

use lattice_common::{SchemaRef, Value};

use crate::error::{CodecError, CodecResult};
use crate::layout::RowLayout;
use crate::row::{read_column, read_column_unchecked, validate_header, RowBuffer};

/// Forward-only decoder over an ordered sequence of row buffers.
#[derive(Debug)]
pub struct ResultCursor {
    schema: SchemaRef,
    layout: RowLayout,
    rows: Vec<RowBuffer>,
    /// `None` before the first `advance`; `Some(rows.len())` once
    /// exhausted.
    position: Option<usize>,
}

impl ResultCursor {
    /// Creates a cursor, validating each buffer's header up front.
    pub fn new(schema: SchemaRef, rows: Vec<RowBuffer>) -> CodecResult<Self> {
        let layout = RowLayout::new(&schema);
        for row in &rows {
            validate_header(&layout, row.as_bytes())?;
        }
        Ok(Self {
            schema,
            layout,
            rows,
            position: None,
        })
    }

    /// Returns the result schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the total number of rows in the snapshot.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Moves to the next row. Returns `false` once exhausted; further
    /// calls keep returning `false`.
    pub fn advance(&mut self) -> bool {
        let next = match self.position {
            None => 0,
            Some(p) => (p + 1).min(self.rows.len()),
        };
        self.position = Some(next);
        next < self.rows.len()
    }

    /// Reads a column of the current row, with full validation.
    ///
    /// Fails with `NoCurrentRow` unless the last `advance` returned
    /// `true`, and with `ColumnOutOfRange` for a bad index.
    pub fn column(&self, index: usize) -> CodecResult<Value> {
        let row = self.current()?;
        if index >= self.schema.len() {
            return Err(CodecError::ColumnOutOfRange {
                index,
                count: self.schema.len(),
            });
        }
        read_column(&self.schema, &self.layout, row.as_bytes(), index)
    }

    /// Returns true if the column of the current row is NULL.
    pub fn is_null(&self, index: usize) -> CodecResult<bool> {
        let row = self.current()?;
        if index >= self.schema.len() {
            return Err(CodecError::ColumnOutOfRange {
                index,
                count: self.schema.len(),
            });
        }
        Ok(self.layout.is_null(row.as_bytes(), index))
    }

    /// Decodes every column of the current row.
    pub fn row_values(&self) -> CodecResult<Vec<Value>> {
        (0..self.schema.len()).map(|i| self.column(i)).collect()
    }

    /// Reads a column of the current row without revalidation.
    ///
    /// This is the hot-path variant of [`column`]: it skips cursor
    /// position, column bounds, var-offset, and UTF-8 checks.
    ///
    /// # Safety
    ///
    /// The last `advance` must have returned `true`, `index` must be
    /// within the schema, and the buffers must have been produced by
    /// this codec for this schema. Violating the first two panics in
    /// every build profile rather than reading an unrelated row.
    ///
    /// [`column`]: ResultCursor::column
    pub unsafe fn column_unchecked(&self, index: usize) -> Value {
        let position = self.position.expect("cursor not positioned");
        debug_assert!(index < self.schema.len());
        let row = &self.rows[position];
        read_column_unchecked(&self.schema, &self.layout, row.as_bytes(), index)
    }

    fn current(&self) -> CodecResult<&RowBuffer> {
        match self.position {
            Some(p) if p < self.rows.len() => Ok(&self.rows[p]),
            _ => Err(CodecError::NoCurrentRow),
        }
    }
}
