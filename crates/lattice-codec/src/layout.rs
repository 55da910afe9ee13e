//! Row layout computation.
//!
//! A `RowLayout` is derived once from a schema and fixes every byte
//! offset in the encoded row: the null bitmap, the fixed-width slot of
//! each column, and the order in which variable-length payloads are
//! appended. Encoder, reader, and cursor all share the same layout, so
//! positions are stable for the lifetime of a prepared statement.

use lattice_common::Schema;

/// Row format version written into the header.
pub const FORMAT_VERSION: u8 = 1;

/// Header length in bytes: version, reserved, total size (`u32` LE).
pub const HEADER_LEN: usize = 6;

/// Precomputed byte offsets for a schema's row format.
#[derive(Debug, Clone)]
pub struct RowLayout {
    /// Null bitmap length in bytes (one bit per column).
    bitmap_len: usize,
    /// Absolute offset of each column's fixed-width slot.
    fixed_offsets: Vec<usize>,
    /// End of the fixed region; var payloads start here.
    fixed_end: usize,
    /// Columns with var-length payloads, in row-position order.
    var_columns: Vec<usize>,
}

impl RowLayout {
    /// Computes the layout for a schema.
    pub fn new(schema: &Schema) -> Self {
        let bitmap_len = (schema.len() + 7) / 8;
        let mut fixed_offsets = Vec::with_capacity(schema.len());
        let mut var_columns = Vec::new();

        let mut offset = HEADER_LEN + bitmap_len;
        for (idx, column) in schema.columns().iter().enumerate() {
            fixed_offsets.push(offset);
            offset += column.data_type.fixed_width();
            if column.data_type.is_var_len() {
                var_columns.push(idx);
            }
        }

        Self {
            bitmap_len,
            fixed_offsets,
            fixed_end: offset,
            var_columns,
        }
    }

    /// Returns the absolute offset of a column's fixed-width slot.
    pub fn fixed_offset(&self, index: usize) -> usize {
        self.fixed_offsets[index]
    }

    /// Returns the end of the fixed region (start of the var region).
    pub fn fixed_end(&self) -> usize {
        self.fixed_end
    }

    /// Returns the null bitmap length in bytes.
    pub fn bitmap_len(&self) -> usize {
        self.bitmap_len
    }

    /// Returns the columns stored in the var region, in append order.
    pub fn var_columns(&self) -> &[usize] {
        &self.var_columns
    }

    /// Returns the total row size for the given var-region payload total.
    pub fn row_size(&self, var_total: usize) -> usize {
        self.fixed_end + var_total
    }

    /// Sets the null bit for a column.
    pub fn set_null(&self, buf: &mut [u8], index: usize) {
        buf[HEADER_LEN + index / 8] |= 1 << (index % 8);
    }

    /// Returns true if the null bit for a column is set.
    pub fn is_null(&self, buf: &[u8], index: usize) -> bool {
        buf[HEADER_LEN + index / 8] & (1 << (index % 8)) != 0
    }
}
