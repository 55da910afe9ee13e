//! Row encoding and decoding.
//!
//! `encode_row` serializes a complete, type-valid sequence of values
//! into an immutable `RowBuffer` per the format described in the crate
//! docs. `RowReader` is the checked decode path over a single buffer;
//! the forward-only cursor in [`crate::cursor`] builds on it.

use bytes::{Bytes, BytesMut};
use lattice_common::{DataType, Schema, SchemaRef, Value};

use crate::error::{CodecError, CodecResult};
use crate::layout::{RowLayout, FORMAT_VERSION, HEADER_LEN};

/// An immutable, schema-laid-out binary encoding of one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBuffer(Bytes);

impl RowBuffer {
    /// Wraps raw bytes received from the storage engine.
    ///
    /// No validation happens here; `RowReader::new` validates the header
    /// before any field is read.
    pub fn from_bytes(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the buffer length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encodes a complete row of values against a schema.
///
/// Each value is validated against its column's declared type (see
/// [`Value::matches`] for the widening rules) and nullability before any
/// byte is written, so a failed call never produces a partial buffer.
/// Identical inputs always produce byte-identical output.
pub fn encode_row(schema: &Schema, values: &[Value]) -> CodecResult<RowBuffer> {
    if values.len() != schema.len() {
        return Err(CodecError::WrongColumnCount {
            expected: schema.len(),
            found: values.len(),
        });
    }

    let layout = RowLayout::new(schema);
    encode_row_with_layout(schema, &layout, values)
}

/// Encodes a row using a precomputed layout.
///
/// Prepared statements hold one layout for their lifetime and reuse it
/// across every finalized row.
pub fn encode_row_with_layout(
    schema: &Schema,
    layout: &RowLayout,
    values: &[Value],
) -> CodecResult<RowBuffer> {
    if values.len() != schema.len() {
        return Err(CodecError::WrongColumnCount {
            expected: schema.len(),
            found: values.len(),
        });
    }

    // Validate every value before writing anything.
    let mut var_total = 0usize;
    for (column, value) in schema.columns().iter().zip(values) {
        if value.is_null() {
            if !column.nullable {
                return Err(CodecError::NullNotAllowed(column.name.clone()));
            }
            continue;
        }
        if !value.matches(column.data_type) {
            return Err(CodecError::TypeMismatch {
                column: column.name.clone(),
                declared: column.data_type,
                actual: value
                    .data_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "NULL".to_string()),
            });
        }
        if let Value::Varchar(s) = value {
            var_total += s.len();
        }
    }
    // The header stores the total size as u32 and var offsets are u32,
    // so the whole row, not just the var region, must fit.
    let total = layout.row_size(var_total);
    if total > u32::MAX as usize {
        return Err(CodecError::PayloadTooLarge(total));
    }

    let mut buf = BytesMut::zeroed(total);

    buf[0] = FORMAT_VERSION;
    buf[2..HEADER_LEN].copy_from_slice(&(total as u32).to_le_bytes());

    let mut var_offset = layout.fixed_end();
    for (idx, (column, value)) in schema.columns().iter().zip(values).enumerate() {
        if value.is_null() {
            layout.set_null(&mut buf, idx);
            continue;
        }
        let at = layout.fixed_offset(idx);
        match column.data_type {
            DataType::Bool => {
                // Validated above, so the accessor cannot miss.
                buf[at] = u8::from(value.as_bool().unwrap_or_default());
            }
            DataType::Int => {
                write_i32(&mut buf, at, value.as_i32().unwrap_or_default());
            }
            DataType::Date => {
                let days = match value {
                    Value::Date(d) => *d,
                    _ => 0,
                };
                write_i32(&mut buf, at, days);
            }
            DataType::BigInt => {
                write_i64(&mut buf, at, value.as_i64().unwrap_or_default());
            }
            DataType::Timestamp => {
                let millis = match value {
                    Value::Timestamp(ts) => *ts,
                    _ => value.as_i64().unwrap_or_default(),
                };
                write_i64(&mut buf, at, millis);
            }
            DataType::Float => {
                let v = match value {
                    Value::Float(f) => *f,
                    Value::Int(i) => *i as f32,
                    _ => 0.0,
                };
                buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
            }
            DataType::Double => {
                let v = value.as_f64().unwrap_or_default();
                buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
            }
            DataType::Varchar => {
                let payload = value.as_str().unwrap_or_default().as_bytes();
                buf[at..at + 4].copy_from_slice(&(var_offset as u32).to_le_bytes());
                buf[at + 4..at + 8].copy_from_slice(&(payload.len() as u32).to_le_bytes());
                buf[var_offset..var_offset + payload.len()].copy_from_slice(payload);
                var_offset += payload.len();
            }
        }
    }

    Ok(RowBuffer(buf.freeze()))
}

fn write_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn write_i64(buf: &mut [u8], at: usize, v: i64) {
    buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

/// Checked decoder over a single row buffer.
#[derive(Debug)]
pub struct RowReader {
    schema: SchemaRef,
    layout: RowLayout,
    buf: RowBuffer,
}

impl RowReader {
    /// Creates a reader, validating the buffer's header against the schema.
    pub fn new(schema: SchemaRef, buf: RowBuffer) -> CodecResult<Self> {
        let layout = RowLayout::new(&schema);
        validate_header(&layout, buf.as_bytes())?;
        Ok(Self {
            schema,
            layout,
            buf,
        })
    }

    /// Returns the schema this reader decodes against.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns true if the column at `index` is NULL.
    pub fn is_null(&self, index: usize) -> CodecResult<bool> {
        if index >= self.schema.len() {
            return Err(CodecError::ColumnOutOfRange {
                index,
                count: self.schema.len(),
            });
        }
        Ok(self.layout.is_null(self.buf.as_bytes(), index))
    }

    /// Reads the column at `index` as a typed value.
    pub fn get(&self, index: usize) -> CodecResult<Value> {
        if index >= self.schema.len() {
            return Err(CodecError::ColumnOutOfRange {
                index,
                count: self.schema.len(),
            });
        }
        read_column(&self.schema, &self.layout, self.buf.as_bytes(), index)
    }

    /// Decodes every column into a vector of values.
    pub fn values(&self) -> CodecResult<Vec<Value>> {
        (0..self.schema.len()).map(|i| self.get(i)).collect()
    }
}

/// Validates the header, version and declared size of a row buffer.
pub(crate) fn validate_header(layout: &RowLayout, buf: &[u8]) -> CodecResult<()> {
    if buf.len() < layout.fixed_end() {
        return Err(CodecError::Truncated {
            expected: layout.fixed_end(),
            found: buf.len(),
        });
    }
    if buf[0] != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(buf[0]));
    }
    let declared = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
    if declared != buf.len() {
        return Err(CodecError::Truncated {
            expected: declared,
            found: buf.len(),
        });
    }
    Ok(())
}

/// Reads one column from a validated buffer. `index` must be in range.
pub(crate) fn read_column(
    schema: &Schema,
    layout: &RowLayout,
    buf: &[u8],
    index: usize,
) -> CodecResult<Value> {
    if layout.is_null(buf, index) {
        return Ok(Value::Null);
    }
    let column = &schema.columns()[index];
    let at = layout.fixed_offset(index);
    let value = match column.data_type {
        DataType::Bool => Value::Bool(buf[at] != 0),
        DataType::Int => Value::Int(read_i32(buf, at)),
        DataType::Date => Value::Date(read_i32(buf, at)),
        DataType::BigInt => Value::BigInt(read_i64(buf, at)),
        DataType::Timestamp => Value::Timestamp(read_i64(buf, at)),
        DataType::Float => {
            Value::Float(f32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]))
        }
        DataType::Double => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&buf[at..at + 8]);
            Value::Double(f64::from_le_bytes(raw))
        }
        DataType::Varchar => {
            let offset = u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
                as usize;
            let len =
                u32::from_le_bytes([buf[at + 4], buf[at + 5], buf[at + 6], buf[at + 7]]) as usize;
            if offset < layout.fixed_end() || offset.saturating_add(len) > buf.len() {
                return Err(CodecError::BadOffset {
                    offset,
                    len,
                    buf_len: buf.len(),
                });
            }
            let s = std::str::from_utf8(&buf[offset..offset + len])
                .map_err(|_| CodecError::InvalidUtf8(column.name.clone()))?;
            Value::Varchar(s.to_string())
        }
    };
    Ok(value)
}

/// Reads one column without revalidating var offsets or UTF-8.
///
/// # Safety
///
/// `buf` must be a buffer produced by this codec for `schema`, and
/// `index` must be within the schema. Violations panic on out-of-range
/// slicing rather than reading unrelated memory, but string payloads are
/// interpreted as UTF-8 without checking.
pub(crate) unsafe fn read_column_unchecked(
    schema: &Schema,
    layout: &RowLayout,
    buf: &[u8],
    index: usize,
) -> Value {
    if layout.is_null(buf, index) {
        return Value::Null;
    }
    let column = &schema.columns()[index];
    let at = layout.fixed_offset(index);
    match column.data_type {
        DataType::Bool => Value::Bool(buf[at] != 0),
        DataType::Int => Value::Int(read_i32(buf, at)),
        DataType::Date => Value::Date(read_i32(buf, at)),
        DataType::BigInt => Value::BigInt(read_i64(buf, at)),
        DataType::Timestamp => Value::Timestamp(read_i64(buf, at)),
        DataType::Float => {
            Value::Float(f32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]))
        }
        DataType::Double => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&buf[at..at + 8]);
            Value::Double(f64::from_le_bytes(raw))
        }
        DataType::Varchar => {
            let offset = u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
                as usize;
            let len =
                u32::from_le_bytes([buf[at + 4], buf[at + 5], buf[at + 6], buf[at + 7]]) as usize;
            let s = std::str::from_utf8_unchecked(&buf[offset..offset + len]);
            Value::Varchar(s.to_string())
        }
    }
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_i64(buf: &[u8], at: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use lattice_common::Column;
    use std::sync::Arc;

    fn test_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Column::not_null("id", DataType::BigInt),
            Column::nullable("name", DataType::Varchar),
            Column::nullable("score", DataType::Double),
        ]))
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let schema = test_schema();
        let values = vec![
            Value::BigInt(1001),
            Value::Varchar("world".to_string()),
            Value::Double(3.5),
        ];

        let buf = encode_row(&schema, &values).unwrap();
        let reader = RowReader::new(schema, buf).unwrap();

        assert_eq!(reader.get(0).unwrap(), Value::BigInt(1001));
        assert_eq!(reader.get(1).unwrap(), Value::Varchar("world".to_string()));
        assert_eq!(reader.get(2).unwrap(), Value::Double(3.5));
    }

    #[test]
    fn test_null_bitmap() {
        let schema = test_schema();
        let values = vec![Value::BigInt(1), Value::Null, Value::Null];

        let buf = encode_row(&schema, &values).unwrap();
        let reader = RowReader::new(schema, buf).unwrap();

        assert!(!reader.is_null(0).unwrap());
        assert!(reader.is_null(1).unwrap());
        assert_eq!(reader.get(1).unwrap(), Value::Null);
        assert_eq!(reader.get(2).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_rejected_on_not_null_column() {
        let schema = test_schema();
        let err = encode_row(&schema, &[Value::Null, Value::Null, Value::Null]).unwrap_err();
        assert_eq!(err, CodecError::NullNotAllowed("id".to_string()));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let schema = test_schema();
        let err = encode_row(
            &schema,
            &[Value::Varchar("1".into()), Value::Null, Value::Null],
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_wrong_column_count() {
        let schema = test_schema();
        let err = encode_row(&schema, &[Value::BigInt(1)]).unwrap_err();
        assert_eq!(
            err,
            CodecError::WrongColumnCount {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_deterministic_output() {
        let schema = test_schema();
        let values = vec![
            Value::BigInt(7),
            Value::Varchar("abc".to_string()),
            Value::Null,
        ];
        let a = encode_row(&schema, &values).unwrap();
        let b = encode_row(&schema, &values).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_widened_int_decodes_as_declared_type() {
        let schema = test_schema();
        let values = vec![Value::Int(5), Value::Null, Value::Int(2)];

        let buf = encode_row(&schema, &values).unwrap();
        let reader = RowReader::new(schema, buf).unwrap();

        assert_eq!(reader.get(0).unwrap(), Value::BigInt(5));
        assert_eq!(reader.get(2).unwrap(), Value::Double(2.0));
    }

    #[test]
    fn test_empty_string_payload() {
        let schema = test_schema();
        let values = vec![
            Value::BigInt(1),
            Value::Varchar(String::new()),
            Value::Null,
        ];
        let buf = encode_row(&schema, &values).unwrap();
        let layout = RowLayout::new(&schema);
        assert_eq!(buf.len(), layout.fixed_end());

        let reader = RowReader::new(schema, buf).unwrap();
        assert_eq!(reader.get(1).unwrap(), Value::Varchar(String::new()));
    }

    #[test]
    fn test_truncated_buffer_rejected() {
        let schema = test_schema();
        let buf = RowBuffer::from_bytes(Bytes::from_static(&[1, 0, 4, 0, 0, 0]));
        let err = RowReader::new(schema, buf).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    #[test]
    fn test_bad_version_rejected() {
        let schema = test_schema();
        let good = encode_row(&schema, &[Value::BigInt(1), Value::Null, Value::Null]).unwrap();
        let mut raw = good.as_bytes().to_vec();
        raw[0] = 99;
        let err = RowReader::new(schema, RowBuffer::from_bytes(Bytes::from(raw))).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion(99));
    }

    #[test]
    fn test_corrupt_var_offset_rejected() {
        let schema = test_schema();
        let good = encode_row(
            &schema,
            &[Value::BigInt(1), Value::Varchar("abc".into()), Value::Null],
        )
        .unwrap();
        let layout = RowLayout::new(&schema);
        let mut raw = good.as_bytes().to_vec();
        // Point the string offset past the end of the buffer.
        let at = layout.fixed_offset(1);
        let past_end = raw.len() as u32;
        raw[at..at + 4].copy_from_slice(&past_end.to_le_bytes());
        let reader = RowReader::new(schema, RowBuffer::from_bytes(Bytes::from(raw))).unwrap();
        let err = reader.get(1).unwrap_err();
        assert!(matches!(err, CodecError::BadOffset { .. }));
    }

    #[test]
    fn test_size_guard_counts_fixed_region() {
        let schema = test_schema();
        let layout = RowLayout::new(&schema);
        // A var payload that fits u32 on its own still wraps the u32
        // header size once the header, bitmap, and fixed slots are
        // added; the guard must trip on the whole row size.
        let var_total = u32::MAX as usize - layout.fixed_end() + 1;
        assert!(var_total <= u32::MAX as usize);
        assert!(layout.row_size(var_total) > u32::MAX as usize);
    }
}
