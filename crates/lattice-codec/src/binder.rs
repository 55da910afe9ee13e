//! Incremental parameter binding for prepared inserts.
//!
//! A `RowBinder` holds the placeholder schema of one prepared INSERT
//! template plus the template's literal values, and accumulates bound
//! parameters into a slot set. `finalize` merges slots and literals into
//! full-row order and serializes them. Binding failures leave the slot
//! set untouched, so a rejected bind can simply be retried with a
//! correct value.

use lattice_common::{Column, SchemaRef, Value};

use crate::error::{CodecError, CodecResult};
use crate::layout::RowLayout;
use crate::row::{encode_row_with_layout, RowBuffer};

/// One `?` marker in an INSERT template: the column it targets and that
/// column's position in the full row.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Position of the target column in the full row.
    pub row_position: usize,
    /// The target column.
    pub column: Column,
}

/// Type-checked slot set for one prepared INSERT template.
///
/// Slots are indexed by placeholder order (template left-to-right), not
/// by row position. The binder owns its slots exclusively; it is `Send`
/// but not internally synchronized.
#[derive(Debug)]
pub struct RowBinder {
    schema: SchemaRef,
    layout: RowLayout,
    placeholders: Vec<Placeholder>,
    /// Literal values fixed at analysis time, `None` at placeholder
    /// positions.
    literals: Vec<Option<Value>>,
    slots: Vec<Option<Value>>,
}

impl RowBinder {
    /// Creates a binder for a template's placeholder schema.
    ///
    /// `literals` must hold one entry per full-row position, `None`
    /// exactly at the placeholder positions. The template analyzer
    /// upholds this.
    pub fn new(schema: SchemaRef, placeholders: Vec<Placeholder>, literals: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(literals.len(), schema.len());
        debug_assert!(placeholders.windows(2).all(|w| w[0].row_position < w[1].row_position));
        let layout = RowLayout::new(&schema);
        let slots = vec![None; placeholders.len()];
        Self {
            schema,
            layout,
            placeholders,
            literals,
            slots,
        }
    }

    /// Returns the placeholder schema in template order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Returns the number of placeholders.
    pub fn param_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Returns the schema the binder encodes against.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns true if every slot has been bound.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Binds a value to the placeholder at `index` (0-based, template
    /// order).
    ///
    /// The value's type is checked against the target column's declared
    /// type and nullability before the slot is touched; on error the
    /// slot keeps its previous state.
    pub fn bind(&mut self, index: usize, value: Value) -> CodecResult<()> {
        let placeholder = self.placeholders.get(index).ok_or(CodecError::IndexOutOfRange {
            index,
            count: self.placeholders.len(),
        })?;
        let column = &placeholder.column;
        if value.is_null() {
            if !column.nullable {
                return Err(CodecError::NullNotAllowed(column.name.clone()));
            }
        } else if !value.matches(column.data_type) {
            return Err(CodecError::TypeMismatch {
                column: column.name.clone(),
                declared: column.data_type,
                actual: value
                    .data_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "NULL".to_string()),
            });
        }
        self.slots[index] = Some(value);
        Ok(())
    }

    /// Serializes the bound slots and template literals into a row.
    ///
    /// Fails with `IncompleteParameters` naming the first unbound
    /// column. The slot set is left intact either way; call [`reset`]
    /// to start the next row.
    ///
    /// [`reset`]: RowBinder::reset
    pub fn finalize(&self) -> CodecResult<RowBuffer> {
        for (placeholder, slot) in self.placeholders.iter().zip(&self.slots) {
            if slot.is_none() {
                return Err(CodecError::IncompleteParameters(
                    placeholder.column.name.clone(),
                ));
            }
        }

        let mut row: Vec<Value> = Vec::with_capacity(self.schema.len());
        let mut next_slot = 0usize;
        for (pos, literal) in self.literals.iter().enumerate() {
            match literal {
                Some(v) => row.push(v.clone()),
                None => {
                    debug_assert_eq!(self.placeholders[next_slot].row_position, pos);
                    // Checked for completeness above.
                    row.push(self.slots[next_slot].clone().unwrap_or(Value::Null));
                    next_slot += 1;
                }
            }
        }

        encode_row_with_layout(&self.schema, &self.layout, &row)
    }

    /// Clears every slot for the next logical row.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowReader;
    use lattice_common::{DataType, Schema};
    use std::sync::Arc;

    fn binder() -> RowBinder {
        // insert into t values (?, 'fixed', ?)
        let schema = Arc::new(Schema::new(vec![
            Column::not_null("col1", DataType::BigInt),
            Column::nullable("col2", DataType::Varchar),
            Column::nullable("col3", DataType::Int),
        ]));
        let placeholders = vec![
            Placeholder {
                row_position: 0,
                column: schema.column(0).unwrap().clone(),
            },
            Placeholder {
                row_position: 2,
                column: schema.column(2).unwrap().clone(),
            },
        ];
        let literals = vec![None, Some(Value::Varchar("fixed".into())), None];
        RowBinder::new(schema, placeholders, literals)
    }

    #[test]
    fn test_bind_and_finalize() {
        let mut b = binder();
        b.bind(0, Value::BigInt(1001)).unwrap();
        b.bind(1, Value::Int(7)).unwrap();
        assert!(b.is_complete());

        let buf = b.finalize().unwrap();
        let reader = RowReader::new(b.schema().clone(), buf).unwrap();
        assert_eq!(reader.get(0).unwrap(), Value::BigInt(1001));
        assert_eq!(reader.get(1).unwrap(), Value::Varchar("fixed".into()));
        assert_eq!(reader.get(2).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_incomplete_parameters() {
        let mut b = binder();
        b.bind(0, Value::BigInt(1)).unwrap();
        let err = b.finalize().unwrap_err();
        assert_eq!(err, CodecError::IncompleteParameters("col3".into()));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut b = binder();
        let err = b.bind(2, Value::BigInt(1)).unwrap_err();
        assert_eq!(err, CodecError::IndexOutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn test_failed_bind_leaves_slot_unset() {
        let mut b = binder();
        let err = b.bind(0, Value::Varchar("oops".into())).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));

        // Slot 0 is still unset, so finalize reports it rather than
        // silently encoding a wrong value.
        b.bind(1, Value::Int(1)).unwrap();
        let err = b.finalize().unwrap_err();
        assert_eq!(err, CodecError::IncompleteParameters("col1".into()));

        // A correct re-bind succeeds.
        b.bind(0, Value::BigInt(5)).unwrap();
        assert!(b.finalize().is_ok());
    }

    #[test]
    fn test_null_bind_checked_eagerly() {
        let mut b = binder();
        let err = b.bind(0, Value::Null).unwrap_err();
        assert_eq!(err, CodecError::NullNotAllowed("col1".into()));
        // Nullable target accepts NULL.
        b.bind(1, Value::Null).unwrap();
    }

    #[test]
    fn test_reset_clears_slots() {
        let mut b = binder();
        b.bind(0, Value::BigInt(1)).unwrap();
        b.bind(1, Value::Int(2)).unwrap();
        b.finalize().unwrap();
        b.reset();
        assert!(!b.is_complete());
        assert!(matches!(
            b.finalize().unwrap_err(),
            CodecError::IncompleteParameters(_)
        ));
    }

    #[test]
    fn test_rebind_overwrites() {
        let mut b = binder();
        b.bind(0, Value::BigInt(1)).unwrap();
        b.bind(0, Value::BigInt(2)).unwrap();
        b.bind(1, Value::Null).unwrap();
        let buf = b.finalize().unwrap();
        let reader = RowReader::new(b.schema().clone(), buf).unwrap();
        assert_eq!(reader.get(0).unwrap(), Value::BigInt(2));
    }
}
