//! Table schema representation.
//!
//! A `Schema` is an ordered list of columns; column count and order define
//! the binary row layout, so schemas are immutable once built and shared
//! behind `SchemaRef`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Data types supported by the row codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point.
    Float,
    /// 64-bit floating point.
    Double,
    /// Variable-length UTF-8 string.
    Varchar,
    /// Calendar date, stored as days since the Unix epoch.
    Date,
    /// Timestamp, stored as milliseconds since the Unix epoch.
    Timestamp,
}

impl DataType {
    /// Returns the width of this type in the fixed region of a row, in
    /// bytes. Variable-length types occupy a fixed offset/length pair.
    pub fn fixed_width(self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::Int | DataType::Float | DataType::Date => 4,
            DataType::BigInt | DataType::Double | DataType::Timestamp => 8,
            // u32 offset + u32 length into the var region
            DataType::Varchar => 8,
        }
    }

    /// Returns true if values of this type are stored in the
    /// variable-length region of a row.
    pub fn is_var_len(self) -> bool {
        matches!(self, DataType::Varchar)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "BOOL",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
        };
        write!(f, "{}", name)
    }
}

/// A column in a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared data type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    /// Creates a non-nullable column.
    pub fn not_null(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, false)
    }

    /// Creates a nullable column.
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, true)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.name,
            self.data_type,
            if self.nullable { "" } else { " NOT NULL" }
        )
    }
}

/// Ordered column list defining a table's row layout.
///
/// Serialized as the bare column list; the name index is rebuilt on
/// deserialization so lookups keep working on a round-tripped schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Column>", into = "Vec<Column>")]
pub struct Schema {
    /// Columns in row-position order.
    columns: Vec<Column>,
    /// Index by column name for fast lookup.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a schema from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut schema = Self {
            columns: Vec::with_capacity(columns.len()),
            index: HashMap::new(),
        };
        for column in columns {
            schema.add_column(column);
        }
        schema
    }

    /// Appends a column to the schema.
    pub fn add_column(&mut self, column: Column) {
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the columns in row-position order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at the given row position.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Finds a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.index.get(name).and_then(|&i| self.columns.get(i))
    }

    /// Finds the row position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Column>> for Schema {
    fn from(columns: Vec<Column>) -> Self {
        Self::new(columns)
    }
}

impl From<Schema> for Vec<Column> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, "]")
    }
}

/// A reference-counted schema for sharing.
pub type SchemaRef = Arc<Schema>;
