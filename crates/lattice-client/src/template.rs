//! INSERT template analysis.
//!
//! `InsertTemplate::analyze` parses a parameterized INSERT statement
//! against a table schema and produces the placeholder schema the
//! binding session works from. Only enough SQL is understood to locate
//! the VALUES positions and their target columns; everything else about
//! the statement is the engine's business.
//!
//! Literal positions are validated lexically against their column's
//! declared type once, here, and pre-parsed into typed values, so
//! finalizing a row never re-reads statement text.

use lattice_codec::{encode_row, Placeholder, RowBinder, RowBuffer};
use lattice_common::{Column, DataType, SchemaRef, Value};

use crate::error::{ClientError, ClientResult};

/// An analyzed INSERT template: table, placeholder schema, and
/// pre-parsed literal values.
#[derive(Debug, Clone)]
pub struct InsertTemplate {
    table: String,
    schema: SchemaRef,
    placeholders: Vec<Placeholder>,
    /// One entry per row position; `None` exactly at `?` positions.
    literals: Vec<Option<Value>>,
}

impl InsertTemplate {
    /// Analyzes an INSERT statement against a table schema.
    ///
    /// Pure function of its inputs: no side effects, deterministic, and
    /// safe to call repeatedly for different templates against the same
    /// schema.
    pub fn analyze(schema: SchemaRef, sql: &str) -> ClientResult<InsertTemplate> {
        let parsed = parse_insert(sql)?;

        if let Some(names) = &parsed.columns {
            check_column_list(&schema, names)?;
        }
        if parsed.items.len() != schema.len() {
            return Err(ClientError::ColumnCountMismatch {
                expected: schema.len(),
                found: parsed.items.len(),
            });
        }

        let mut placeholders = Vec::new();
        let mut literals = Vec::with_capacity(schema.len());
        for (pos, item) in parsed.items.iter().enumerate() {
            // Position count equals schema length, checked above.
            let column = schema.columns()[pos].clone();
            match item {
                Token::Placeholder => {
                    placeholders.push(Placeholder {
                        row_position: pos,
                        column,
                    });
                    literals.push(None);
                }
                token => literals.push(Some(literal_value(&column, token)?)),
            }
        }

        Ok(InsertTemplate {
            table: parsed.table,
            schema,
            placeholders,
            literals,
        })
    }

    /// Returns the target table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the table schema the template was analyzed against.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the placeholder schema in template left-to-right order.
    ///
    /// Available before any binding, so callers can build tooling over
    /// the declared parameter metadata without executing.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Returns the number of `?` markers.
    pub fn param_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Returns true if the template has no placeholders.
    pub fn is_static(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Creates a fresh slot binder for this template.
    pub fn binder(&self) -> RowBinder {
        RowBinder::new(
            self.schema.clone(),
            self.placeholders.clone(),
            self.literals.clone(),
        )
    }

    /// Encodes a fully-literal template directly into a row.
    ///
    /// Fails with `StatementRequiresBinding` if the template contains
    /// any placeholder.
    pub fn literal_row(&self) -> ClientResult<RowBuffer> {
        if !self.is_static() {
            return Err(ClientError::StatementRequiresBinding {
                placeholders: self.param_count(),
            });
        }
        let row: Vec<Value> = self
            .literals
            .iter()
            .map(|v| v.clone().unwrap_or(Value::Null))
            .collect();
        Ok(encode_row(&self.schema, &row)?)
    }
}

/// Extracts the target table name without a schema.
///
/// The client uses this to look the schema up before full analysis.
pub fn table_of(sql: &str) -> ClientResult<String> {
    let mut sc = Scanner::new(sql);
    if !sc.eat_keyword("insert") || !sc.eat_keyword("into") {
        return Err(ClientError::MalformedTemplate(
            "expected 'insert into'".to_string(),
        ));
    }
    sc.identifier()
        .map(str::to_string)
        .ok_or_else(|| ClientError::MalformedTemplate("expected table name".to_string()))
}

/// One position in the VALUES clause.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Placeholder,
    Null,
    Quoted(String),
    Bare(String),
}

struct ParsedInsert {
    table: String,
    columns: Option<Vec<String>>,
    items: Vec<Token>,
}

fn parse_insert(sql: &str) -> ClientResult<ParsedInsert> {
    let mut sc = Scanner::new(sql);
    if !sc.eat_keyword("insert") || !sc.eat_keyword("into") {
        return Err(ClientError::MalformedTemplate(
            "expected 'insert into'".to_string(),
        ));
    }
    let table = sc
        .identifier()
        .map(str::to_string)
        .ok_or_else(|| ClientError::MalformedTemplate("expected table name".to_string()))?;

    let columns = if sc.eat_char('(') {
        let mut names = Vec::new();
        loop {
            let name = sc.identifier().map(str::to_string).ok_or_else(|| {
                ClientError::MalformedTemplate("expected column name".to_string())
            })?;
            names.push(name);
            if sc.eat_char(',') {
                continue;
            }
            if sc.eat_char(')') {
                break;
            }
            return Err(ClientError::MalformedTemplate(
                "expected ',' or ')' in column list".to_string(),
            ));
        }
        Some(names)
    } else {
        None
    };

    if !sc.eat_keyword("values") {
        return Err(ClientError::MalformedTemplate(
            "expected 'values'".to_string(),
        ));
    }
    if !sc.eat_char('(') {
        return Err(ClientError::MalformedTemplate(
            "expected '(' after 'values'".to_string(),
        ));
    }

    let mut items = Vec::new();
    loop {
        items.push(sc.value_token()?);
        if sc.eat_char(',') {
            continue;
        }
        if sc.eat_char(')') {
            break;
        }
        return Err(ClientError::MalformedTemplate(
            "expected ',' or ')' in values list".to_string(),
        ));
    }

    sc.eat_char(';');
    sc.skip_ws();
    if !sc.is_at_end() {
        return Err(ClientError::MalformedTemplate(format!(
            "unexpected trailing input: '{}'",
            sc.rest().trim()
        )));
    }

    Ok(ParsedInsert {
        table,
        columns,
        items,
    })
}

/// Validates a template column list: it must name every schema column,
/// in schema order, so placeholder row positions stay strictly
/// increasing.
fn check_column_list(schema: &SchemaRef, names: &[String]) -> ClientResult<()> {
    if names.len() != schema.len() {
        return Err(ClientError::ColumnCountMismatch {
            expected: schema.len(),
            found: names.len(),
        });
    }
    for (pos, name) in names.iter().enumerate() {
        let expected = &schema.columns()[pos].name;
        if expected.eq_ignore_ascii_case(name) {
            continue;
        }
        let known = schema
            .columns()
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name));
        if !known {
            return Err(ClientError::UnknownColumn(name.clone()));
        }
        return Err(ClientError::ColumnOrderMismatch {
            expected: expected.clone(),
            found: name.clone(),
        });
    }
    Ok(())
}

/// Parses a literal token against its target column's declared type.
fn literal_value(column: &Column, token: &Token) -> ClientResult<Value> {
    let mismatch = |found: String| ClientError::TemplateTypeMismatch {
        column: column.name.clone(),
        found,
    };
    match token {
        Token::Placeholder => unreachable!("placeholders handled by the caller"),
        Token::Null => {
            if column.nullable {
                Ok(Value::Null)
            } else {
                Err(mismatch("NULL".to_string()))
            }
        }
        Token::Quoted(s) => {
            if column.data_type == DataType::Varchar {
                Ok(Value::Varchar(s.clone()))
            } else {
                Err(mismatch(format!("'{}'", s)))
            }
        }
        Token::Bare(s) => {
            let lower = s.to_ascii_lowercase();
            if lower == "true" || lower == "false" {
                return if column.data_type == DataType::Bool {
                    Ok(Value::Bool(lower == "true"))
                } else {
                    Err(mismatch(s.clone()))
                };
            }
            let is_float = s.contains(['.', 'e', 'E']);
            match column.data_type {
                DataType::Int if !is_float => {
                    s.parse::<i32>().map(Value::Int).map_err(|_| mismatch(s.clone()))
                }
                DataType::BigInt if !is_float => {
                    s.parse::<i64>().map(Value::BigInt).map_err(|_| mismatch(s.clone()))
                }
                DataType::Date if !is_float => {
                    s.parse::<i32>().map(Value::Date).map_err(|_| mismatch(s.clone()))
                }
                DataType::Timestamp if !is_float => {
                    s.parse::<i64>().map(Value::Timestamp).map_err(|_| mismatch(s.clone()))
                }
                DataType::Float => {
                    s.parse::<f32>().map(Value::Float).map_err(|_| mismatch(s.clone()))
                }
                DataType::Double => {
                    s.parse::<f64>().map(Value::Double).map_err(|_| mismatch(s.clone()))
                }
                _ => Err(mismatch(s.clone())),
            }
        }
    }
}

/// Minimal character scanner over statement text.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        // The scanner only ever advances on ASCII boundaries.
        std::str::from_utf8(&self.input[self.pos..]).unwrap_or("")
    }

    /// Consumes a case-insensitive keyword at a word boundary.
    fn eat_keyword(&mut self, kw: &str) -> bool {
        self.skip_ws();
        let end = self.pos + kw.len();
        if end > self.input.len() {
            return false;
        }
        let candidate = &self.input[self.pos..end];
        if !candidate.eq_ignore_ascii_case(kw.as_bytes()) {
            return false;
        }
        if let Some(&next) = self.input.get(end) {
            if next.is_ascii_alphanumeric() || next == b'_' {
                return false;
            }
        }
        self.pos = end;
        true
    }

    fn eat_char(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.input.get(self.pos) == Some(&(c as u8)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    fn identifier(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let start = self.pos;
        match self.input.get(self.pos) {
            Some(&b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return None,
        }
        while let Some(&b) = self.input.get(self.pos) {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos]).ok()
    }

    /// Consumes one VALUES position: `?`, a quoted string, or a bare
    /// literal.
    fn value_token(&mut self) -> ClientResult<Token> {
        self.skip_ws();
        match self.input.get(self.pos) {
            Some(b'?') => {
                self.pos += 1;
                Ok(Token::Placeholder)
            }
            Some(b'\'') => self.quoted(),
            Some(_) => {
                let start = self.pos;
                while let Some(&b) = self.input.get(self.pos) {
                    if b == b',' || b == b')' || b.is_ascii_whitespace() {
                        break;
                    }
                    self.pos += 1;
                }
                let raw = std::str::from_utf8(&self.input[start..self.pos])
                    .map_err(|_| {
                        ClientError::MalformedTemplate("non-ASCII literal".to_string())
                    })?
                    .to_string();
                if raw.is_empty() {
                    return Err(ClientError::MalformedTemplate(
                        "empty value position".to_string(),
                    ));
                }
                if raw.eq_ignore_ascii_case("null") {
                    Ok(Token::Null)
                } else {
                    Ok(Token::Bare(raw))
                }
            }
            None => Err(ClientError::MalformedTemplate(
                "unterminated values list".to_string(),
            )),
        }
    }

    /// Consumes a single-quoted string; `''` escapes a quote.
    fn quoted(&mut self) -> ClientResult<Token> {
        debug_assert_eq!(self.input.get(self.pos), Some(&b'\''));
        self.pos += 1;
        let mut out = Vec::new();
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'\'' {
                if self.input.get(self.pos + 1) == Some(&b'\'') {
                    out.push(b'\'');
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                let s = String::from_utf8(out).map_err(|_| {
                    ClientError::MalformedTemplate("invalid UTF-8 in string literal".to_string())
                })?;
                return Ok(Token::Quoted(s));
            }
            out.push(b);
            self.pos += 1;
        }
        Err(ClientError::MalformedTemplate(
            "unterminated string literal".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_common::Schema;
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Column::not_null("col1", DataType::BigInt),
            Column::nullable("col2", DataType::Varchar),
            Column::nullable("col3", DataType::Int),
        ]))
    }

    #[test]
    fn test_all_placeholders() {
        let t = InsertTemplate::analyze(schema(), "insert into t1 values (?, ?, ?)").unwrap();
        assert_eq!(t.table(), "t1");
        assert_eq!(t.param_count(), 3);
        let positions: Vec<_> = t.placeholders().iter().map(|p| p.row_position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(t.placeholders()[1].column.name, "col2");
    }

    #[test]
    fn test_mixed_literals_and_placeholders() {
        let t =
            InsertTemplate::analyze(schema(), "insert into t1 values (?, 'hello', 42);").unwrap();
        assert_eq!(t.param_count(), 1);
        assert_eq!(t.placeholders()[0].row_position, 0);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let sql = "insert into t1 values (?, 'x', ?)";
        let a = InsertTemplate::analyze(schema(), sql).unwrap();
        let b = InsertTemplate::analyze(schema(), sql).unwrap();
        assert_eq!(a.placeholders(), b.placeholders());
        assert_eq!(a.table(), b.table());
    }

    #[test]
    fn test_column_count_mismatch() {
        let err = InsertTemplate::analyze(schema(), "insert into t1 values (?, ?)").unwrap_err();
        assert_eq!(
            err,
            ClientError::ColumnCountMismatch {
                expected: 3,
                found: 2
            }
        );
        let err =
            InsertTemplate::analyze(schema(), "insert into t1 values (?, ?, ?, ?)").unwrap_err();
        assert!(matches!(err, ClientError::ColumnCountMismatch { .. }));
    }

    #[test]
    fn test_literal_type_checked_eagerly() {
        // Quoted literal against a BIGINT column.
        let err =
            InsertTemplate::analyze(schema(), "insert into t1 values ('x', ?, ?)").unwrap_err();
        assert_eq!(
            err,
            ClientError::TemplateTypeMismatch {
                column: "col1".to_string(),
                found: "'x'".to_string(),
            }
        );
        // Out-of-range INT literal.
        let err = InsertTemplate::analyze(
            schema(),
            "insert into t1 values (1, null, 99999999999)",
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::TemplateTypeMismatch { .. }));
    }

    #[test]
    fn test_null_literal_on_not_null_column() {
        let err =
            InsertTemplate::analyze(schema(), "insert into t1 values (null, ?, ?)").unwrap_err();
        assert!(matches!(err, ClientError::TemplateTypeMismatch { .. }));
        // Nullable target is fine.
        InsertTemplate::analyze(schema(), "insert into t1 values (?, null, null)").unwrap();
    }

    #[test]
    fn test_column_list() {
        let t = InsertTemplate::analyze(
            schema(),
            "insert into t1 (col1, col2, col3) values (?, ?, ?)",
        )
        .unwrap();
        assert_eq!(t.param_count(), 3);

        let err = InsertTemplate::analyze(
            schema(),
            "insert into t1 (col2, col1, col3) values (?, ?, ?)",
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::ColumnOrderMismatch { .. }));

        let err = InsertTemplate::analyze(
            schema(),
            "insert into t1 (col1, col2, nope) values (?, ?, ?)",
        )
        .unwrap_err();
        assert_eq!(err, ClientError::UnknownColumn("nope".to_string()));
    }

    #[test]
    fn test_quoted_escapes() {
        let t =
            InsertTemplate::analyze(schema(), "insert into t1 values (1, 'it''s', null)").unwrap();
        assert!(t.is_static());
        let row = t.literal_row().unwrap();
        let reader = lattice_codec::RowReader::new(t.schema().clone(), row).unwrap();
        assert_eq!(reader.get(1).unwrap(), Value::Varchar("it's".to_string()));
    }

    #[test]
    fn test_literal_row_requires_no_placeholders() {
        let t = InsertTemplate::analyze(schema(), "insert into t1 values (?, null, null)").unwrap();
        assert_eq!(
            t.literal_row().unwrap_err(),
            ClientError::StatementRequiresBinding { placeholders: 1 }
        );
    }

    #[test]
    fn test_malformed_statements() {
        assert!(matches!(
            InsertTemplate::analyze(schema(), "select * from t1").unwrap_err(),
            ClientError::MalformedTemplate(_)
        ));
        assert!(matches!(
            InsertTemplate::analyze(schema(), "insert into t1 values (1, 'a'").unwrap_err(),
            ClientError::MalformedTemplate(_)
        ));
        assert!(matches!(
            InsertTemplate::analyze(schema(), "insert into t1 values (1, 'a, null)").unwrap_err(),
            ClientError::MalformedTemplate(_)
        ));
        assert!(matches!(
            InsertTemplate::analyze(schema(), "insert into t1 values (1, 2, 3) garbage")
                .unwrap_err(),
            ClientError::MalformedTemplate(_)
        ));
    }

    #[test]
    fn test_table_of() {
        assert_eq!(table_of("INSERT INTO Metrics VALUES (?)").unwrap(), "Metrics");
        assert!(table_of("delete from t").is_err());
    }

    #[test]
    fn test_keyword_boundaries() {
        // 'valuesX' is not the VALUES keyword.
        assert!(matches!(
            InsertTemplate::analyze(schema(), "insert into t1 valuesx (?, ?, ?)").unwrap_err(),
            ClientError::MalformedTemplate(_)
        ));
        // No space before the tuple is fine.
        InsertTemplate::analyze(schema(), "insert into t1 values(?, ?, ?)").unwrap();
    }
}
