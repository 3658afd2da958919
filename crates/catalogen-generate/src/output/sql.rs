use std::fmt::Write as _;

/// Value of a single column in a generated row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    /// Rendered quoted with four decimals.
    Decimal(f64),
    Text(String),
}

impl SqlValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn render(&self, out: &mut String) {
        match self {
            SqlValue::Null => out.push_str("NULL"),
            SqlValue::Int(value) => {
                let _ = write!(out, "{value}");
            }
            SqlValue::Decimal(value) => {
                let _ = write!(out, "'{value:.4}'");
            }
            SqlValue::Text(value) => {
                out.push('\'');
                escape_into(value, out);
                out.push('\'');
            }
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(value.to_string()))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Decimal(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Ordered column/value pairs of one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(&'static str, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column, replacing any previous value.
    pub fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Multi-row INSERT statement with its row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub rows: usize,
    pub dropped: usize,
}

/// Builds one `INSERT INTO` for `rows`.
///
/// The first row fixes the column list; rows missing any of those columns
/// are dropped.
pub fn insert_statement(table: &str, rows: &[Row]) -> Option<Statement> {
    let first = rows.first()?;
    let columns: Vec<&'static str> = first.columns().collect();

    let mut sql = String::with_capacity(64 + rows.len() * columns.len() * 12);
    sql.push_str("INSERT INTO ");
    quote_identifier(table, &mut sql);
    sql.push_str(" (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        quote_identifier(column, &mut sql);
    }
    sql.push_str(") VALUES ");

    let mut written = 0;
    let mut dropped = 0;
    let mut values: Vec<&SqlValue> = Vec::with_capacity(columns.len());
    for row in rows {
        values.clear();
        for column in &columns {
            match row.get(column) {
                Some(value) => values.push(value),
                None => break,
            }
        }
        if values.len() != columns.len() {
            dropped += 1;
            continue;
        }

        if written > 0 {
            sql.push(',');
        }
        sql.push('(');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            value.render(&mut sql);
        }
        sql.push(')');
        written += 1;
    }
    sql.push_str(";\n");

    Some(Statement {
        sql,
        rows: written,
        dropped,
    })
}

pub fn quote_identifier(name: &str, out: &mut String) {
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_null_int_decimal_and_escaped_text() {
        let rows = vec![
            Row::new()
                .with("value_id", SqlValue::Null)
                .with("attribute_id", 73_u64)
                .with("price", 12.5_f64)
                .with("value", "O'Brien \"big\"\nline"),
        ];

        let statement = insert_statement("catalog_product_entity_varchar", &rows).expect("sql");
        assert_eq!(
            statement.sql,
            "INSERT INTO `catalog_product_entity_varchar` (`value_id`, `attribute_id`, `price`, `value`) \
             VALUES (NULL, 73, '12.5000', 'O\\'Brien \\\"big\\\"\\nline');\n"
        );
    }

    #[test]
    fn rows_missing_first_row_columns_are_dropped() {
        let rows = vec![
            Row::new().with("a", 1_i64).with("b", 2_i64),
            Row::new().with("a", 3_i64),
            Row::new().with("b", 6_i64).with("a", 5_i64).with("c", 7_i64),
        ];

        let statement = insert_statement("t", &rows).expect("sql");
        assert_eq!(statement.rows, 2);
        assert_eq!(statement.dropped, 1);
        assert_eq!(statement.sql, "INSERT INTO `t` (`a`, `b`) VALUES (1, 2),(5, 6);\n");
    }

    #[test]
    fn empty_buffer_yields_no_statement() {
        assert!(insert_statement("t", &[]).is_none());
    }

    #[test]
    fn identifiers_escape_backticks() {
        let mut out = String::new();
        quote_identifier("odd`name", &mut out);
        assert_eq!(out, "`odd``name`");
    }

    #[test]
    fn set_replaces_existing_column() {
        let mut row = Row::new().with("status", 1_i64);
        row.set("status", 0_i64);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("status"), Some(&SqlValue::Int(0)));
    }
}
