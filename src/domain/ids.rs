//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the names that end up in requests
//! and statement text: spreadsheet column labels, cell references and SQL
//! identifiers. Each type validates its format on construction, so a value that
//! exists is safe to interpolate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of letters in an A1 column label (`ZZZ` = column 18278)
const MAX_COLUMN_LETTERS: usize = 3;

/// Spreadsheet column label in A1 notation
///
/// Labels are normalised to upper case.
///
/// # Examples
///
/// ```
/// use sheetpipe::domain::ids::ColumnLabel;
/// use std::str::FromStr;
///
/// let column = ColumnLabel::from_str("ab").unwrap();
/// assert_eq!(column.as_str(), "AB");
/// assert_eq!(column.index(), 28);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnLabel(String);

impl ColumnLabel {
    /// Creates a new ColumnLabel from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ColumnLabel)` if the label is 1-3 ASCII letters, `Err` otherwise
    pub fn new(label: impl Into<String>) -> Result<Self, String> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err("Column label cannot be empty".to_string());
        }
        if trimmed.len() > MAX_COLUMN_LETTERS || !trimmed.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(format!(
                "Invalid column label '{label}'. Expected 1-{MAX_COLUMN_LETTERS} letters (A1 notation)"
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the label as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 1-based column index (`A` = 1, `Z` = 26, `AA` = 27)
    pub fn index(&self) -> u32 {
        self.0
            .bytes()
            .fold(0, |acc, b| acc * 26 + u32::from(b - b'A' + 1))
    }

    /// Cell reference for this column at a 1-based row
    pub fn at(&self, row: u64) -> CellRef {
        CellRef {
            column: self.clone(),
            row,
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ColumnLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ColumnLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnLabel> for String {
    fn from(label: ColumnLabel) -> Self {
        label.0
    }
}

/// A single cell address, rendered in A1 notation (`B12`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Column label
    pub column: ColumnLabel,
    /// 1-based row index
    pub row: u64,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Unquoted SQL identifier
///
/// Used for database, schema, table, field and role names. These are written
/// into statement text verbatim, so only `[A-Za-z_][A-Za-z0-9_$]*` is accepted.
///
/// # Examples
///
/// ```
/// use sheetpipe::domain::ids::SqlIdentifier;
///
/// assert!(SqlIdentifier::new("ORDER_LINES").is_ok());
/// assert!(SqlIdentifier::new("orders; DROP TABLE x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Creates a new SqlIdentifier from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        };
        if !valid {
            return Err(format!(
                "Invalid SQL identifier '{name}'. Must start with a letter or underscore and contain only letters, digits, '_' or '$'"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SqlIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SqlIdentifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SqlIdentifier> for String {
    fn from(id: SqlIdentifier) -> Self {
        id.0
    }
}

/// Fully qualified target table: `database.schema.table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedTable {
    pub database: SqlIdentifier,
    pub schema: SqlIdentifier,
    pub table: SqlIdentifier,
}

impl QualifiedTable {
    pub fn new(database: SqlIdentifier, schema: SqlIdentifier, table: SqlIdentifier) -> Self {
        Self {
            database,
            schema,
            table,
        }
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("A", 1 ; "single letter")]
    #[test_case("z", 26 ; "lower case")]
    #[test_case("AA", 27 ; "two letters")]
    #[test_case("ZZZ", 18278 ; "three letters")]
    fn test_column_index(label: &str, expected: u32) {
        assert_eq!(ColumnLabel::new(label).unwrap().index(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("A1" ; "contains digit")]
    #[test_case("ABCD" ; "too long")]
    #[test_case("Ä" ; "non ascii")]
    fn test_column_label_rejected(label: &str) {
        assert!(ColumnLabel::new(label).is_err());
    }

    #[test]
    fn test_cell_ref_display() {
        let column = ColumnLabel::from_str("c").unwrap();
        assert_eq!(column.at(12).to_string(), "C12");
    }

    #[test]
    fn test_column_label_serde() {
        let labels: Vec<ColumnLabel> = serde_json::from_str(r#"["a", "BC"]"#).unwrap();
        assert_eq!(labels[0].as_str(), "A");
        assert_eq!(serde_json::to_string(&labels).unwrap(), r#"["A","BC"]"#);

        assert!(serde_json::from_str::<Vec<ColumnLabel>>(r#"["1"]"#).is_err());
    }

    #[test_case("ORDERS" ; "upper")]
    #[test_case("_staging" ; "leading underscore")]
    #[test_case("amount$usd" ; "dollar")]
    fn test_sql_identifier_accepted(name: &str) {
        assert_eq!(SqlIdentifier::new(name).unwrap().as_str(), name);
    }

    #[test_case("" ; "empty")]
    #[test_case("1table" ; "leading digit")]
    #[test_case("my table" ; "space")]
    #[test_case("x'--" ; "quote")]
    fn test_sql_identifier_rejected(name: &str) {
        assert!(SqlIdentifier::new(name).is_err());
    }

    #[test]
    fn test_qualified_table_display() {
        let table = QualifiedTable::new(
            SqlIdentifier::new("ANALYTICS").unwrap(),
            SqlIdentifier::new("PUBLIC").unwrap(),
            SqlIdentifier::new("ORDERS").unwrap(),
        );
        assert_eq!(table.to_string(), "ANALYTICS.PUBLIC.ORDERS");
    }
}
