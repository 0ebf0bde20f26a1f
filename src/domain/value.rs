//! Typed cell values
//!
//! Every cell read from the source is classified exactly once into a
//! [`RowValue`]. The variant decides how the value is rendered into statement
//! text; nothing downstream looks at the raw string again.

use std::fmt;

/// A single coerced cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValue {
    /// Numeric text, inserted as an unquoted literal
    Number(String),
    /// Any other text, inserted as a quoted literal
    Text(String),
    /// Empty or absent cell
    Null,
}

impl RowValue {
    /// Classify a raw cell value
    ///
    /// Absent cells and empty strings become `Null`. Text that parses as a
    /// finite number becomes `Number` (surrounding whitespace is dropped).
    /// Everything else is kept verbatim as `Text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetpipe::domain::RowValue;
    ///
    /// assert_eq!(RowValue::from_cell(Some("42.5")), RowValue::Number("42.5".to_string()));
    /// assert_eq!(RowValue::from_cell(Some("abc")), RowValue::Text("abc".to_string()));
    /// assert_eq!(RowValue::from_cell(Some("")), RowValue::Null);
    /// assert_eq!(RowValue::from_cell(None), RowValue::Null);
    /// ```
    pub fn from_cell(raw: Option<&str>) -> Self {
        match raw {
            None => RowValue::Null,
            Some("") => RowValue::Null,
            Some(text) => {
                let trimmed = text.trim();
                // f64 parsing also accepts "inf" and "NaN", which are not SQL literals
                match trimmed.parse::<f64>() {
                    Ok(number) if number.is_finite() => RowValue::Number(trimmed.to_string()),
                    _ => RowValue::Text(text.to_string()),
                }
            }
        }
    }

    /// Whether this is the `Null` variant
    pub fn is_null(&self) -> bool {
        matches!(self, RowValue::Null)
    }

    /// Render as a SQL literal
    pub fn to_sql_literal(&self) -> String {
        match self {
            RowValue::Number(literal) => literal.clone(),
            RowValue::Text(text) => format!("'{}'", text.replace('\'', "''")),
            RowValue::Null => "NULL".to_string(),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

/// Coerce a row of raw cells
pub fn coerce_row(raw: &[Option<String>]) -> Vec<RowValue> {
    raw.iter()
        .map(|cell| RowValue::from_cell(cell.as_deref()))
        .collect()
}
