use crate::record::{FieldValue, Record};

/// Row filter understood by every store.
///
/// Values stay typed all the way to the backend. SQL-speaking backends render
/// them with [`Predicate::to_where_clause`], which quotes both identifier and
/// literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Eq { attribute: String, value: FieldValue },
}

impl Predicate {
    pub fn all() -> Self {
        Predicate::All
    }

    pub fn eq(attribute: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Predicate::Eq {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// The attribute this predicate reads, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Predicate::All => None,
            Predicate::Eq { attribute, .. } => Some(attribute),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq { attribute, value } => record.get(attribute) == value,
        }
    }

    /// SQL-style rendering with quoted identifier and escaped literal, e.g.
    /// `"UTProvCode" = 'O''Neil Telecom'`.
    pub fn to_where_clause(&self) -> String {
        match self {
            Predicate::All => "1 = 1".to_string(),
            Predicate::Eq { attribute, value } if value.is_null() => {
                format!("{} IS NULL", quote_identifier(attribute))
            }
            Predicate::Eq { attribute, value } => {
                format!("{} = {}", quote_identifier(attribute), literal(value))
            }
        }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn literal(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "NULL".to_string(),
        FieldValue::Text(text) => quote_text(text),
        FieldValue::Integer(value) => value.to_string(),
        FieldValue::Double(value) => value.to_string(),
        FieldValue::Timestamp(at) => {
            format!("timestamp {}", quote_text(&at.format("%Y-%m-%d %H:%M:%S").to_string()))
        }
        FieldValue::Geometry(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            format!("X'{}'", hex)
        }
    }
}
