use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// SQL text plus the values for its placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Query {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: Vec::new() }
    }

    #[must_use]
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self { sql: sql.into(), params }
    }

    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Accept only plain identifiers, so table and column names can be spliced into SQL text.
///
/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] unless `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<&str, TrainingError> {
    let mut chars = name.chars();
    let valid_head = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(TrainingError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_reject_quotes_and_whitespace() {
        assert_eq!(validate_identifier("movie_ratings"), Ok("movie_ratings"));
        assert_eq!(validate_identifier("_tmp1"), Ok("_tmp1"));
        for bad in ["", "1movies", "movies; DROP TABLE actors", "full name", "a'b", "t\"x"] {
            assert_eq!(
                validate_identifier(bad),
                Err(TrainingError::InvalidIdentifier(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn optional_values_bind_as_null() {
        let query = Query::new("SELECT ?, ?").bind(None::<String>).bind(Some(3_i64));
        assert_eq!(query.params, vec![SqlValue::Null, SqlValue::Integer(3)]);
    }
}
