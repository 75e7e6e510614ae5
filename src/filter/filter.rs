use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterWhereInfo, SqlResult};

/// Conjunction of field conditions over a collection's documents.
///
/// The same filter is evaluated in SQL by the Postgres store and in process by
/// the in-memory store, so both backends agree on what matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FilterWhereInfo>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single equality condition.
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().eq(field, value)
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo {
            field: field.into(),
            operator: FilterOp::Eq(value.into()),
        });
        self
    }

    pub fn within(mut self, field: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.conditions.push(FilterWhereInfo {
            field: field.into(),
            operator: FilterOp::Within { start, end },
        });
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for condition in &self.conditions {
            Self::validate_field_name(&condition.field)?;
            if let FilterOp::Within { start, end } = &condition.operator {
                if start >= end {
                    return Err(FilterError::InvalidRange(condition.field.clone()));
                }
            }
        }
        Ok(())
    }

    /// Evaluate against a document body.
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|condition| match &condition.operator {
            FilterOp::Eq(expected) => data.get(&condition.field) == Some(expected),
            FilterOp::Within { start, end } => data
                .get(&condition.field)
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|ts| {
                    let ts = ts.with_timezone(&Utc);
                    ts >= *start && ts < *end
                })
                .unwrap_or(false),
        })
    }

    pub fn to_sql(&self, table_name: &str) -> Result<SqlResult, FilterError> {
        Self::validate_table_name(table_name)?;
        self.validate()?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = format!(
            "SELECT id, data, created_at, updated_at FROM \"{}\" WHERE {} ORDER BY created_at ASC, id ASC",
            table_name, where_clause
        );
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self, table_name: &str) -> Result<SqlResult, FilterError> {
        Self::validate_table_name(table_name)?;
        self.validate()?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table_name, where_clause);
        Ok(SqlResult { query, params })
    }

    pub fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidCollection(name.to_string()));
        }
        Ok(())
    }

    fn validate_field_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidField(name.to_string()));
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}
