use chrono::{DateTime, Utc};
use serde_json::Value;

/// Comparison applied to a single document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// JSON equality on the stored value.
    Eq(Value),
    /// Timestamp field within `[start, end)`.
    Within { start: DateTime<Utc>, end: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
}

/// A bound parameter for the generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Json(Value),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
