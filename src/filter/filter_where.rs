use serde_json::{Map, Value};

use super::types::{FilterOp, FilterWhereInfo, SqlParam};

/// Renders filter conditions as a SQL predicate over the `data` JSONB column.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Field names must already be validated; they are inlined into the SQL.
    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> (String, Vec<SqlParam>) {
        let sql_conditions: Vec<String> = conditions.iter().map(|c| self.build_sql_condition(c)).collect();
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, std::mem::take(&mut self.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        match &condition.operator {
            FilterOp::Eq(value) => {
                let mut containment = Map::new();
                containment.insert(condition.field.clone(), value.clone());
                format!("\"data\" @> {}", self.param(SqlParam::Json(Value::Object(containment))))
            }
            FilterOp::Within { start, end } => {
                let column = format!("(\"data\"->>'{}')::timestamptz", condition.field);
                let lower = self.param(SqlParam::Timestamp(*start));
                let upper = self.param(SqlParam::Timestamp(*end));
                format!("{column} >= {lower} AND {column} < {upper}")
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
