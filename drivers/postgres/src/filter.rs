//! Translation of filter and projection documents into SQL.
//!
//! `{status: "A", age: {$gte: 18, $lt: 65}, deleted: null}` becomes
//! `WHERE "status" = $1 AND "age" >= $2 AND "age" < $3 AND "deleted" IS NULL`; values are bound
//! as parameters, never interpolated.

use dbsh_driver::Error::ConversionError;
use dbsh_driver::{Document, Result, Value};

/// A `WHERE` clause and the values bound to its placeholders
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Clause {
    pub(crate) sql: String,
    pub(crate) parameters: Vec<Value>,
}

impl Clause {
    fn bind(&mut self, value: &Value) -> String {
        self.parameters.push(value.clone());
        format!("${}", self.parameters.len())
    }
}

/// Quote an identifier; each dotted part is quoted separately so `public.users` addresses the
/// `users` table of the `public` schema.
pub(crate) fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// The select list for a projection; fields with a truthy value are selected, an empty
/// projection selects all columns.
pub(crate) fn select_list(projection: &Document) -> String {
    let columns: Vec<String> = projection
        .iter()
        .filter(|(_, value)| value.is_truthy())
        .map(|(column, _)| quote_identifier(column))
        .collect();
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    }
}

/// Build the `WHERE` clause for a filter; an empty filter produces an empty clause.
///
/// # Errors
/// * If the filter uses an unsupported operator or value
pub(crate) fn where_clause(filter: &Document) -> Result<Clause> {
    let mut clause = Clause::default();
    let mut conditions = Vec::new();

    for (column, value) in filter {
        let column = quote_identifier(column);
        match value {
            Value::Map(operators) if is_operator_document(operators) => {
                for (operator, operand) in operators {
                    conditions.push(condition(&mut clause, &column, operator, operand)?);
                }
            }
            Value::Map(_) | Value::Array(_) => {
                return Err(ConversionError(format!(
                    "unsupported filter value for {column}: {value}"
                )));
            }
            value => conditions.push(condition(&mut clause, &column, "$eq", value)?),
        }
    }

    if !conditions.is_empty() {
        clause.sql = format!(" WHERE {}", conditions.join(" AND "));
    }
    Ok(clause)
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

fn condition(clause: &mut Clause, column: &str, operator: &str, operand: &Value) -> Result<String> {
    let condition = match (operator, operand) {
        ("$eq", Value::Null) => format!("{column} IS NULL"),
        ("$ne", Value::Null) => format!("{column} IS NOT NULL"),
        ("$in" | "$nin", Value::Array(values)) => {
            let negate = operator == "$nin";
            if values.is_empty() {
                return Ok(if negate { "TRUE" } else { "FALSE" }.to_string());
            }
            let placeholders: Vec<String> =
                values.iter().map(|value| clause.bind(value)).collect();
            let keyword = if negate { "NOT IN" } else { "IN" };
            format!("{column} {keyword} ({})", placeholders.join(", "))
        }
        ("$in" | "$nin", _) => {
            return Err(ConversionError(format!("{operator} requires an array")));
        }
        (_, Value::Array(_) | Value::Map(_)) => {
            return Err(ConversionError(format!(
                "unsupported operand for {operator}: {operand}"
            )));
        }
        _ => {
            let comparison = match operator {
                "$eq" => "=",
                "$ne" => "<>",
                "$gt" => ">",
                "$gte" => ">=",
                "$lt" => "<",
                "$lte" => "<=",
                "$like" => "LIKE",
                _ => {
                    return Err(ConversionError(format!(
                        "unsupported filter operator {operator}"
                    )));
                }
            };
            format!("{column} {comparison} {}", clause.bind(operand))
        }
    };
    Ok(condition)
}
