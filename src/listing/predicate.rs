use serde_json::Value;

use super::types::{Collection, CompareOp, FilterPredicate};

/// SQL translation of a set of filter predicates: an AND-joined WHERE body
/// plus the bind values it references, numbered from `$1`.
#[derive(Debug, Clone)]
pub struct PredicateSet {
    pub clause: String,
    pub params: Vec<Value>,
}

impl PredicateSet {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

pub fn build(filters: &[FilterPredicate], collection: &Collection) -> PredicateSet {
    let mut params: Vec<Value> = vec![];
    let mut conditions: Vec<String> = vec![];

    for filter in filters {
        // A field the collection does not expose matches nothing, like a
        // filter on a field no document carries.
        if !collection.columns.contains(&filter.field.as_str()) {
            conditions.push("1=0".to_string());
            continue;
        }

        let quoted_column = format!("\"{}\"", filter.field);
        match filter.op {
            CompareOp::In => {
                let values: Vec<&str> = filter
                    .value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect();
                if values.is_empty() {
                    conditions.push("1=0".to_string());
                    continue;
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| push_param(&mut params, coerce(v)))
                    .collect();
                conditions.push(format!("{} IN ({})", quoted_column, placeholders.join(", ")));
            }
            op => {
                let placeholder = push_param(&mut params, coerce(&filter.value));
                conditions.push(format!("{} {} {}", quoted_column, op.to_sql(), placeholder));
            }
        }
    }

    PredicateSet { clause: conditions.join(" AND "), params }
}

fn push_param(params: &mut Vec<Value>, value: Value) -> String {
    params.push(value);
    format!("${}", params.len())
}

/// Query-string values arrive untyped; try the narrower readings before
/// falling back to text so numeric and boolean columns compare correctly.
fn coerce(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: Collection = Collection {
        table: "bootcamps",
        columns: &["id", "name", "rating", "housing", "careers", "created_at"],
    };

    fn predicate(field: &str, op: CompareOp, value: &str) -> FilterPredicate {
        FilterPredicate { field: field.to_string(), op, value: value.to_string() }
    }

    #[test]
    fn equality_filter_binds_one_param() {
        let set = build(&[predicate("name", CompareOp::Eq, "Devworks")], &COLLECTION);
        assert_eq!(set.clause, "\"name\" = $1");
        assert_eq!(set.params, vec![Value::String("Devworks".to_string())]);
    }

    #[test]
    fn comparison_operators_map_to_sql() {
        let set = build(
            &[
                predicate("rating", CompareOp::Gte, "5"),
                predicate("rating", CompareOp::Lt, "9"),
            ],
            &COLLECTION,
        );
        assert_eq!(set.clause, "\"rating\" >= $1 AND \"rating\" < $2");
        assert_eq!(set.params, vec![Value::from(5), Value::from(9)]);
    }

    #[test]
    fn in_operator_expands_comma_list() {
        let set = build(&[predicate("name", CompareOp::In, "a,b,c")], &COLLECTION);
        assert_eq!(set.clause, "\"name\" IN ($1, $2, $3)");
        assert_eq!(set.params.len(), 3);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let set = build(&[predicate("name", CompareOp::In, "")], &COLLECTION);
        assert_eq!(set.clause, "1=0");
        assert!(set.params.is_empty());
    }

    #[test]
    fn unknown_field_matches_nothing() {
        let set = build(&[predicate("password_hash", CompareOp::Eq, "x")], &COLLECTION);
        assert_eq!(set.clause, "1=0");
        assert!(set.params.is_empty());
    }

    #[test]
    fn values_coerce_to_narrowest_type() {
        assert_eq!(coerce("42"), Value::from(42));
        assert_eq!(coerce("4.5"), Value::from(4.5));
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("Business"), Value::String("Business".to_string()));
    }

    #[test]
    fn no_filters_produce_empty_clause() {
        let set = build(&[], &COLLECTION);
        assert!(set.is_empty());
    }
}
