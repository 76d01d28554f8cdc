use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};

use super::error::ListError;
use super::order;
use super::params;
use super::predicate::{self, PredicateSet};
use super::types::{Collection, Expand, ListEnvelope, ListParams, Pagination, Relation};

/// Materialize a listing: parse the raw query string, translate filters into
/// predicates, compose one data query (filter -> project -> sort -> paginate
/// -> expand) and one count query, execute both, and wrap the rows in the
/// result envelope.
///
/// Exactly two round trips per invocation, no mutation. Rows come back as
/// JSON documents via `row_to_json`.
pub async fn materialize(
    pool: &PgPool,
    collection: &Collection,
    raw_query: &str,
    expand: Option<Expand>,
) -> Result<ListEnvelope, ListError> {
    validate_identifiers(collection)?;
    let list_params = params::parse(raw_query)?;
    let predicates = predicate::build(&list_params.filters, collection);
    let data_sql = compose_query(collection, &list_params, &predicates, expand.as_ref())?;

    if crate::config::CONFIG.listing.debug_logging {
        tracing::debug!(table = collection.table, sql = %data_sql, "listing query");
    }

    // The total driving the pagination cursor is counted over the entire
    // collection, not the filtered subset.
    let total = count_all(pool, collection).await?;

    let mut query = sqlx::query(&data_sql);
    for param in &predicates.params {
        query = bind_value(query, param);
    }
    let rows = query.fetch_all(pool).await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        data.push(row.try_get::<Value, _>("row")?);
    }

    Ok(ListEnvelope {
        success: true,
        count: data.len(),
        pagination: Pagination::around(list_params.page, list_params.limit, total),
        data,
    })
}

async fn count_all(pool: &PgPool, collection: &Collection) -> Result<i64, ListError> {
    let sql = format!("SELECT count(*) AS count FROM \"{}\"", collection.table);
    let row = sqlx::query(&sql).fetch_one(pool).await?;
    Ok(row.try_get("count")?)
}

fn compose_query(
    collection: &Collection,
    list_params: &ListParams,
    predicates: &PredicateSet,
    expand: Option<&Expand>,
) -> Result<String, ListError> {
    let mut select_list = projection(collection, list_params.select.as_deref());
    if let Some(expand) = expand {
        select_list.push(expansion_subquery(expand)?);
    }

    let where_clause = if predicates.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", predicates.clause)
    };
    let order_clause = order::clause(&list_params.sort, collection);

    let inner = [
        format!("SELECT {}", select_list.join(", ")),
        format!("FROM \"{}\" AS base", collection.table),
        where_clause,
        order_clause,
        format!("LIMIT {} OFFSET {}", list_params.limit, list_params.start_index()),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(format!("SELECT row_to_json(t) AS row FROM ({}) t", inner))
}

/// Projection: the requested field allow-list intersected with the columns
/// the collection exposes, always including the identity field. No `select`
/// means every exposed column.
fn projection(collection: &Collection, select: Option<&[String]>) -> Vec<String> {
    match select {
        None => collection.columns.iter().map(|c| format!("\"{}\"", c)).collect(),
        Some(fields) => {
            let mut columns = vec!["\"id\"".to_string()];
            for field in fields {
                if field == "id" || !collection.columns.contains(&field.as_str()) {
                    continue;
                }
                let quoted = format!("\"{}\"", field);
                if !columns.contains(&quoted) {
                    columns.push(quoted);
                }
            }
            columns
        }
    }
}

/// Relation expansion as a correlated subquery, so the whole listing still
/// executes as a single data query.
fn expansion_subquery(expand: &Expand) -> Result<String, ListError> {
    let (name, target, fk_column, reverse) = match expand.relation {
        Relation::BelongsTo { name, target, fk_column } => (name, target, fk_column, false),
        Relation::HasMany { name, target, fk_column } => (name, target, fk_column, true),
    };
    validate_identifiers(target)?;
    validate_column(fk_column)?;
    validate_column(name)?;

    let target_select = match expand.select {
        None => target.columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>(),
        Some(fields) => {
            let mut columns = vec!["\"id\"".to_string()];
            for field in fields {
                if *field == "id" || !target.columns.contains(field) {
                    continue;
                }
                columns.push(format!("\"{}\"", field));
            }
            columns
        }
    }
    .join(", ");

    Ok(if reverse {
        format!(
            "(SELECT coalesce(json_agg(r), '[]'::json) FROM (SELECT {} FROM \"{}\" WHERE \"{}\".\"{}\" = base.\"id\") r) AS \"{}\"",
            target_select, target.table, target.table, fk_column, name
        )
    } else {
        format!(
            "(SELECT row_to_json(r) FROM (SELECT {} FROM \"{}\" WHERE \"{}\".\"id\" = base.\"{}\") r) AS \"{}\"",
            target_select, target.table, target.table, fk_column, name
        )
    })
}

fn validate_identifiers(collection: &Collection) -> Result<(), ListError> {
    if !is_valid_identifier(collection.table) {
        return Err(ListError::InvalidTableName(collection.table.to_string()));
    }
    for column in collection.columns {
        validate_column(column)?;
    }
    Ok(())
}

fn validate_column(column: &str) -> Result<(), ListError> {
    if !is_valid_identifier(column) {
        return Err(ListError::InvalidColumn(column.to_string()));
    }
    Ok(())
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        Value::Null => {
            let none: Option<String> = None;
            query.bind(none)
        }
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s),
        other => query.bind(other.clone()),
    }
}
