//! Generic record CRUD over runtime-supplied table names.
//!
//! Tables are treated as opaque bags of columns: input records are untyped
//! JSON objects validated against the live catalog at call time, and rows
//! come back as JSON objects shaped by the server. Composite primary keys
//! are not supported; see [`pk::resolve_primary_key`].

mod pk;
mod sql;

pub use pk::resolve_primary_key;

use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

/// Default schema when a caller does not supply one.
pub const DEFAULT_SCHEMA: &str = "public";

/// An untyped row: column name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One entry of the column whitelist, carrying the native type used for
/// bind-parameter casts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub udt: String,
}

/// List every row of a table. Unbounded: no pagination or filtering, which
/// is acceptable for a schema-inspection tool but not for production scale.
pub async fn list(
    pool: &PgPool,
    table: &str,
    schema: &str,
) -> Result<Vec<Record>, BackplaneError> {
    let rows = sqlx::query_scalar::<_, String>(&sql::build_select_all(schema, table))
        .fetch_all(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    rows.iter().map(|row| parse_row(row)).collect()
}

/// Fetch a single row by primary key.
pub async fn get(
    pool: &PgPool,
    table: &str,
    schema: &str,
    id: &str,
) -> Result<Record, BackplaneError> {
    let pk = resolve_primary_key(pool, table, Some(schema)).await?;
    let row = sqlx::query_scalar::<_, String>(&sql::build_select_by_id(schema, table, &pk))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    match row {
        Some(row) => parse_row(&row),
        None => Err(row_not_found(schema, table, id)),
    }
}

/// Insert a record, rejecting any key that is not a declared column of the
/// table. Returns the full inserted row including server-generated defaults.
pub async fn insert(
    pool: &PgPool,
    table: &str,
    schema: &str,
    record: &Record,
) -> Result<Record, BackplaneError> {
    let columns = column_whitelist(pool, schema, table).await?;
    let (statement, binds) = sql::build_insert(schema, table, &columns, record)?;
    let mut query = sqlx::query_scalar::<_, String>(&statement);
    for bind in &binds {
        query = query.bind(bind.as_deref());
    }
    let row = query
        .fetch_one(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    parse_row(&row)
}

/// Update a row by primary key. Unknown keys are rejected the same way
/// insert rejects them; the original web tool silently dropped them here,
/// an asymmetry this implementation deliberately does not reproduce.
pub async fn update(
    pool: &PgPool,
    table: &str,
    schema: &str,
    id: &str,
    record: &Record,
) -> Result<Record, BackplaneError> {
    let pk = resolve_primary_key(pool, table, Some(schema)).await?;
    let columns = column_whitelist(pool, schema, table).await?;
    let (statement, binds) = sql::build_update(schema, table, &columns, &pk, record)?;
    let mut query = sqlx::query_scalar::<_, String>(&statement);
    for bind in &binds {
        query = query.bind(bind.as_deref());
    }
    let row = query
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    match row {
        Some(row) => parse_row(&row),
        None => Err(row_not_found(schema, table, id)),
    }
}

/// Delete a row by primary key, returning the deleted row.
pub async fn delete(
    pool: &PgPool,
    table: &str,
    schema: &str,
    id: &str,
) -> Result<Record, BackplaneError> {
    let pk = resolve_primary_key(pool, table, Some(schema)).await?;
    let row = sqlx::query_scalar::<_, String>(&sql::build_delete(schema, table, &pk))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| classify_sqlx(&e))?;
    match row {
        Some(row) => parse_row(&row),
        None => Err(row_not_found(schema, table, id)),
    }
}

/// Fetch the declared columns for an exact `(schema, table)` pair. An empty
/// result means the table does not exist.
async fn column_whitelist(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnMeta>, BackplaneError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT column_name, udt_name
        FROM information_schema.columns
        WHERE table_schema = $1 AND table_name = $2
        ORDER BY ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))?;

    if rows.is_empty() {
        return Err(BackplaneError::NotFound(format!(
            "table {schema}.{table} does not exist"
        )));
    }
    Ok(rows
        .into_iter()
        .map(|(name, udt)| ColumnMeta { name, udt })
        .collect())
}

fn parse_row(raw: &str) -> Result<Record, BackplaneError> {
    serde_json::from_str(raw).map_err(|e| {
        BackplaneError::Internal(format!("could not decode row returned by the server: {e}"))
    })
}

fn row_not_found(schema: &str, table: &str, id: &str) -> BackplaneError {
    BackplaneError::NotFound(format!("row with id {id} not found in {schema}.{table}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_decodes_objects() {
        let row = parse_row(r#"{"id": 1, "email": "a@b.c"}"#).unwrap();
        assert_eq!(row["id"], 1);
        assert_eq!(row["email"], "a@b.c");
    }

    #[test]
    fn test_parse_row_rejects_garbage() {
        let err = parse_row("not json").unwrap_err();
        assert!(matches!(err, BackplaneError::Internal(_)));
    }

    #[test]
    fn test_row_not_found_message() {
        let err = row_not_found("public", "users", "42");
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("row with id 42"));
    }
}
