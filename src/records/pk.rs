use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

const PK_QUERY: &str = r#"
    SELECT array_agg(a.attname ORDER BY array_position(i.indkey, a.attnum)) AS key_columns
    FROM pg_index i
    JOIN pg_class c ON c.oid = i.indrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(i.indkey)
    WHERE i.indisprimary AND c.relname = $1
"#;

const PK_QUERY_WITH_SCHEMA: &str = r#"
    SELECT array_agg(a.attname ORDER BY array_position(i.indkey, a.attnum)) AS key_columns
    FROM pg_index i
    JOIN pg_class c ON c.oid = i.indrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = ANY(i.indkey)
    WHERE i.indisprimary AND c.relname = $1 AND n.nspname = $2
"#;

/// Resolve the column used for row identification in generic CRUD.
///
/// Returns the first primary-key column only. Composite keys are not
/// supported downstream; their presence is logged and the remaining key
/// columns are ignored.
pub async fn resolve_primary_key(
    pool: &PgPool,
    table: &str,
    schema: Option<&str>,
) -> Result<String, BackplaneError> {
    let row = match schema {
        Some(schema) => sqlx::query(PK_QUERY_WITH_SCHEMA)
            .bind(table)
            .bind(schema)
            .fetch_one(pool)
            .await,
        None => sqlx::query(PK_QUERY).bind(table).fetch_one(pool).await,
    }
    .map_err(|e| classify_sqlx(&e))?;

    let mut key_columns = decode_key_columns(&row)?;
    if key_columns.is_empty() {
        return Err(BackplaneError::database(format!(
            "no primary key found for table {table}"
        )));
    }
    if key_columns.len() > 1 {
        tracing::warn!(
            table,
            key_columns = ?key_columns,
            "composite primary key detected; using the first column only"
        );
    }
    Ok(key_columns.remove(0))
}

/// The aggregated key-column value arrives either as a native text array or
/// as a brace-delimited string, depending on the driver path. NULL means no
/// primary key matched.
fn decode_key_columns(row: &PgRow) -> Result<Vec<String>, BackplaneError> {
    if let Ok(columns) = row.try_get::<Option<Vec<String>>, _>("key_columns") {
        return Ok(columns.unwrap_or_default());
    }
    match row.try_get::<Option<String>, _>("key_columns") {
        Ok(Some(serialized)) => Ok(parse_braced_list(&serialized)),
        Ok(None) => Ok(Vec::new()),
        Err(e) => Err(classify_sqlx(&e)),
    }
}

/// Parse a Postgres array literal like `{id,tenant_id}` into its elements.
/// Handles double-quoted elements; nested arrays do not occur for attname.
pub(crate) fn parse_braced_list(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(|part| part.trim().trim_matches('"').to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
