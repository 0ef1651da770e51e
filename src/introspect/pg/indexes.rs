use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;
use crate::schema::IndexInfo;

/// List every index on one table, including the primary-key index, with its
/// access method and columns in index order.
pub async fn query_indexes(
    pool: &PgPool,
    schema: &str,
    table_name: &str,
) -> Result<Vec<IndexInfo>, BackplaneError> {
    let rows = sqlx::query_as::<_, IndexRow>(
        r#"
        SELECT i.relname AS index_name,
               ix.indisunique AS is_unique,
               ix.indisprimary AS is_primary,
               am.amname AS method,
               array_agg(a.attname ORDER BY array_position(ix.indkey, a.attnum)) AS columns
        FROM pg_index ix
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_am am ON am.oid = i.relam
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
        WHERE n.nspname = $1 AND t.relname = $2
        GROUP BY i.relname, ix.indisunique, ix.indisprimary, am.amname
        ORDER BY i.relname
        "#,
    )
    .bind(schema)
    .bind(table_name)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))?;

    Ok(rows
        .into_iter()
        .map(|row| IndexInfo {
            name: row.index_name,
            columns: row.columns,
            unique: row.is_unique,
            primary: row.is_primary,
            method: row.method,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct IndexRow {
    index_name: String,
    is_unique: bool,
    is_primary: bool,
    method: String,
    columns: Vec<String>,
}
