use sqlx::PgPool;

use crate::classify::classify_sqlx;
use crate::error::BackplaneError;

/// One row per primary-key column; composite keys yield multiple rows in
/// key order.
pub async fn query_primary_keys(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<PrimaryKeyRow>, BackplaneError> {
    sqlx::query_as::<_, PrimaryKeyRow>(
        r#"
        SELECT tc.table_schema, tc.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            USING (constraint_name, table_schema, table_name)
        WHERE tc.table_schema = ANY($1)
          AND tc.constraint_type = 'PRIMARY KEY'
        ORDER BY tc.table_schema, tc.table_name, kcu.ordinal_position
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))
}

/// One row per foreign-key column mapping.
pub async fn query_foreign_keys(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<ForeignKeyRow>, BackplaneError> {
    sqlx::query_as::<_, ForeignKeyRow>(
        r#"
        SELECT tc.constraint_name, tc.table_schema, tc.table_name, kcu.column_name,
               ccu.table_schema AS ref_schema, ccu.table_name AS ref_table,
               ccu.column_name AS ref_column
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON kcu.constraint_name = tc.constraint_name
            AND kcu.table_schema = tc.table_schema
            AND kcu.table_name = tc.table_name
        JOIN information_schema.constraint_column_usage ccu
            ON ccu.constraint_name = tc.constraint_name
            AND ccu.constraint_schema = tc.constraint_schema
        WHERE tc.table_schema = ANY($1)
          AND tc.constraint_type = 'FOREIGN KEY'
        ORDER BY tc.table_schema, tc.table_name, tc.constraint_name, kcu.ordinal_position
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(|e| classify_sqlx(&e))
}

#[derive(Debug, sqlx::FromRow)]
pub struct PrimaryKeyRow {
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ForeignKeyRow {
    pub constraint_name: String,
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column: String,
}
